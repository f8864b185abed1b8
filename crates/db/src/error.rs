//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store was built without a live connection (startup connect failed).
    #[error("database connection unavailable")]
    ConnectionUnavailable,

    #[error("invalid database configuration: {0}")]
    Config(String),

    /// A result set could not be mapped onto a typed model.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

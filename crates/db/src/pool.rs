//! Connection pool over the `Any` driver (SQLite locally, Postgres remotely).

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tracing::info;

use crate::{DbConfig, DbError};

/// Type alias for the pool shared by the data-access layer.
pub type DbPool = AnyPool;

/// Open the pool described by `config`.
///
/// The pool holds exactly one connection that is never reaped, so an
/// in-memory SQLite database lives as long as the pool does.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, DbError> {
    connect_url(&config.database_url(), config).await
}

/// Open a pool for an explicit URL, taking timeouts from `config`.
pub async fn connect_url(database_url: &str, config: &DbConfig) -> Result<DbPool, DbError> {
    sqlx::any::install_default_drivers();

    info!(
        "Connecting to database (local={}, timeout={:?})",
        config.is_local(),
        config.connect_timeout
    );
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(config.connect_timeout)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Apply the bundled SQLite schema in `./migrations` (relative to the
/// workspace root at build time).
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    info!("Running database migrations");
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

//! `db` crate — the data-access layer.
//!
//! Provides connection configuration, the single-connection pool, the
//! schema-less [`ResultSet`] every read returns, a TTL/invalidation read
//! cache, and the [`DataAccess`] handle the rest of the workspace is built on.
//! Typed row structs for the four food-donation tables live in [`models`].

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod pool;
pub mod store;
pub mod table;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{DbConfig, DbProfile};
pub use error::DbError;
pub use pool::DbPool;
pub use store::{DataAccess, DataStore};
pub use table::{ResultSet, Value};

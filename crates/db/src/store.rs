//! The data-access handle.
//!
//! Callers receive a `&dyn DataAccess` (or an `Arc<DataStore>`) explicitly;
//! there is no process-global connection. Reads and writes come in two
//! flavours:
//! - `try_query` / `try_execute` return the typed [`DbError`].
//! - `query` / `execute` degrade instead: an empty [`ResultSet`] or `false`,
//!   with the failure recorded as the store's warning banner.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Column, Executor, Row, Statement};
use tracing::{debug, error, instrument, warn};

use crate::cache::{written_table, QueryCache};
use crate::pool::{self, DbPool};
use crate::{DbConfig, DbError, ResultSet, Value};

// ---------------------------------------------------------------------------
// DataAccess
// ---------------------------------------------------------------------------

/// Read/write contract the reporting catalog and CRUD orchestrator run on.
#[async_trait]
pub trait DataAccess: Send + Sync {
    /// Run a read with positional (`$1`, `$2`, …) parameters.
    async fn try_query(&self, sql: &str, params: &[Value]) -> Result<ResultSet, DbError>;

    /// Run a mutating statement; returns the number of affected rows.
    async fn try_execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError>;

    /// Column names of `table`, in declaration order.
    async fn columns(&self, table: &str) -> Result<Vec<String>, DbError>;

    /// Hook invoked whenever a degrading call swallows an error.
    fn report_failure(&self, operation: &str, err: &DbError) {
        warn!("{operation} failed: {err}");
    }

    /// Read that never fails: any error yields an empty result set.
    async fn query(&self, sql: &str, params: &[Value]) -> ResultSet {
        match self.try_query(sql, params).await {
            Ok(set) => set,
            Err(e) => {
                self.report_failure("query", &e);
                ResultSet::default()
            }
        }
    }

    /// Write that never fails: any error yields `false`.
    async fn execute(&self, sql: &str, params: &[Value]) -> bool {
        match self.try_execute(sql, params).await {
            Ok(_) => true,
            Err(e) => {
                self.report_failure("execute", &e);
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DataStore
// ---------------------------------------------------------------------------

/// Pool-backed [`DataAccess`] with a read cache and a warning banner.
pub struct DataStore {
    /// `None` when the startup connection failed; every call then reports
    /// [`DbError::ConnectionUnavailable`]. No reconnection is attempted.
    pool: Option<DbPool>,
    cache: QueryCache,
    last_error: Mutex<Option<String>>,
}

impl DataStore {
    /// Wrap an already-open pool.
    pub fn new(pool: DbPool, cache_ttl: Duration) -> Self {
        Self {
            pool: Some(pool),
            cache: QueryCache::new(cache_ttl),
            last_error: Mutex::new(None),
        }
    }

    /// A store with no connection, carrying `reason` as its banner.
    pub fn disconnected(reason: impl Into<String>) -> Self {
        Self {
            pool: None,
            cache: QueryCache::new(Duration::ZERO),
            last_error: Mutex::new(Some(reason.into())),
        }
    }

    /// Open the configured connection. A failed connect is logged and turns
    /// into a disconnected store rather than an error.
    pub async fn connect(config: &DbConfig) -> Self {
        match pool::create_pool(config).await {
            Ok(pool) => Self::new(pool, config.cache_ttl),
            Err(e) => {
                error!("Error connecting to database: {e}");
                Self::disconnected(format!("Error connecting to database: {e}"))
            }
        }
    }

    pub fn pool(&self) -> Option<&DbPool> {
        self.pool.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// The most recent swallowed failure, for a UI banner. It stays until the
    /// next statement that reaches the database succeeds; a store that never
    /// connected keeps it for good.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn clear_error(&self) {
        *self.last_error.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    fn live_pool(&self) -> Result<&DbPool, DbError> {
        self.pool.as_ref().ok_or(DbError::ConnectionUnavailable)
    }
}

#[async_trait]
impl DataAccess for DataStore {
    #[instrument(skip(self, params), fields(params = params.len()))]
    async fn try_query(&self, sql: &str, params: &[Value]) -> Result<ResultSet, DbError> {
        let pool = self.live_pool()?;

        if let Some(hit) = self.cache.get(sql, params) {
            debug!("cache hit");
            return Ok(hit);
        }

        let generation = self.cache.generation();
        let statement = pool.prepare(sql).await?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_owned())
            .collect();

        let rows = bind_all(statement.query(), params).fetch_all(pool).await?;
        let rows = rows
            .iter()
            .map(|row| (0..columns.len()).map(|i| decode_cell(row, i)).collect())
            .collect();

        let set = ResultSet::new(columns, rows);
        debug!("fetched {} rows", set.len());
        self.cache.put(sql, params, set.clone(), generation);
        self.clear_error();
        Ok(set)
    }

    #[instrument(skip(self, params), fields(params = params.len()))]
    async fn try_execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        let pool = self.live_pool()?;

        let affected = bind_all(sqlx::query(sql), params)
            .execute(pool)
            .await?
            .rows_affected();

        match written_table(sql) {
            Some(table) => self.cache.invalidate_table(&table),
            None => self.cache.clear(),
        }

        debug!("{affected} rows affected");
        self.clear_error();
        Ok(affected)
    }

    async fn columns(&self, table: &str) -> Result<Vec<String>, DbError> {
        let pool = self.live_pool()?;
        let sql = format!("SELECT * FROM \"{}\"", table.replace('"', "\"\""));
        let statement = pool.prepare(&sql).await?;
        Ok(statement.columns().iter().map(|c| c.name().to_owned()).collect())
    }

    fn report_failure(&self, operation: &str, err: &DbError) {
        warn!("{operation} failed: {err}");
        let message = match err {
            DbError::ConnectionUnavailable => "Database connection unavailable".to_owned(),
            other => format!("Database error: {other}"),
        };
        *self.last_error.lock().unwrap_or_else(|p| p.into_inner()) = Some(message);
    }
}

// ---------------------------------------------------------------------------
// Binding and decoding
// ---------------------------------------------------------------------------

fn bind_all<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    params: &[Value],
) -> Query<'q, Any, AnyArguments<'q>> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Int(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.clone()),
        };
    }
    query
}

/// Decode one cell by trying the `Any` driver's scalar types in turn.
fn decode_cell(row: &AnyRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return v.map(f64::from).into();
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.into();
    }
    debug!("column {idx} has a type with no cell mapping; reading as null");
    Value::Null
}

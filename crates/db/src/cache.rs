//! Read-result memoization with a time-to-live and write invalidation.
//!
//! Entries are keyed by SQL text plus parameters. A successful write to a
//! table evicts every entry whose SQL mentions that table, so a CRUD change
//! is visible to the very next read in the same session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use tracing::{debug, warn};

use crate::{ResultSet, Value};

/// Upper bound on cached reads; the least valuable are evicted past it.
pub const MAX_ENTRIES: u64 = 1_000;

#[derive(Clone)]
struct CachedRead {
    /// Lower-cased SQL with identifier quotes stripped, for table matching.
    normalized_sql: Arc<str>,
    result: ResultSet,
}

/// Thread-safe memo of read results.
///
/// Every invalidation bumps a generation counter. A reader takes
/// [`generation`](Self::generation) before it fetches and hands it to
/// [`put`](Self::put); a result fetched across a write is never stored.
pub struct QueryCache {
    entries: Option<Cache<String, CachedRead>>,
    generation: AtomicU64,
}

impl QueryCache {
    /// A zero `ttl` disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: u64) -> Self {
        let entries = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .support_invalidation_closures()
                .build()
        });
        Self {
            entries,
            generation: AtomicU64::new(0),
        }
    }

    fn key(sql: &str, params: &[Value]) -> String {
        format!("{sql}\u{1f}{params:?}")
    }

    /// Current invalidation generation. Take it before fetching.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Return a live (non-expired) cached result.
    pub fn get(&self, sql: &str, params: &[Value]) -> Option<ResultSet> {
        let entries = self.entries.as_ref()?;
        entries.get(&Self::key(sql, params)).map(|hit| hit.result)
    }

    /// Store `result` unless an invalidation happened since `generation`.
    pub fn put(&self, sql: &str, params: &[Value], result: ResultSet, generation: u64) {
        let Some(entries) = &self.entries else {
            return;
        };
        if self.generation() != generation {
            debug!("skipping cache fill for a read that raced a write");
            return;
        }
        let key = Self::key(sql, params);
        entries.insert(
            key.clone(),
            CachedRead {
                normalized_sql: normalize(sql).into(),
                result,
            },
        );
        // A write that landed between the check and the insert.
        if self.generation() != generation {
            entries.invalidate(&key);
        }
    }

    /// Evict every entry that reads from `table`.
    pub fn invalidate_table(&self, table: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let Some(entries) = &self.entries else {
            return;
        };
        let needle = normalize(table);
        let predicate = move |_: &String, read: &CachedRead| mentions(&read.normalized_sql, &needle);
        if let Err(e) = entries.invalidate_entries_if(predicate) {
            warn!("falling back to a full cache flush: {e}");
            entries.invalidate_all();
        }
        debug!("invalidated cached reads of '{table}'");
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(entries) = &self.entries {
            entries.invalidate_all();
        }
    }

    /// Live entry count, after pending evictions have run.
    pub fn len(&self) -> usize {
        match &self.entries {
            Some(entries) => {
                entries.run_pending_tasks();
                entries.entry_count() as usize
            }
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Table written by an `INSERT INTO`, `UPDATE` or `DELETE FROM` statement.
pub fn written_table(sql: &str) -> Option<String> {
    let mut tokens = sql.split_whitespace();
    let first = tokens.next()?.to_ascii_uppercase();
    let name = match first.as_str() {
        "INSERT" | "DELETE" => {
            let _into_or_from = tokens.next()?;
            tokens.next()?
        }
        "UPDATE" => tokens.next()?,
        _ => return None,
    };
    let name = name.split('(').next().unwrap_or(name);
    Some(name.trim_matches(|c| c == '"' || c == '`' || c == '[' || c == ']').to_owned())
}

fn normalize(sql: &str) -> String {
    sql.chars()
        .filter(|c| !matches!(c, '"' | '`' | '[' | ']'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whole-word containment, so `claims` does not match `claims_archive`.
fn mentions(haystack: &str, word: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    haystack.match_indices(word).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + word.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

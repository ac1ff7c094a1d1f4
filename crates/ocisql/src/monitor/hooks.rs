use super::truncate_sql_bytes;
use super::types::{QueryHook, QueryType};
use crate::param::{BindDescriptor, descriptors_to_json};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::Level;

/// A hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl QueryHook for NoopHook {}

/// What [`DumpHook`] recorded for one statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DumpRecord {
    pub query_type: QueryType,
    pub sql: String,
    /// JSON dump of the bind descriptors.
    pub params: serde_json::Value,
    /// Time between `on_start` and `on_end`, rounded to 0.1 ms.
    pub duration_ms: f64,
}

/// Development hook: dumps every executed statement through `tracing`.
///
/// Each statement emits one event on target `ocisql.sql` with the query type,
/// the SQL, the bind parameters and the duration. The last record is kept for
/// inspection.
#[derive(Debug)]
pub struct DumpHook {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    started: Mutex<Option<Instant>>,
    last: Mutex<Option<DumpRecord>>,
}

impl Default for DumpHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: None,
            started: Mutex::new(None),
            last: Mutex::new(None),
        }
    }
}

impl DumpHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// The record of the last executed statement.
    pub fn last_record(&self) -> Option<DumpRecord> {
        self.last.lock().ok().and_then(|guard| guard.clone())
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn emit(&self, record: &DumpRecord) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        emit_at_level!(
            self.level,
            target: "ocisql.sql",
            query_type = ?record.query_type,
            sql = %record.sql,
            params = %record.params,
            duration_ms = record.duration_ms,
        );
    }
}

impl QueryHook for DumpHook {
    fn on_start(&self) {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
    }

    fn on_end(&self, sql: &str, binds: &[BindDescriptor]) {
        let now = Instant::now();
        // Chain: the next statement is timed from here unless on_start runs again.
        let started = self
            .started
            .lock()
            .ok()
            .and_then(|mut guard| guard.replace(now));
        let elapsed = started.map_or(Duration::ZERO, |s| now.duration_since(s));

        let record = DumpRecord {
            query_type: QueryType::from_sql(sql),
            sql: self.truncate_sql(sql),
            params: descriptors_to_json(binds),
            duration_ms: (elapsed.as_secs_f64() * 10_000.0).round() / 10.0,
        };
        self.emit(&record);
        if let Ok(mut last) = self.last.lock() {
            *last = Some(record);
        }
    }
}

/// Snapshot of [`StatsHook`] counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Total number of statements executed.
    pub total_queries: u64,
    pub select_count: u64,
    pub insert_count: u64,
    pub update_count: u64,
    pub delete_count: u64,
    /// Statements of any other kind (DDL, ALTER SESSION, ...).
    pub other_count: u64,
    /// Total execution time.
    pub total_duration: Duration,
    /// Slowest statement duration.
    pub max_duration: Duration,
    /// Slowest statement SQL.
    pub slowest_query: Option<String>,
}

/// Hook that counts executed statements per [`QueryType`] and tracks timing.
#[derive(Debug, Default)]
pub struct StatsHook {
    total_queries: AtomicU64,
    select_count: AtomicU64,
    insert_count: AtomicU64,
    update_count: AtomicU64,
    delete_count: AtomicU64,
    other_count: AtomicU64,
    total_duration_nanos: AtomicU64,
    max_duration_nanos: AtomicU64,
    slowest_query: Mutex<Option<String>>,
    started: Mutex<Option<Instant>>,
}

impl StatsHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current statistics.
    pub fn stats(&self) -> QueryStats {
        QueryStats {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            select_count: self.select_count.load(Ordering::Relaxed),
            insert_count: self.insert_count.load(Ordering::Relaxed),
            update_count: self.update_count.load(Ordering::Relaxed),
            delete_count: self.delete_count.load(Ordering::Relaxed),
            other_count: self.other_count.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
            max_duration: Duration::from_nanos(self.max_duration_nanos.load(Ordering::Relaxed)),
            slowest_query: self.slowest_query.lock().ok().and_then(|g| g.clone()),
        }
    }

    /// Reset all statistics.
    pub fn reset(&self) {
        for counter in [
            &self.total_queries,
            &self.select_count,
            &self.insert_count,
            &self.update_count,
            &self.delete_count,
            &self.other_count,
            &self.total_duration_nanos,
            &self.max_duration_nanos,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        if let Ok(mut slowest) = self.slowest_query.lock() {
            *slowest = None;
        }
    }

    fn counter(&self, query_type: QueryType) -> &AtomicU64 {
        match query_type {
            QueryType::Select => &self.select_count,
            QueryType::Insert => &self.insert_count,
            QueryType::Update => &self.update_count,
            QueryType::Delete => &self.delete_count,
            QueryType::Other => &self.other_count,
        }
    }
}

impl QueryHook for StatsHook {
    fn on_start(&self) {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
    }

    fn on_end(&self, sql: &str, _binds: &[BindDescriptor]) {
        let elapsed = self
            .started
            .lock()
            .ok()
            .and_then(|mut guard| guard.take())
            .map_or(Duration::ZERO, |s| s.elapsed());
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);

        self.total_queries.fetch_add(1, Ordering::Relaxed);
        self.counter(QueryType::from_sql(sql))
            .fetch_add(1, Ordering::Relaxed);

        let prev = self.total_duration_nanos.fetch_add(nanos, Ordering::Relaxed);
        if prev.checked_add(nanos).is_none() {
            self.total_duration_nanos.store(u64::MAX, Ordering::Relaxed);
        }

        let prev_max = self.max_duration_nanos.fetch_max(nanos, Ordering::Relaxed);
        if nanos >= prev_max {
            if let Ok(mut slowest) = self.slowest_query.lock() {
                *slowest = Some(sql.to_string());
            }
        }
    }
}

/// Runs several hooks in order.
#[derive(Clone, Default)]
pub struct CompositeHook {
    hooks: Vec<Arc<dyn QueryHook>>,
}

impl CompositeHook {
    /// Create an empty composite hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook.
    #[allow(clippy::should_implement_trait)]
    pub fn add<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Add an Arc-wrapped hook.
    pub fn add_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl std::fmt::Debug for CompositeHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeHook")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl QueryHook for CompositeHook {
    fn on_start(&self) {
        for hook in &self.hooks {
            hook.on_start();
        }
    }

    fn on_end(&self, sql: &str, binds: &[BindDescriptor]) {
        for hook in &self.hooks {
            hook.on_end(sql, binds);
        }
    }
}

//! Instrumentation hooks around statement execution.
//!
//! The driver calls [`QueryHook::on_start`] once every placeholder is bound,
//! right before the native execute, and [`QueryHook::on_end`] right after a
//! successful execute, with the SQL and the bind descriptors.
//!
//! # Example
//!
//! ```rust,ignore
//! use ocisql::monitor::{CompositeHook, DumpHook, StatsHook};
//! use std::sync::Arc;
//!
//! let stats = Arc::new(StatsHook::new());
//! let hook = CompositeHook::new()
//!     .add(DumpHook::new().max_sql_length(500))
//!     .add_arc(stats.clone());
//!
//! let driver = Driver::with_hook(conn, hook);
//! driver.execute_update("DELETE FROM sessions", None)?;
//! println!("{:?}", stats.stats());
//! ```

mod hooks;
mod types;


pub use hooks::{CompositeHook, DumpHook, DumpRecord, NoopHook, QueryStats, StatsHook};
pub use types::{QueryHook, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

use crate::param::BindDescriptor;
use serde::Serialize;

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryType {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// Other SQL (e.g., DDL, ALTER SESSION, PL/SQL blocks)
    Other,
}

impl QueryType {
    /// Detect query type from SQL string.
    ///
    /// Leading whitespace and opening parentheses are skipped, so unions
    /// starting with a parenthesized branch still count as SELECT. `WITH`
    /// is treated as SELECT.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = sql.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if starts_with_keyword(trimmed, "SELECT") || starts_with_keyword(trimmed, "WITH") {
            QueryType::Select
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

fn starts_with_keyword(sql: &str, keyword: &str) -> bool {
    let Some(head) = sql.get(..keyword.len()) else {
        return false;
    };
    head.eq_ignore_ascii_case(keyword)
        && sql[keyword.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'))
}

/// Callbacks invoked around each native execute.
///
/// Both callbacks default to doing nothing, so [`NoopHook`](super::NoopHook)
/// is just an empty impl.
pub trait QueryHook: Send + Sync {
    /// Called after binding, right before the native execute.
    fn on_start(&self) {}

    /// Called after a successful execute.
    fn on_end(&self, sql: &str, binds: &[BindDescriptor]) {
        let _ = (sql, binds);
    }
}

impl<H: QueryHook + ?Sized> QueryHook for std::sync::Arc<H> {
    fn on_start(&self) {
        (**self).on_start()
    }

    fn on_end(&self, sql: &str, binds: &[BindDescriptor]) {
        (**self).on_end(sql, binds)
    }
}

use super::Driver;
use crate::error::{OciError, OciResult};
use crate::native::{NativeConnection, NativeError};
use crate::row::Row;

/// A live, executed statement returned by [`Driver::execute_query`].
///
/// The caller owns it: read from it, then [`free`](Self::free) it. Dropping it
/// frees it as well; the native handle is released exactly once either way.
pub struct Statement<'d, C: NativeConnection> {
    driver: &'d Driver<C>,
    sql: String,
    binds: serde_json::Value,
    /// `None` once released.
    handle: Option<C::Statement>,
}

impl<'d, C: NativeConnection> Statement<'d, C> {
    pub(super) fn new(
        driver: &'d Driver<C>,
        sql: &str,
        handle: C::Statement,
        binds: serde_json::Value,
    ) -> Self {
        Self {
            driver,
            sql: sql.to_string(),
            binds,
            handle: Some(handle),
        }
    }

    /// SQL this statement was prepared from.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The native handle, e.g. to keep draining a LOB.
    pub fn handle(&self) -> Option<&C::Statement> {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut C::Statement> {
        self.handle.as_mut()
    }

    /// Rows affected by the execute.
    pub fn num_rows(&self) -> u64 {
        self.handle
            .as_ref()
            .map_or(0, |h| self.driver.connection().num_rows(h))
    }

    /// Drain all remaining rows.
    pub fn fetch_all(&mut self) -> OciResult<Vec<Row>> {
        let conn = self.driver.connection();
        let Some(handle) = self.handle.as_mut() else {
            return Ok(Vec::new());
        };
        match conn.fetch_all(handle) {
            Ok(rows) => Ok(rows),
            Err(err) => Err(self.fetch_failed(err)),
        }
    }

    /// Fetch the next row.
    pub fn fetch_one(&mut self) -> OciResult<Option<Row>> {
        let conn = self.driver.connection();
        let Some(handle) = self.handle.as_mut() else {
            return Ok(None);
        };
        match conn.fetch_one(handle) {
            Ok(row) => Ok(row),
            Err(err) => Err(self.fetch_failed(err)),
        }
    }

    fn fetch_failed(&self, err: NativeError) -> OciError {
        let message = self.driver.error_message(self.handle.as_ref(), Some(err));
        self.driver
            .query_failed(&self.sql, message, self.binds.clone())
    }

    /// Release the native handle now.
    pub fn free(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.driver.connection().free_statement(handle);
        }
    }
}

impl<C: NativeConnection> Drop for Statement<'_, C> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<C: NativeConnection> std::fmt::Debug for Statement<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &self.sql)
            .field("freed", &self.handle.is_none())
            .finish()
    }
}

//! Statement execution and transaction state.
//!
//! [`Driver`] runs one statement at a time on a native connection:
//! prepare, bind every descriptor of the given [`ParameterBinder`], execute
//! under the current commit mode, then fetch or count and free.
//!
//! Any native failure goes through one error path: the diagnostic is logged on
//! target `ocisql.sql`, an open manual transaction is rolled back, and the call
//! fails with [`OciError::QueryFailed`] (or [`OciError::PrepareFailed`]) carrying
//! the SQL and a dump of the binds. A failed call never leaves a transaction
//! open.
//!
//! ```ignore
//! let driver = Driver::new(conn);
//!
//! let mut bind = ParameterBinder::new();
//! bind.add(":ID", 3)?;
//! let users = driver.fetch_all_rows("SELECT * FROM users WHERE id > :ID", Some(&mut bind))?;
//!
//! driver.transaction(|d| {
//!     d.execute_update("DELETE FROM sessions", None)?;
//!     d.execute_update("DELETE FROM users", None)
//! })?;
//! ```

mod statement;

#[cfg(test)]
mod tests;

pub use statement::Statement;

use crate::error::{OciError, OciResult};
use crate::monitor::{NoopHook, QueryHook};
use crate::native::{CommitMode, NativeConnection, NativeError};
use crate::param::{ParameterBinder, descriptors_to_json};
use crate::row::{FromRow, Row};
use crate::value::Value;
use std::cell::Cell;
use std::sync::Arc;

/// Whether statements commit on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionMode {
    /// Every successful statement commits.
    #[default]
    AutoCommit,
    /// Work stays pending until [`Driver::commit_transaction`] or
    /// [`Driver::rollback_transaction`].
    Manual,
}

impl TransactionMode {
    fn commit_mode(self) -> CommitMode {
        match self {
            TransactionMode::AutoCommit => CommitMode::CommitOnSuccess,
            TransactionMode::Manual => CommitMode::NoAutoCommit,
        }
    }
}

/// Execution engine over one native connection.
///
/// `C` can be an owned connection or a reference to one (`&MyConn`), so the
/// caller may keep control of the connection's lifetime. A driver is meant to
/// be used by one caller at a time and is not `Sync`.
pub struct Driver<C: NativeConnection> {
    conn: C,
    hook: Arc<dyn QueryHook>,
    mode: Cell<TransactionMode>,
}

impl<C: NativeConnection> Driver<C> {
    /// Driver with a no-op hook.
    pub fn new(conn: C) -> Self {
        Self::with_hook_arc(conn, Arc::new(NoopHook))
    }

    pub fn with_hook<H: QueryHook + 'static>(conn: C, hook: H) -> Self {
        Self::with_hook_arc(conn, Arc::new(hook))
    }

    pub fn with_hook_arc(conn: C, hook: Arc<dyn QueryHook>) -> Self {
        Self {
            conn,
            hook,
            mode: Cell::new(TransactionMode::AutoCommit),
        }
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn into_connection(self) -> C {
        self.conn
    }

    pub fn hook(&self) -> &Arc<dyn QueryHook> {
        &self.hook
    }

    pub fn transaction_mode(&self) -> TransactionMode {
        self.mode.get()
    }

    pub fn in_transaction(&self) -> bool {
        self.mode.get() == TransactionMode::Manual
    }

    /// Stop auto-committing. Calling it again changes nothing.
    pub fn begin_transaction(&self) -> &Self {
        self.mode.set(TransactionMode::Manual);
        self
    }

    /// Commit pending work and go back to auto-commit.
    ///
    /// Without an open transaction this only resets the mode. The mode is
    /// reset even when the native commit fails.
    pub fn commit_transaction(&self) -> OciResult<&Self> {
        let open = self.in_transaction();
        self.mode.set(TransactionMode::AutoCommit);
        if open {
            self.conn
                .commit()
                .map_err(|e| OciError::Transaction(format!("commit failed: {e}")))?;
        }
        Ok(self)
    }

    /// Roll back pending work and go back to auto-commit.
    pub fn rollback_transaction(&self) -> OciResult<&Self> {
        let open = self.in_transaction();
        self.mode.set(TransactionMode::AutoCommit);
        if open {
            self.conn
                .rollback()
                .map_err(|e| OciError::Transaction(format!("rollback failed: {e}")))?;
        }
        Ok(self)
    }

    /// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// Inside an already open transaction `f` just runs; the outer scope
    /// decides whether to commit.
    pub fn transaction<T, F>(&self, f: F) -> OciResult<T>
    where
        F: FnOnce(&Self) -> OciResult<T>,
    {
        if self.in_transaction() {
            return f(self);
        }

        self.begin_transaction();
        match f(self) {
            Ok(value) => {
                self.commit_transaction()?;
                Ok(value)
            }
            Err(error) => match self.rollback_transaction() {
                Ok(_) => Err(error),
                Err(rollback_err) => Err(OciError::Transaction(format!(
                    "{error} ({rollback_err})"
                ))),
            },
        }
    }

    /// Prepare, bind and execute `sql`, returning the live statement.
    ///
    /// Output binds (`max_length >= 0`) are read back into `binder`.
    pub fn execute_query(
        &self,
        sql: &str,
        binder: Option<&mut ParameterBinder>,
    ) -> OciResult<Statement<'_, C>> {
        let mut handle = match self.conn.prepare(sql) {
            Ok(handle) => handle,
            Err(err) => {
                let message = self.error_message(None, Some(err));
                let binds = binder.as_deref().map(ParameterBinder::diagnostics);
                return Err(self.prepare_failed(sql, message, binds.unwrap_or_default()));
            }
        };

        let (outputs, diagnostics) = {
            let binds = binder
                .as_deref()
                .map(ParameterBinder::descriptors)
                .unwrap_or_default();
            let diagnostics = descriptors_to_json(binds);

            let mut result = Ok(());
            for bind in binds {
                result = self.conn.bind_by_name(&mut handle, bind);
                if result.is_err() {
                    break;
                }
            }
            if result.is_ok() {
                self.hook.on_start();
                result = self.conn.execute(&mut handle, self.mode.get().commit_mode());
            }
            if let Err(err) = result {
                let message = self.error_message(Some(&handle), Some(err));
                self.conn.free_statement(handle);
                return Err(self.query_failed(sql, message, diagnostics));
            }

            self.hook.on_end(sql, binds);
            let outputs: Vec<String> = binds
                .iter()
                .filter(|b| b.is_output())
                .map(|b| b.name.clone())
                .collect();
            (outputs, diagnostics)
        };

        if let Some(binder) = binder {
            for name in outputs {
                if let Some(value) = self.conn.bound_value(&handle, &name) {
                    binder.set_value(&name, value);
                }
            }
        }

        Ok(Statement::new(self, sql, handle, diagnostics))
    }

    /// Execute and return the affected row count.
    pub fn execute_update(&self, sql: &str, binder: Option<&mut ParameterBinder>) -> OciResult<u64> {
        let stmt = self.execute_query(sql, binder)?;
        let count = stmt.num_rows();
        stmt.free();
        Ok(count)
    }

    /// Execute and fetch every row as a column → value mapping.
    pub fn fetch_all_rows(
        &self,
        sql: &str,
        binder: Option<&mut ParameterBinder>,
    ) -> OciResult<Vec<Row>> {
        let mut stmt = self.execute_query(sql, binder)?;
        let rows = stmt.fetch_all();
        stmt.free();
        rows
    }

    /// Execute and fetch the first row, if any.
    pub fn fetch_one_row(
        &self,
        sql: &str,
        binder: Option<&mut ParameterBinder>,
    ) -> OciResult<Option<Row>> {
        let mut stmt = self.execute_query(sql, binder)?;
        let row = stmt.fetch_one();
        stmt.free();
        row
    }

    /// Execute and fetch every row positionally.
    pub fn fetch_all_columns(
        &self,
        sql: &str,
        binder: Option<&mut ParameterBinder>,
    ) -> OciResult<Vec<Vec<Value>>> {
        let rows = self.fetch_all_rows(sql, binder)?;
        Ok(rows.into_iter().map(Row::into_values).collect())
    }

    /// Execute and fetch the first row positionally; empty when there is none.
    pub fn fetch_first_column(
        &self,
        sql: &str,
        binder: Option<&mut ParameterBinder>,
    ) -> OciResult<Vec<Value>> {
        let row = self.fetch_one_row(sql, binder)?;
        Ok(row.map(Row::into_values).unwrap_or_default())
    }

    /// Execute and map every row with [`FromRow`].
    pub fn fetch_all_as<T: FromRow>(
        &self,
        sql: &str,
        binder: Option<&mut ParameterBinder>,
    ) -> OciResult<Vec<T>> {
        self.fetch_all_rows(sql, binder)?
            .iter()
            .map(T::from_row)
            .collect()
    }

    /// Execute and map the first row with [`FromRow`].
    pub fn fetch_one_as<T: FromRow>(
        &self,
        sql: &str,
        binder: Option<&mut ParameterBinder>,
    ) -> OciResult<Option<T>> {
        self.fetch_one_row(sql, binder)?
            .as_ref()
            .map(T::from_row)
            .transpose()
    }

    /// Native diagnostic text, from the statement first, then the connection,
    /// then the error the failing call returned.
    pub(crate) fn error_message(
        &self,
        stmt: Option<&C::Statement>,
        returned: Option<NativeError>,
    ) -> String {
        let from_stmt = stmt.and_then(|s| self.conn.last_error(Some(s)));
        [from_stmt, self.conn.last_error(None), returned]
            .into_iter()
            .flatten()
            .find(|e| !e.message.is_empty())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string())
    }

    /// Roll back an open manual transaction after a failure.
    fn abort_transaction(&self) {
        if self.in_transaction() {
            if let Err(err) = self.rollback_transaction() {
                tracing::warn!(target: "ocisql.sql", error = %err, "rollback after failure");
            }
        }
    }

    pub(crate) fn query_failed(
        &self,
        sql: &str,
        message: String,
        binds: serde_json::Value,
    ) -> OciError {
        tracing::warn!(target: "ocisql.sql", sql = %sql, "SQL error: {message}");
        self.abort_transaction();
        OciError::QueryFailed {
            message,
            sql: sql.to_string(),
            binds,
        }
    }

    fn prepare_failed(&self, sql: &str, message: String, binds: serde_json::Value) -> OciError {
        tracing::warn!(target: "ocisql.sql", sql = %sql, "SQL prepare error: {message}");
        self.abort_transaction();
        OciError::PrepareFailed {
            message,
            sql: sql.to_string(),
            binds,
        }
    }
}

impl<C: NativeConnection> std::fmt::Debug for Driver<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("mode", &self.mode.get())
            .finish_non_exhaustive()
    }
}

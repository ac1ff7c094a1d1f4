//! Boundary to the native OCI call interface.
//!
//! ocisql never talks to the Oracle client libraries directly. Everything it
//! needs from them goes through the traits in this module, so the driver can be
//! run against a real OCI binding or an in-memory double in tests.
//!
//! The driver always calls a connection in the same order:
//! `prepare` → `bind_by_name`* → `execute` → (`fetch_*` | `num_rows`) → `free_statement`.

use crate::lob::LobHandle;
use crate::param::BindDescriptor;
use crate::row::Row;
use crate::value::BindValue;
use std::fmt;

/// Diagnostic reported by the native layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    /// Native error code (e.g. `942` for ORA-00942), if known.
    pub code: Option<i32>,
    /// Native diagnostic text.
    pub message: String,
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "ORA-{code:05}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for NativeError {}

/// Commit flag passed to the native execute call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Commit as soon as the statement succeeds.
    CommitOnSuccess,
    /// Leave the work pending until an explicit commit or rollback.
    NoAutoCommit,
}

/// A native connection handle.
///
/// Implementations wrap an OCI session. A connection is not meant to run two
/// overlapping statements; the driver serialises access by construction.
pub trait NativeConnection {
    /// Native statement handle.
    type Statement;

    /// Parse `sql` into a statement handle.
    fn prepare(&self, sql: &str) -> Result<Self::Statement, NativeError>;

    /// Bind one named placeholder.
    fn bind_by_name(
        &self,
        stmt: &mut Self::Statement,
        bind: &BindDescriptor,
    ) -> Result<(), NativeError>;

    /// Execute a prepared statement.
    fn execute(&self, stmt: &mut Self::Statement, mode: CommitMode) -> Result<(), NativeError>;

    /// Value written back into an output placeholder by the last execute.
    ///
    /// The default implementation reports nothing.
    fn bound_value(&self, stmt: &Self::Statement, name: &str) -> Option<BindValue> {
        let _ = (stmt, name);
        None
    }

    /// Drain all remaining rows.
    fn fetch_all(&self, stmt: &mut Self::Statement) -> Result<Vec<Row>, NativeError>;

    /// Fetch the next row, if any.
    fn fetch_one(&self, stmt: &mut Self::Statement) -> Result<Option<Row>, NativeError>;

    /// Number of rows affected by the last execute.
    fn num_rows(&self, stmt: &Self::Statement) -> u64;

    /// Release a statement handle.
    fn free_statement(&self, stmt: Self::Statement);

    fn commit(&self) -> Result<(), NativeError>;

    fn rollback(&self) -> Result<(), NativeError>;

    /// Inspect the last diagnostic of a statement, or of the connection when
    /// `stmt` is `None`.
    fn last_error(&self, stmt: Option<&Self::Statement>) -> Option<NativeError>;

    /// Allocate a new LOB descriptor on this connection.
    fn new_lob(&self) -> Result<LobHandle, NativeError>;
}

impl<C: NativeConnection + ?Sized> NativeConnection for &C {
    type Statement = C::Statement;

    fn prepare(&self, sql: &str) -> Result<Self::Statement, NativeError> {
        (**self).prepare(sql)
    }

    fn bind_by_name(
        &self,
        stmt: &mut Self::Statement,
        bind: &BindDescriptor,
    ) -> Result<(), NativeError> {
        (**self).bind_by_name(stmt, bind)
    }

    fn execute(&self, stmt: &mut Self::Statement, mode: CommitMode) -> Result<(), NativeError> {
        (**self).execute(stmt, mode)
    }

    fn bound_value(&self, stmt: &Self::Statement, name: &str) -> Option<BindValue> {
        (**self).bound_value(stmt, name)
    }

    fn fetch_all(&self, stmt: &mut Self::Statement) -> Result<Vec<Row>, NativeError> {
        (**self).fetch_all(stmt)
    }

    fn fetch_one(&self, stmt: &mut Self::Statement) -> Result<Option<Row>, NativeError> {
        (**self).fetch_one(stmt)
    }

    fn num_rows(&self, stmt: &Self::Statement) -> u64 {
        (**self).num_rows(stmt)
    }

    fn free_statement(&self, stmt: Self::Statement) {
        (**self).free_statement(stmt)
    }

    fn commit(&self) -> Result<(), NativeError> {
        (**self).commit()
    }

    fn rollback(&self) -> Result<(), NativeError> {
        (**self).rollback()
    }

    fn last_error(&self, stmt: Option<&Self::Statement>) -> Option<NativeError> {
        (**self).last_error(stmt)
    }

    fn new_lob(&self) -> Result<LobHandle, NativeError> {
        (**self).new_lob()
    }
}

/// A native LOB descriptor.
///
/// Methods take `&self`: the descriptor is shared between the binder that
/// created it and whoever reads or releases it.
pub trait NativeLob: Send + Sync {
    /// Write `data` into a temporary LOB (write mode).
    fn write_temporary(&self, data: &[u8]) -> Result<(), NativeError>;

    /// Replace the LOB contents.
    fn save(&self, data: &[u8]) -> Result<(), NativeError>;

    /// Read the whole LOB.
    fn load(&self) -> Result<Vec<u8>, NativeError>;

    /// Close a LOB opened for writing.
    fn close(&self) -> Result<(), NativeError>;

    /// Release the descriptor.
    fn free(&self) -> Result<(), NativeError>;
}

/// Opens native connections.
pub trait Connector {
    type Connection: NativeConnection;

    fn connect(
        &self,
        user: &str,
        password: &str,
        dbname: &str,
        charset: &str,
    ) -> Result<Self::Connection, NativeError>;
}

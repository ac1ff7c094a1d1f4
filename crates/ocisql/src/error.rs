//! Error types for ocisql

use thiserror::Error;

/// Result type alias for ocisql operations
pub type OciResult<T> = Result<T, OciError>;

/// Error types for binding, building and executing statements
#[derive(Debug, Error)]
pub enum OciError {
    /// Placeholder name does not start with the bind marker
    #[error("Invalid bind name: placeholder must start with ':'. Got: {0}")]
    InvalidBindName(String),

    /// Lookup of a placeholder that was never bound
    #[error("Unknown bind name: {0}")]
    UnknownBindName(String),

    /// IN-list expansion over the bound-parameter ceiling
    #[error("Too many values: {count} given, only {max} allowed with oci")]
    TooManyValues { count: usize, max: usize },

    /// Native connect failure
    #[error("Connection error for {user}@{dbname}: {message}")]
    ConnectFailed {
        user: String,
        dbname: String,
        message: String,
    },

    /// Native parse failure
    #[error("Prepare error: {message}, SQL: {sql}")]
    PrepareFailed {
        message: String,
        sql: String,
        binds: serde_json::Value,
    },

    /// Native bind/execute failure
    #[error("SQL error: {message}, SQL: {sql}")]
    QueryFailed {
        message: String,
        sql: String,
        binds: serde_json::Value,
    },

    /// Native commit/rollback failure
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Native LOB operation failure
    #[error("LOB error: {0}")]
    Lob(String),

    /// Row decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OciError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a LOB error
    pub fn lob(message: impl Into<String>) -> Self {
        Self::Lob(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a native execution failure
    pub fn is_query_failed(&self) -> bool {
        matches!(self, Self::QueryFailed { .. })
    }

    /// Check if this is a native parse failure
    pub fn is_prepare_failed(&self) -> bool {
        matches!(self, Self::PrepareFailed { .. })
    }

    /// SQL text of the failed statement, if this error carries one
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::PrepareFailed { sql, .. } | Self::QueryFailed { sql, .. } => Some(sql),
            _ => None,
        }
    }

    /// Bind diagnostics of the failed statement, if this error carries them
    pub fn bind_diagnostics(&self) -> Option<&serde_json::Value> {
        match self {
            Self::PrepareFailed { binds, .. } | Self::QueryFailed { binds, .. } => Some(binds),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for OciError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

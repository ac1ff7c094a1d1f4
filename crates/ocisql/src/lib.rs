//! # ocisql
//!
//! A lightweight Oracle (OCI) SQL layer for Rust.
//!
//! ## Features
//!
//! - **SQL explicit**: fluent builders assemble plain SQL text; nothing is hidden
//! - **Oracle dialect**: `ROWNUM` pagination, `RETURNING ... INTO`, 999-value IN lists
//! - **Named binds**: `:NAME` placeholders with text, `LONG RAW`, LOB and output binds
//! - **One error path**: a failed statement rolls back the open transaction and
//!   reports the SQL with its binds
//! - **Pluggable native layer**: the driver talks to OCI through the
//!   [`native`] traits, so any binding (or an in-memory double) can back it
//!
//! ## Example
//!
//! ```ignore
//! use ocisql::prelude::*;
//!
//! let driver = DriverConfig::new(Environment::Production).create_driver(conn)?;
//!
//! let mut bind = ParameterBinder::new();
//! let ids = expand_in_list([1, 2, 3], ":ID", &mut bind)?;
//! bind.add(":ACTIVE", true)?;
//!
//! let rows = Select::start()
//!     .columns(["u.id", "u.name"])
//!     .from_as("users", "u")
//!     .where_(&format!("u.id IN ({ids})"))
//!     .and_where("u.active = :ACTIVE")
//!     .order_by_asc("u.name")
//!     .set_limit(10, 20)
//!     .fetch_all(&driver, Some(&mut bind))?;
//!
//! driver.transaction(|d| {
//!     Update::start()
//!         .table("users")
//!         .set("active", 0)
//!         .where_("last_login < SYSDATE - 365")
//!         .execute(d, None)
//! })?;
//! ```

pub mod builder;
pub mod clause;
pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod lob;
pub mod monitor;
pub mod native;
pub mod param;
pub mod prelude;
pub mod row;
pub mod session;
pub mod value;

pub use builder::{
    Delete, Insert, MutationBuilder, Select, SqlBuilder, TableSource, Update, WhereClause, quote,
};
pub use clause::{MAX_IN_LIST_VALUES, expand_in_list};
pub use config::{ConnectionConfig, DriverConfig, Environment};
pub use driver::{Driver, Statement, TransactionMode};
pub use error::{OciError, OciResult};
pub use lob::{LobGuard, LobHandle};
pub use monitor::{CompositeHook, DumpHook, NoopHook, QueryHook, QueryStats, QueryType, StatsHook};
pub use native::{CommitMode, Connector, NativeConnection, NativeError, NativeLob};
pub use param::{BIND_MARKER, BindDescriptor, BindKind, ParameterBinder};
pub use row::{FromRow, Row};
pub use session::SessionInit;
pub use value::{BindValue, Value};

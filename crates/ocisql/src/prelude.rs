//! Convenient imports for typical `ocisql` usage.
//!
//! ```ignore
//! use ocisql::prelude::*;
//! ```

pub use crate::{
    BindValue, Delete, Driver, DriverConfig, Environment, FromRow, Insert, MutationBuilder,
    OciError, OciResult, ParameterBinder, Row, Select, SqlBuilder, Update, Value, WhereClause,
    expand_in_list, quote,
};

//! Fluent SQL builders for the Oracle dialect.
//!
//! Every builder accumulates string fragments and renders them on
//! [`build`](SqlBuilder::build), which also resets the builder so the same
//! instance can assemble the next statement.
//!
//! ## Design
//!
//! - SQL is still explicit: conditions, values and expressions are spliced
//!   as given. Bind them with `:NAME` placeholders or [`quote`] them.
//! - `LIMIT`/`OFFSET` is emulated with `ROWNUM` (see [`Select::set_limit`]).
//! - The first WHERE/HAVING predicate is never prefixed by `and_*`.

mod delete;
mod fragments;
mod insert;
mod select;
mod traits;
mod update;

pub use delete::Delete;
pub use fragments::QueryFragments;
pub use insert::Insert;
pub use select::{Select, TableSource};
pub use traits::{MutationBuilder, SqlBuilder, WhereClause};
pub use update::Update;

/// Single-quote a literal for direct splicing into SQL.
///
/// Embedded quotes are doubled; NUL, LF, CR, backslash and SUB (0x1A) are
/// backslash-escaped.
///
/// ```ignore
/// assert_eq!(quote("O'neil"), "'O''neil'");
/// ```
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\0' => out.push_str("\\000"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\u{1a}' => out.push_str("\\032"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

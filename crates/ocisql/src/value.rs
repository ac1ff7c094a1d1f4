//! Bind values and fetched column values.

use crate::format;
use crate::lob::LobHandle;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A value that can be bound to a named placeholder.
///
/// This is a closed set: every scalar is turned into text before it reaches the
/// native layer, so binding behaves the same whatever the process locale is.
#[derive(Debug, Clone, Default)]
pub enum BindValue {
    /// SQL `NULL` (also the initial value of an output placeholder).
    #[default]
    Null,
    /// Character data, bound as `SQLT_CHR`.
    Text(String),
    /// Raw bytes, bound as `LONG RAW`.
    LongRaw(Vec<u8>),
    /// A native LOB descriptor.
    Lob(LobHandle),
}

impl BindValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// LOB descriptor, if this is a LOB value.
    pub fn as_lob(&self) -> Option<&LobHandle> {
        match self {
            Self::Lob(lob) => Some(lob),
            _ => None,
        }
    }
}

impl PartialEq for BindValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::LongRaw(a), Self::LongRaw(b)) => a == b,
            (Self::Lob(a), Self::Lob(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Serialize for BindValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::LongRaw(bytes) => {
                serializer.serialize_str(&format!("<long raw: {} bytes>", bytes.len()))
            }
            Self::Lob(_) => serializer.serialize_str("<lob>"),
        }
    }
}

/// Format a float with `.` as decimal separator.
///
/// The output is the shortest text that round-trips to the same value and never
/// depends on the process locale: `1234.56` is always `"1234.56"`, `0.0` is `"0"`.
pub fn format_float(value: f64) -> String {
    value.to_string()
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for BindValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for BindValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

macro_rules! bind_value_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for BindValue {
                fn from(value: $t) -> Self {
                    Self::Text(value.to_string())
                }
            }
        )*
    };
}

bind_value_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<f64> for BindValue {
    fn from(value: f64) -> Self {
        Self::Text(format_float(value))
    }
}

impl From<f32> for BindValue {
    fn from(value: f32) -> Self {
        // f32 has its own shortest representation; widening first would print noise digits.
        Self::Text(value.to_string())
    }
}

impl From<bool> for BindValue {
    fn from(value: bool) -> Self {
        Self::Text(if value { "1" } else { "0" }.to_string())
    }
}

impl From<NaiveDate> for BindValue {
    fn from(value: NaiveDate) -> Self {
        Self::Text(value.and_time(NaiveTime::MIN).format(format::DATE).to_string())
    }
}

impl From<NaiveDateTime> for BindValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Text(value.format(format::TIMESTAMP).to_string())
    }
}

impl From<NaiveTime> for BindValue {
    fn from(value: NaiveTime) -> Self {
        Self::Text(value.format(format::TIME).to_string())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for BindValue
where
    Tz::Offset: fmt::Display,
{
    fn from(value: DateTime<Tz>) -> Self {
        Self::Text(value.format(format::TIMESTAMP_TZ).to_string())
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for BindValue {
    fn from(value: rust_decimal::Decimal) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<LobHandle> for BindValue {
    fn from(value: LobHandle) -> Self {
        Self::Lob(value)
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A column value read back from a result set.
///
/// OCI hands every scalar back as character data (numbers and dates included,
/// rendered with the session NLS formats); LOB columns arrive already loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Raw(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(s) => Some(s.as_bytes()),
            Self::Raw(b) => Some(b),
            Self::Null => None,
        }
    }

    /// Parse the text content into `T`.
    ///
    /// Returns `Ok(None)` for `NULL`.
    pub fn parse<T>(&self) -> Result<Option<T>, String>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self {
            Self::Null => Ok(None),
            Self::Text(s) => s.trim().parse::<T>().map(Some).map_err(|e| e.to_string()),
            Self::Raw(_) => Err("raw column cannot be parsed as text".to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Text(s) => f.write_str(s),
            Self::Raw(b) => write!(f, "<raw: {} bytes>", b.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Raw(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

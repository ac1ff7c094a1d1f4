//! Fetched rows and row mapping.

use crate::error::{OciError, OciResult};
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::str::FromStr;

/// One fetched row: an ordered column → value mapping.
///
/// Column lookups are exact first, then ASCII case-insensitive (Oracle reports
/// unquoted identifiers upper-cased).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.columns.push(column.into());
        self.values.push(value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Positional values, dropping column names.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(column)))
    }

    /// Value of a named column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.position(column).map(|i| &self.values[i])
    }

    /// Value at a position.
    pub fn get_idx(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Parse a named column, treating `NULL` as `None`.
    pub fn try_get_opt<T>(&self, column: &str) -> OciResult<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let value = self
            .get(column)
            .ok_or_else(|| OciError::decode(column, "no such column"))?;
        value
            .parse::<T>()
            .map_err(|message| OciError::decode(column, message))
    }

    /// Parse a named column that must not be `NULL`.
    pub fn try_get<T>(&self, column: &str) -> OciResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.try_get_opt(column)?
            .ok_or_else(|| OciError::decode(column, "unexpected NULL"))
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.push(k, v);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Map a fetched row to a Rust type.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> OciResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> OciResult<Self> {
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        [
            ("ID", Value::from("7")),
            ("NAME", Value::from("O'neil")),
            ("DELETED_AT", Value::Null),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_lookup_by_name_and_position() {
        let row = sample();
        assert_eq!(row.len(), 3);
        assert_eq!(row.get("NAME"), Some(&Value::from("O'neil")));
        assert_eq!(row.get("name"), Some(&Value::from("O'neil")));
        assert_eq!(row.get_idx(0), Some(&Value::from("7")));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_typed_getters() {
        let row = sample();
        assert_eq!(row.try_get::<i64>("ID").unwrap(), 7);
        assert_eq!(row.try_get_opt::<String>("DELETED_AT").unwrap(), None);
        assert!(matches!(
            row.try_get::<String>("DELETED_AT"),
            Err(OciError::Decode { .. })
        ));
        assert!(row.try_get::<i64>("NAME").is_err());
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"ID":"7","NAME":"O'neil","DELETED_AT":null}"#);
    }
}

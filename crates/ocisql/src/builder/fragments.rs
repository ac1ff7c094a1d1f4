//! Fragment buckets shared by every builder.

pub(crate) const COMMA: &str = ", ";
pub(crate) const SPACE: &str = " ";

/// The mutable bucket-of-fragments a builder accumulates into.
///
/// Every builder owns one; `build()` renders it and puts it back to
/// [`Default`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFragments {
    /// SELECT list, or the column list of `INSERT ... SELECT`
    pub(crate) columns: Vec<String>,
    pub(crate) from: Vec<String>,
    /// INSERT, UPDATE and DELETE target (with alias)
    pub(crate) table: String,
    pub(crate) join: Vec<String>,
    pub(crate) where_: Vec<String>,
    pub(crate) group_by: Vec<String>,
    pub(crate) having: Vec<String>,
    pub(crate) order_by: Vec<String>,
    /// INSERT column → value, in insertion order
    pub(crate) values: Vec<(String, String)>,
    /// UPDATE `col = value` pairs
    pub(crate) set: Vec<String>,
    /// Rendered sub-select of `INSERT ... SELECT`
    pub(crate) select: Option<String>,
    /// RETURNING column → placeholder, in insertion order
    pub(crate) returning: Vec<(String, String)>,
}

impl QueryFragments {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether nothing has been accumulated yet.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `AND`-combine into a predicate bucket; the first predicate stays bare.
    pub(crate) fn and_predicate(bucket: &mut Vec<String>, condition: &str) {
        if bucket.is_empty() {
            bucket.push(condition.to_string());
        } else {
            bucket.push(format!("AND {condition}"));
        }
    }

    /// `OR`-combine into a predicate bucket. Always prefixed.
    pub(crate) fn or_predicate(bucket: &mut Vec<String>, condition: &str) {
        bucket.push(format!("OR {condition}"));
    }

    pub(crate) fn set_value(&mut self, column: &str, value: String) {
        match self.values.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column.to_string(), value)),
        }
    }

    pub(crate) fn set_returning(&mut self, column: &str, bind: &str) {
        match self.returning.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = bind.to_string(),
            None => self.returning.push((column.to_string(), bind.to_string())),
        }
    }

    /// ` WHERE ...`, or nothing.
    pub(crate) fn render_where(&self) -> String {
        if self.where_.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_.join(SPACE))
        }
    }

    /// ` RETURNING c1, c2 INTO :p1, :p2`, or nothing.
    pub(crate) fn render_returning(&self) -> String {
        if self.returning.is_empty() {
            return String::new();
        }
        let (columns, binds): (Vec<&str>, Vec<&str>) = self
            .returning
            .iter()
            .map(|(c, b)| (c.as_str(), b.as_str()))
            .unzip();
        format!(
            " RETURNING {} INTO {}",
            columns.join(COMMA),
            binds.join(COMMA)
        )
    }
}

/// `table` or `table alias`.
pub(crate) fn with_alias(table: &str, alias: &str) -> String {
    if alias.is_empty() {
        table.to_string()
    } else {
        format!("{table} {alias}")
    }
}

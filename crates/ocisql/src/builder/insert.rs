use super::fragments::{COMMA, QueryFragments};
use super::select::Select;
use super::traits::{MutationBuilder, SqlBuilder};

/// INSERT builder.
///
/// Values are spliced as given, so pass placeholders or [`quote`](super::quote)d
/// literals.
///
/// ```ignore
/// // INSERT INTO users (USER_ID, NAME) VALUES (:ID, :NAME) RETURNING CREATED INTO :CREATED
/// let sql = Insert::start()
///     .into_table("users")
///     .values([("USER_ID", ":ID"), ("NAME", ":NAME")])
///     .returning("CREATED", ":CREATED")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Insert {
    query: QueryFragments,
}

impl Insert {
    pub fn start() -> Self {
        Self::default()
    }

    pub fn quote(value: &str) -> String {
        super::quote(value)
    }

    /// Set the target table (`INSERT INTO table`).
    pub fn into_table(&mut self, table: &str) -> &mut Self {
        self.query.table = table.to_string();
        self
    }

    /// Set one column value. Setting a column again replaces its value.
    pub fn value(&mut self, column: &str, value: impl ToString) -> &mut Self {
        self.query.set_value(column, value.to_string());
        self
    }

    /// Set several column values, in order.
    pub fn values<I, K, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        for (column, value) in values {
            self.query.set_value(column.as_ref(), value.to_string());
        }
        self
    }

    /// Column list for `INSERT ... SELECT`.
    pub fn columns<I>(&mut self, list: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        self.query
            .columns
            .extend(list.into_iter().map(|c| c.to_string()));
        self
    }

    /// Insert the rows of `select` (built immediately) instead of VALUES.
    pub fn select(&mut self, select: &mut Select) -> &mut Self {
        self.query.select = Some(select.build());
        self
    }

    /// Return `column` into the output placeholder `bind`.
    pub fn returning(&mut self, column: &str, bind: &str) -> &mut Self {
        self.query.set_returning(column, bind);
        self
    }

    /// Render without resetting.
    pub fn to_sql(&self) -> String {
        let q = &self.query;
        if let Some(select) = &q.select {
            return format!(
                "INSERT INTO {} ({}) {select}",
                q.table,
                q.columns.join(COMMA)
            );
        }

        let (columns, values): (Vec<&str>, Vec<&str>) = q
            .values
            .iter()
            .map(|(c, v)| (c.as_str(), v.as_str()))
            .unzip();
        format!(
            "INSERT INTO {} ({}) VALUES ({}){}",
            q.table,
            columns.join(COMMA),
            values.join(COMMA),
            q.render_returning()
        )
    }

    /// Render the SQL and reset the builder.
    pub fn build(&mut self) -> String {
        let sql = self.to_sql();
        self.query.reset();
        sql
    }
}

impl SqlBuilder for Insert {
    fn build(&mut self) -> String {
        Insert::build(self)
    }
}

impl MutationBuilder for Insert {}

use super::fragments::{COMMA, QueryFragments, with_alias};
use super::traits::{MutationBuilder, SqlBuilder, WhereClause};

/// UPDATE builder.
///
/// ```ignore
/// // UPDATE users u SET u.name = 'O''neil' WHERE u.id = 1
/// let sql = Update::start()
///     .table_as("users", "u")
///     .set("u.name", Update::quote("O'neil"))
///     .where_("u.id = 1")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Update {
    query: QueryFragments,
}

impl Update {
    pub fn start() -> Self {
        Self::default()
    }

    pub fn quote(value: &str) -> String {
        super::quote(value)
    }

    pub fn table(&mut self, table: &str) -> &mut Self {
        self.table_as(table, "")
    }

    pub fn table_as(&mut self, table: &str, alias: &str) -> &mut Self {
        self.query.table = with_alias(table, alias);
        self
    }

    /// Append `column = value`.
    pub fn set(&mut self, column: &str, value: impl ToString) -> &mut Self {
        self.query
            .set
            .push(format!("{column} = {}", value.to_string()));
        self
    }

    /// Return `column` into the output placeholder `bind`.
    pub fn returning(&mut self, column: &str, bind: &str) -> &mut Self {
        self.query.set_returning(column, bind);
        self
    }

    pub fn to_sql(&self) -> String {
        let q = &self.query;
        format!(
            "UPDATE {} SET {}{}{}",
            q.table,
            q.set.join(COMMA),
            q.render_where(),
            q.render_returning()
        )
    }

    pub fn build(&mut self) -> String {
        let sql = self.to_sql();
        self.query.reset();
        sql
    }
}

impl SqlBuilder for Update {
    fn build(&mut self) -> String {
        Update::build(self)
    }
}

impl WhereClause for Update {
    fn fragments_mut(&mut self) -> &mut QueryFragments {
        &mut self.query
    }
}

impl MutationBuilder for Update {}

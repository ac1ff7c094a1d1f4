use super::fragments::{QueryFragments, with_alias};
use super::traits::{MutationBuilder, SqlBuilder, WhereClause};

/// DELETE builder.
#[derive(Debug, Clone, Default)]
pub struct Delete {
    query: QueryFragments,
}

impl Delete {
    pub fn start() -> Self {
        Self::default()
    }

    pub fn quote(value: &str) -> String {
        super::quote(value)
    }

    pub fn from(&mut self, table: &str) -> &mut Self {
        self.from_as(table, "")
    }

    pub fn from_as(&mut self, table: &str, alias: &str) -> &mut Self {
        self.query.table = with_alias(table, alias);
        self
    }

    pub fn to_sql(&self) -> String {
        format!("DELETE FROM {}{}", self.query.table, self.query.render_where())
    }

    pub fn build(&mut self) -> String {
        let sql = self.to_sql();
        self.query.reset();
        sql
    }
}

impl SqlBuilder for Delete {
    fn build(&mut self) -> String {
        Delete::build(self)
    }
}

impl WhereClause for Delete {
    fn fragments_mut(&mut self) -> &mut QueryFragments {
        &mut self.query
    }
}

impl MutationBuilder for Delete {}

use super::fragments::{COMMA, QueryFragments, SPACE, with_alias};
use super::traits::{SqlBuilder, WhereClause};
use crate::driver::Driver;
use crate::error::OciResult;
use crate::native::NativeConnection;
use crate::param::ParameterBinder;
use crate::row::Row;
use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};

/// A table expression: a table name or a nested [`Select`].
///
/// A nested select is built (and therefore reset) when it is consumed, and
/// spliced in parentheses.
pub trait TableSource {
    fn into_table_sql(self) -> String;
}

impl TableSource for &str {
    fn into_table_sql(self) -> String {
        self.to_string()
    }
}

impl TableSource for String {
    fn into_table_sql(self) -> String {
        self
    }
}

impl TableSource for &String {
    fn into_table_sql(self) -> String {
        self.clone()
    }
}

impl TableSource for &mut Select {
    fn into_table_sql(self) -> String {
        format!("({})", self.build())
    }
}

impl TableSource for Select {
    fn into_table_sql(mut self) -> String {
        format!("({})", self.build())
    }
}

/// SELECT builder.
///
/// Oracle has no `LIMIT`/`OFFSET`; [`set_limit`](Self::set_limit) is emulated
/// with `ROWNUM` by nesting the finished query.
///
/// ```ignore
/// // SELECT p.id, p.name FROM params p INNER JOIN users u ON u.user_id = p.user_id
/// let sql = Select::start()
///     .qualified_columns("p", ["id", "name"])
///     .from_as("params", "p")
///     .join("users", "u", "u.user_id = p.user_id")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Select {
    query: QueryFragments,
    /// Rendered branches preceding the current one, each followed by ` UNION `
    union_sql: String,
    limit: u64,
    offset: u64,
    distinct: bool,
    /// Dedup keys of joins already added
    joins_seen: HashSet<u64>,
}

impl Select {
    pub fn start() -> Self {
        Self::default()
    }

    /// Quote a literal for direct splicing.
    pub fn quote(value: &str) -> String {
        super::quote(value)
    }

    /// Add a column (or any select-list expression).
    pub fn column(&mut self, name: &str) -> &mut Self {
        self.query.columns.push(name.to_string());
        self
    }

    /// Add a column prefixed with `prefix.`.
    pub fn qualified_column(&mut self, prefix: &str, name: &str) -> &mut Self {
        self.query.columns.push(qualify(prefix, name));
        self
    }

    /// Add several columns.
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

    /// Add several columns, each prefixed with `prefix.`.
    pub fn qualified_columns<I>(&mut self, prefix: &str, list: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        self.query
            .columns
            .extend(list.into_iter().map(|c| qualify(prefix, &c.to_string())));
        self
    }

    /// Render `SELECT DISTINCT`.
    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Add a FROM item. Several calls produce a comma-separated list.
    pub fn from(&mut self, table: impl TableSource) -> &mut Self {
        self.from_as(table, "")
    }

    /// Add an aliased FROM item.
    pub fn from_as(&mut self, table: impl TableSource, alias: &str) -> &mut Self {
        let table = table.into_table_sql();
        self.query.from.push(with_alias(&table, alias));
        self
    }

    /// Add an `INNER JOIN`. A join on the same alias and table is only added once.
    pub fn join(&mut self, table: impl TableSource, alias: &str, condition: &str) -> &mut Self {
        self.add_join("INNER", table, alias, condition)
    }

    /// Add a `LEFT JOIN`. A join on the same alias and table is only added once.
    pub fn left_join(&mut self, table: impl TableSource, alias: &str, condition: &str) -> &mut Self {
        self.add_join("LEFT", table, alias, condition)
    }

    /// Add a `RIGHT JOIN`. A join on the same alias and table is only added once.
    pub fn right_join(
        &mut self,
        table: impl TableSource,
        alias: &str,
        condition: &str,
    ) -> &mut Self {
        self.add_join("RIGHT", table, alias, condition)
    }

    fn add_join(
        &mut self,
        kind: &str,
        table: impl TableSource,
        alias: &str,
        condition: &str,
    ) -> &mut Self {
        let table = table.into_table_sql();
        if !self.joins_seen.insert(join_key(alias, &table)) {
            return self;
        }
        self.query
            .join
            .push(format!("{kind} JOIN {table} {alias} ON {condition}"));
        self
    }

    /// Add a GROUP BY expression.
    pub fn group_by(&mut self, expr: &str) -> &mut Self {
        self.query.group_by.push(expr.to_string());
        self
    }

    /// Alias of [`and_having`](Self::and_having).
    pub fn having(&mut self, condition: &str) -> &mut Self {
        self.and_having(condition)
    }

    /// Add an `AND` HAVING predicate; the first one stays bare.
    pub fn and_having(&mut self, condition: &str) -> &mut Self {
        QueryFragments::and_predicate(&mut self.query.having, condition);
        self
    }

    /// Add an `OR` HAVING predicate.
    pub fn or_having(&mut self, condition: &str) -> &mut Self {
        QueryFragments::or_predicate(&mut self.query.having, condition);
        self
    }

    /// Close the current branch with ` UNION ` and start the next one.
    ///
    /// The next branch starts empty: fragments, joins seen and the DISTINCT
    /// flag are cleared, so call [`distinct`](Self::distinct) again per branch.
    /// ORDER BY and the limit apply to the whole union, so add them last.
    pub fn union(&mut self) -> &mut Self {
        let branch = self.render_partial();
        self.union_sql.push_str(&branch);
        self.union_sql.push_str(" UNION ");
        self.query.reset();
        self.joins_seen.clear();
        self.distinct = false;
        self
    }

    /// Close the current branch and append `other` as the next one.
    pub fn union_with(&mut self, other: &mut Select) -> &mut Self {
        self.union();
        let branch = other.build();
        self.union_sql.push_str(&branch);
        self
    }

    /// Add an ORDER BY item, e.g. `order_by("p.id", "DESC NULLS FIRST")`.
    pub fn order_by(&mut self, sort: &str, order: &str) -> &mut Self {
        self.query.order_by.push(format!("{sort} {order}"));
        self
    }

    /// Add an ascending ORDER BY item.
    pub fn order_by_asc(&mut self, sort: &str) -> &mut Self {
        self.order_by(sort, "ASC")
    }

    /// Limit the result to `limit` rows after skipping `offset`.
    ///
    /// Negative values are clamped to zero; a zero limit disables limiting.
    pub fn set_limit(&mut self, limit: i64, offset: i64) -> &mut Self {
        self.limit = limit.max(0).unsigned_abs();
        self.offset = offset.max(0).unsigned_abs();
        self
    }

    /// Shorthand for `set_limit(limit, 0)`.
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.set_limit(limit, 0)
    }

    /// SELECT of the current branch, without ORDER BY. Empty without columns.
    fn render_partial(&self) -> String {
        let q = &self.query;
        if q.columns.is_empty() {
            return String::new();
        }

        let mut sql = String::from(if self.distinct {
            "SELECT DISTINCT "
        } else {
            "SELECT "
        });
        sql.push_str(&q.columns.join(COMMA));
        sql.push_str(" FROM ");
        sql.push_str(&q.from.join(COMMA));

        if !q.join.is_empty() {
            sql.push(' ');
            sql.push_str(&q.join.join(SPACE));
        }
        sql.push_str(&q.render_where());
        if !q.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&q.group_by.join(COMMA));
        }
        if !q.having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&q.having.join(SPACE));
        }
        sql
    }

    /// Render without resetting.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{}{}", self.union_sql, self.render_partial());
        if !self.query.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.query.order_by.join(COMMA));
        }
        if self.limit > 0 {
            sql = paginate(&sql, self.limit, self.offset);
        }
        sql
    }

    /// Render the SQL and reset the builder for the next statement.
    pub fn build(&mut self) -> String {
        let sql = self.to_sql();
        *self = Self::default();
        sql
    }

    /// Build and fetch all rows.
    pub fn fetch_all<C: NativeConnection>(
        &mut self,
        driver: &Driver<C>,
        binder: Option<&mut ParameterBinder>,
    ) -> OciResult<Vec<Row>> {
        let sql = self.build();
        driver.fetch_all_rows(&sql, binder)
    }

    /// Build and fetch the first row.
    pub fn fetch_one<C: NativeConnection>(
        &mut self,
        driver: &Driver<C>,
        binder: Option<&mut ParameterBinder>,
    ) -> OciResult<Option<Row>> {
        let sql = self.build();
        driver.fetch_one_row(&sql, binder)
    }
}

impl SqlBuilder for Select {
    fn build(&mut self) -> String {
        Select::build(self)
    }
}

impl WhereClause for Select {
    fn fragments_mut(&mut self) -> &mut QueryFragments {
        &mut self.query
    }
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn join_key(alias: &str, table: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    alias.hash(&mut hasher);
    table.hash(&mut hasher);
    hasher.finish()
}

/// Wrap `query` in the ROWNUM pagination pattern.
///
/// ROWNUM is assigned as rows come out of the inner query, so the upper bound
/// is applied one level up and the lower bound (which needs a materialized row
/// number) one more level up.
fn paginate(query: &str, limit: u64, offset: u64) -> String {
    let upper = offset.saturating_add(limit);
    if offset == 0 {
        return format!("SELECT a.* FROM ({query}) a WHERE ROWNUM <= {upper}");
    }
    format!(
        "SELECT * FROM (SELECT a.*, ROWNUM AS row_number FROM ({query}) a WHERE ROWNUM <= {upper}) WHERE row_number >= {}",
        offset + 1
    )
}

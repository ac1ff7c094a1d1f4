use super::fragments::QueryFragments;
use crate::driver::Driver;
use crate::error::OciResult;
use crate::native::NativeConnection;
use crate::param::ParameterBinder;

/// Base trait for SQL builders.
pub trait SqlBuilder: Default {
    /// Start a new, empty builder.
    fn start() -> Self {
        Self::default()
    }

    /// Render the SQL and reset the builder for the next statement.
    fn build(&mut self) -> String;

    /// Quote a literal for direct splicing.
    fn quote(value: &str) -> String {
        super::quote(value)
    }
}

/// WHERE predicates shared by SELECT, UPDATE and DELETE.
///
/// The first predicate is never prefixed, whichever method adds it, except
/// that `or_where` always emits `OR `:
///
/// ```ignore
/// // DELETE FROM params p WHERE p.id > 1 AND (p.name = :name OR p.active = :active)
/// let sql = Delete::start()
///     .from_as("params", "p")
///     .where_("p.id > 1")
///     .and_where("(p.name = :name OR p.active = :active)")
///     .build();
/// ```
pub trait WhereClause {
    #[doc(hidden)]
    fn fragments_mut(&mut self) -> &mut QueryFragments;

    /// Alias of [`and_where`](Self::and_where).
    fn where_(&mut self, condition: &str) -> &mut Self {
        self.and_where(condition)
    }

    /// Add an `AND` predicate. Parenthesize conditions mixing AND and OR.
    fn and_where(&mut self, condition: &str) -> &mut Self {
        QueryFragments::and_predicate(&mut self.fragments_mut().where_, condition);
        self
    }

    /// Add an `OR` predicate. Parenthesize conditions mixing AND and OR.
    fn or_where(&mut self, condition: &str) -> &mut Self {
        QueryFragments::or_predicate(&mut self.fragments_mut().where_, condition);
        self
    }
}

/// Builders for statements that report an affected row count.
pub trait MutationBuilder: SqlBuilder {
    /// Build and execute; returns the affected row count.
    fn execute<C: NativeConnection>(
        &mut self,
        driver: &Driver<C>,
        binder: Option<&mut ParameterBinder>,
    ) -> OciResult<u64> {
        let sql = self.build();
        driver.execute_update(&sql, binder)
    }
}

use std::sync::Arc;

use crate::ast::{
    ColumnRef, Cte, Distinct, Expression, Join, JoinKind, Operand, OrderByItem, SelectItem,
    SelectQuery, SetOperation, SetOperator, TableSource,
};
use crate::compiler::{CompiledQuery, SqlCompiler};
use crate::error::{QuarryError, Result};
use crate::expr::{conjoin, operands, IntoOperand};
use crate::hydrate::{hydrate, Entity};
use crate::relation::{plan_include, relation_filter, HydrationPlan, IncludeOptions, RelationFilter};
use crate::schema::{Schema, TableDef};
use crate::value::Row;

use super::qualify::RootQualifier;
use super::table_ref;

/// SELECT over one root table, optionally with relation includes.
///
/// Once an include is added every unqualified root column in the outer
/// query (projection, WHERE, GROUP BY, HAVING and ORDER BY) is qualified by
/// the root table name, including clauses added later, and columns the joins depend on are projected even when the caller
/// did not ask for them.
///
/// LIMIT and OFFSET count joined rows, not roots, when a to-many relation
/// is included.
#[derive(Debug, Clone)]
pub struct SelectState {
    schema: Arc<Schema>,
    table: Arc<TableDef>,
    query: SelectQuery,
    plan: HydrationPlan,
    /// Root columns the hydration and the include joins read
    root_keys: Vec<String>,
}

impl SelectState {
    pub fn new(schema: Arc<Schema>, table: &str, separator: &str) -> Result<Self> {
        let table = Arc::clone(schema.table(table)?);
        let query = SelectQuery {
            from: Some(TableSource::Table(table_ref(&table))),
            ..SelectQuery::default()
        };
        let plan = HydrationPlan::new(table.primary_key.clone()).with_separator(separator);
        Ok(Self {
            schema,
            table,
            query,
            plan,
            root_keys: Vec::new(),
        })
    }

    pub fn table(&self) -> &TableDef {
        &self.table
    }

    pub fn query(&self) -> &SelectQuery {
        &self.query
    }

    pub fn plan(&self) -> &HydrationPlan {
        &self.plan
    }

    pub fn build(&self) -> SelectQuery {
        self.query.clone()
    }

    pub fn into_parts(self) -> (SelectQuery, HydrationPlan) {
        (self.query, self.plan)
    }

    fn has_includes(&self) -> bool {
        !self.plan.relations.is_empty()
    }

    fn root_column(&self, name: &str) -> ColumnRef {
        if self.has_includes() {
            ColumnRef::qualified(&self.table.name, name)
        } else {
            ColumnRef::new(name)
        }
    }

    fn qualifier(&self) -> Option<RootQualifier<'_>> {
        self.has_includes().then(|| RootQualifier::new(&self.table))
    }

    fn with_query(&self, edit: impl FnOnce(&mut SelectQuery)) -> Self {
        let mut next = self.clone();
        edit(&mut next.query);
        next
    }

    /// Replaces the root projection with `columns`, each checked against the
    /// root table. Include projections are kept.
    pub fn columns<I, S>(&self, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut items = Vec::new();
        for column in columns {
            let column = column.as_ref();
            self.table.require_column(column)?;
            items.push(SelectItem::new(self.root_column(column)));
        }
        let mut next = self.clone();
        let included = next
            .query
            .columns
            .drain(..)
            .filter(|item| is_include_item(&self.plan, item));
        items.extend(included);
        next.query.columns = items;
        let keys = next.root_keys.clone();
        next.require_root_columns(&keys)?;
        Ok(next)
    }

    /// Projects an arbitrary operand under `alias`.
    pub fn select_expr(&self, expr: impl IntoOperand, alias: &str) -> Result<Self> {
        let mut expr = expr.into_operand("select")?;
        if let Some(qualifier) = self.qualifier() {
            qualifier.operand(&mut expr);
        }
        Ok(self.with_query(|q| q.columns.push(SelectItem::aliased(expr, alias))))
    }

    /// ANDs `condition` onto the WHERE clause.
    pub fn r#where(&self, mut condition: Expression) -> Self {
        if let Some(qualifier) = self.qualifier() {
            qualifier.expression(&mut condition);
        }
        self.with_query(|q| q.where_ = Some(conjoin(q.where_.take(), condition)))
    }

    pub fn join(&self, kind: JoinKind, source: impl Into<TableSource>, on: Expression) -> Self {
        let join = Join {
            kind,
            source: source.into(),
            on: Some(on),
        };
        self.with_query(|q| q.joins.push(join))
    }

    pub fn inner_join(&self, source: impl Into<TableSource>, on: Expression) -> Self {
        self.join(JoinKind::Inner, source, on)
    }

    pub fn left_join(&self, source: impl Into<TableSource>, on: Expression) -> Self {
        self.join(JoinKind::Left, source, on)
    }

    pub fn cross_join(&self, source: impl Into<TableSource>) -> Self {
        let join = Join {
            kind: JoinKind::Cross,
            source: source.into(),
            on: None,
        };
        self.with_query(|q| q.joins.push(join))
    }

    pub fn group_by<I, T>(&self, exprs: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: IntoOperand,
    {
        let mut exprs = operands("group_by", exprs)?;
        if let Some(qualifier) = self.qualifier() {
            exprs.iter_mut().for_each(|expr| qualifier.operand(expr));
        }
        Ok(self.with_query(|q| q.group_by.extend(exprs)))
    }

    /// ANDs `condition` onto the HAVING clause.
    pub fn having(&self, mut condition: Expression) -> Self {
        if let Some(qualifier) = self.qualifier() {
            qualifier.expression(&mut condition);
        }
        self.with_query(|q| q.having = Some(conjoin(q.having.take(), condition)))
    }

    pub fn order_by(&self, items: impl IntoIterator<Item = OrderByItem>) -> Self {
        let mut items: Vec<_> = items.into_iter().collect();
        if let Some(qualifier) = self.qualifier() {
            qualifier.order_items(&mut items);
        }
        self.with_query(|q| q.order_by.extend(items))
    }

    #[inline]
    pub fn limit(&self, limit: u64) -> Self {
        self.with_query(|q| q.limit = Some(limit))
    }

    #[inline]
    pub fn offset(&self, offset: u64) -> Self {
        self.with_query(|q| q.offset = Some(offset))
    }

    pub fn distinct(&self) -> Self {
        self.with_query(|q| q.distinct = Some(Distinct::All))
    }

    pub fn distinct_on<I, T>(&self, exprs: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: IntoOperand,
    {
        let exprs = operands("distinct_on", exprs)?;
        if exprs.is_empty() {
            return Err(QuarryError::invalid_operand(
                "distinct_on",
                "expected at least one expression",
            ));
        }
        Ok(self.with_query(|q| q.distinct = Some(Distinct::On(exprs))))
    }

    /// Prepends `WITH name AS (query)`.
    pub fn with_cte(&self, name: &str, query: &SelectState) -> Self {
        self.push_cte(name, Vec::new(), query.build(), false)
    }

    /// Prepends `WITH RECURSIVE name (columns) AS (query)`; `query` is
    /// normally a UNION ALL of an anchor and a step referencing `name`.
    pub fn with_recursive_cte<I, S>(&self, name: &str, columns: I, query: SelectQuery) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        self.push_cte(name, columns, query, true)
    }

    fn push_cte(&self, name: &str, columns: Vec<String>, query: SelectQuery, recursive: bool) -> Self {
        let cte = Cte {
            name: name.to_owned(),
            columns,
            query: Box::new(query),
            recursive,
        };
        self.with_query(|q| q.ctes.push(cte))
    }

    pub fn union(&self, other: &SelectState) -> Result<Self> {
        self.set_operation(SetOperator::Union, other)
    }

    pub fn union_all(&self, other: &SelectState) -> Result<Self> {
        self.set_operation(SetOperator::UnionAll, other)
    }

    pub fn intersect(&self, other: &SelectState) -> Result<Self> {
        self.set_operation(SetOperator::Intersect, other)
    }

    pub fn except(&self, other: &SelectState) -> Result<Self> {
        self.set_operation(SetOperator::Except, other)
    }

    fn set_operation(&self, op: SetOperator, other: &SelectState) -> Result<Self> {
        if self.has_includes() || other.has_includes() {
            return Err(QuarryError::InvalidStatement(
                "set operations cannot combine queries with relation includes".into(),
            ));
        }
        let operation = SetOperation {
            op,
            query: Box::new(other.build()),
        };
        Ok(self.with_query(|q| q.set_ops.push(operation)))
    }

    /// Includes relation `name`, adding its joins, its aliased columns and a
    /// hydration fragment.
    ///
    /// Including the same relation twice plans it again under a fresh prefix
    /// (`posts_2`), which is also the name its hydrated slot gets.
    pub fn include(&self, name: &str, options: IncludeOptions) -> Result<Self> {
        if !self.query.set_ops.is_empty() {
            return Err(QuarryError::InvalidStatement(
                "relation includes cannot be added to a compound query".into(),
            ));
        }
        let primary_key = self.table.require_primary_key()?.to_owned();

        let prefix = self.unique_prefix(name);
        let mut planned = plan_include(
            &self.schema,
            &self.table,
            &self.table.name,
            name,
            &prefix,
            &options,
            &self.plan,
        )?;
        if prefix != name {
            planned.relation.name = prefix.clone();
        }

        let mut next = self.clone();
        next.qualify_root_columns();
        next.query.joins.extend(planned.joins);
        next.query.columns.extend(planned.columns);
        next.plan.relations.push(planned.relation);
        for key in std::iter::once(primary_key).chain(planned.required_root_columns) {
            if !next.root_keys.contains(&key) {
                next.root_keys.push(key);
            }
        }
        let keys = next.root_keys.clone();
        next.require_root_columns(&keys)?;
        Ok(next)
    }

    /// ANDs a relation filter (`EXISTS`/`NOT EXISTS`/grouped count) onto
    /// the WHERE clause.
    pub fn filter_relation(&self, name: &str, filter: RelationFilter) -> Result<Self> {
        let condition = relation_filter(&self.schema, &self.table, &self.table.name, name, &filter)?;
        Ok(self.r#where(condition))
    }

    pub fn compile(&self, compiler: &SqlCompiler) -> Result<CompiledQuery> {
        compiler.compile_select(&self.query)
    }

    /// Hydrates rows returned for this state's compiled SQL.
    pub fn hydrate(&self, rows: &[Row]) -> Vec<Entity> {
        hydrate(rows, &self.plan)
    }

    fn unique_prefix(&self, name: &str) -> String {
        let taken = |prefix: &str| {
            self.plan.uses_prefix(prefix) || self.plan.uses_prefix(&format!("{prefix}_pivot"))
        };
        if !taken(name) {
            return name.to_owned();
        }
        let mut suffix = 2usize;
        loop {
            let candidate = format!("{name}_{suffix}");
            if !taken(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Qualifies unqualified root columns in every outer clause; an empty
    /// projection becomes every root column.
    fn qualify_root_columns(&mut self) {
        let root = self.table.name.as_str();
        if self.query.columns.is_empty() {
            self.query.columns = self
                .table
                .column_names()
                .map(|column| SelectItem::new(ColumnRef::qualified(root, column)))
                .collect();
        }
        RootQualifier::new(&self.table).query(&mut self.query);
    }

    fn require_root_columns(&mut self, columns: &[String]) -> Result<()> {
        let root = self.table.name.clone();
        for column in columns {
            self.table.require_column(column)?;
            let present = self.query.columns.iter().any(|item| match &item.expr {
                Operand::Column(c) => {
                    c.name == *column && c.qualifier() == Some(root.as_str()) && c.alias.is_none()
                        && item.alias.is_none()
                }
                _ => false,
            });
            if !present {
                let position = self
                    .query
                    .columns
                    .iter()
                    .position(|item| is_include_item(&self.plan, item))
                    .unwrap_or(self.query.columns.len());
                self.query.columns.insert(
                    position,
                    SelectItem::new(ColumnRef::qualified(root.as_str(), column.as_str())),
                );
            }
        }
        Ok(())
    }
}

fn is_include_item(plan: &HydrationPlan, item: &SelectItem) -> bool {
    item.alias
        .as_deref()
        .is_some_and(|alias| plan.is_relation_alias(alias))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Dialect;
    use crate::expr::{col, count_all, eq, gt};
    use crate::query::fixtures::schema;
    use crate::query::QueryBuilder;
    use crate::value::Value;

    fn ansi() -> SqlCompiler {
        SqlCompiler::new(Dialect::ansi("ansi"))
    }

    #[test]
    fn states_are_immutable() {
        let qb = QueryBuilder::new(schema());
        let base = qb.select("todos").unwrap().r#where(eq(col("done"), 0).unwrap());
        let paged = base.limit(10);
        assert_eq!(base.query().limit, None);
        assert_eq!(paged.query().limit, Some(10));
        assert_eq!(
            base.compile(&ansi()).unwrap().sql,
            "SELECT * FROM \"todos\" WHERE \"done\" = ?"
        );
    }

    #[test]
    fn columns_are_checked_against_the_table() {
        let qb = QueryBuilder::new(schema());
        let err = qb.select("todos").unwrap().columns(["nope"]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown column `nope` on table `todos`");
        assert!(matches!(
            qb.select("missing").unwrap_err(),
            QuarryError::UnknownTable(_)
        ));
    }

    #[test]
    fn include_qualifies_root_and_forces_keys() {
        let qb = QueryBuilder::new(schema());
        let state = qb
            .select("users")
            .unwrap()
            .columns(["name"])
            .unwrap()
            .include("posts", IncludeOptions::new().columns(["title"]))
            .unwrap();
        let out = state.compile(&ansi()).unwrap();
        assert_eq!(
            out.sql,
            "SELECT \"users\".\"name\", \"users\".\"id\", \"posts\".\"id\" AS \"posts__id\", \
             \"posts\".\"title\" AS \"posts__title\" FROM \"users\" \
             LEFT JOIN \"posts\" AS \"posts\" ON \"posts\".\"user_id\" = \"users\".\"id\""
        );
        assert_eq!(state.plan().relations[0].columns, ["id", "title"]);
    }

    #[test]
    fn include_qualifies_root_columns_in_every_clause() {
        let qb = QueryBuilder::new(schema());
        let state = qb
            .select("users")
            .unwrap()
            .r#where(eq(col("id"), 1).unwrap())
            .order_by([OrderByItem::asc(col("id"))])
            .include("posts", IncludeOptions::new().columns(["title"]))
            .unwrap()
            .r#where(gt(col("name"), "a").unwrap())
            .order_by([OrderByItem::desc(col("name"))]);
        let out = state.compile(&ansi()).unwrap();
        assert_eq!(
            out.sql,
            "SELECT \"users\".\"id\", \"users\".\"name\", \"users\".\"email\", \
             \"posts\".\"id\" AS \"posts__id\", \"posts\".\"title\" AS \"posts__title\" FROM \"users\" \
             LEFT JOIN \"posts\" AS \"posts\" ON \"posts\".\"user_id\" = \"users\".\"id\" \
             WHERE (\"users\".\"id\" = ? AND \"users\".\"name\" > ?) \
             ORDER BY \"users\".\"id\" ASC, \"users\".\"name\" DESC"
        );
        assert_eq!(out.params, vec![Value::from(1), Value::from("a")]);
    }

    #[test]
    fn include_leaves_non_root_columns_alone() {
        let qb = QueryBuilder::new(schema());
        let state = qb
            .select("users")
            .unwrap()
            .include("posts", IncludeOptions::new())
            .unwrap()
            .group_by([col("id"), col("title")])
            .unwrap()
            .having(gt(count_all(), 1).unwrap());
        assert_eq!(
            state.query().group_by,
            vec![
                Operand::from(ColumnRef::qualified("users", "id")),
                Operand::from(ColumnRef::new("title")),
            ]
        );
    }

    #[test]
    fn columns_after_include_keep_join_keys() {
        let qb = QueryBuilder::new(schema());
        let state = qb
            .select("posts")
            .unwrap()
            .include("author", IncludeOptions::new().columns(["name"]))
            .unwrap()
            .columns(["title"])
            .unwrap();
        let names: Vec<_> = state
            .query()
            .columns
            .iter()
            .map(|item| match &item.expr {
                Operand::Column(c) => item.alias.clone().unwrap_or_else(|| c.name.clone()),
                _ => String::new(),
            })
            .collect();
        assert_eq!(names, ["title", "id", "user_id", "author__id", "author__name"]);
    }

    #[test]
    fn repeated_includes_get_fresh_prefixes() {
        let qb = QueryBuilder::new(schema());
        let state = qb
            .select("users")
            .unwrap()
            .include("posts", IncludeOptions::new())
            .unwrap()
            .include("posts", IncludeOptions::new().columns(["title"]))
            .unwrap();
        let prefixes: Vec<_> = state
            .plan()
            .relations
            .iter()
            .map(|r| (r.name.as_str(), r.alias_prefix.as_str()))
            .collect();
        assert_eq!(prefixes, [("posts", "posts"), ("posts_2", "posts_2")]);
    }

    #[test]
    fn set_operations_reject_includes() {
        let qb = QueryBuilder::new(schema());
        let users = qb
            .select("users")
            .unwrap()
            .include("posts", IncludeOptions::new())
            .unwrap();
        let other = qb.select("users").unwrap();
        assert!(users.union(&other).is_err());
        assert!(other.union_all(&other).unwrap().include("posts", IncludeOptions::new()).is_err());
    }

    #[test]
    fn aggregate_select() {
        let qb = QueryBuilder::new(schema());
        let state = qb
            .select("todos")
            .unwrap()
            .columns(["done"])
            .unwrap()
            .select_expr(count_all(), "total")
            .unwrap()
            .group_by([col("done")])
            .unwrap()
            .having(gt(count_all(), 1).unwrap());
        let out = state.compile(&ansi()).unwrap();
        assert_eq!(
            out.sql,
            "SELECT \"done\", COUNT(*) AS \"total\" FROM \"todos\" GROUP BY \"done\" HAVING COUNT(*) > ?"
        );
        assert_eq!(out.params, vec![Value::from(1)]);
    }
}

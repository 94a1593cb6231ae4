//! Dialect compiler framework.
//!
//! One shared pipeline ([`SqlWriter`]) assembles every statement in a fixed
//! clause order and calls through the strategies held by a [`Dialect`] for
//! everything the four target syntaxes disagree on.
//!
//! ```ignore
//! use quarry_core::compiler::{Dialect, SqlCompiler};
//!
//! let compiler = SqlCompiler::new(Dialect::ansi("ansi"));
//! let compiled = compiler.compile(&statement)?;
//! executor.run(&compiled.sql, &compiled.params).await?;
//! ```

mod context;
mod dialect;
mod dml;
mod expr;
mod functions;
mod select;
mod strategy;
mod writer;

pub use context::{CompilerContext, PlaceholderStyle};
pub use dialect::{CallStyle, Capabilities, Dialect, IdentQuote, XorStyle};
pub use dml::validate_insert;
pub use functions::{FunctionRegistry, FunctionRenderer, FunctionWriter};
pub use strategy::*;
pub use writer::{CompiledQuery, SqlWriter};

use std::sync::Arc;

use crate::ast::{CallQuery, DeleteQuery, InsertQuery, SelectQuery, Statement, UpdateQuery};
use crate::ddl::{CompiledDdl, DdlStatement};
use crate::error::Result;

/// Compiles statements for one dialect.
///
/// Stateless apart from its dialect; every call owns a fresh context, so a
/// compiler can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct SqlCompiler {
    dialect: Arc<Dialect>,
}

impl SqlCompiler {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect: Arc::new(dialect),
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn compile(&self, statement: &Statement) -> Result<CompiledQuery> {
        match statement {
            Statement::Select(query) => self.compile_select(query),
            Statement::Insert(query) => self.compile_insert(query),
            Statement::Update(query) => self.compile_update(query),
            Statement::Delete(query) => self.compile_delete(query),
            Statement::Call(query) => self.compile_call(query),
        }
    }

    pub fn compile_select(&self, query: &SelectQuery) -> Result<CompiledQuery> {
        crate::quarry_profile_scope!("compile", "select");
        self.run(|w| w.select(query))
    }

    pub fn compile_insert(&self, query: &InsertQuery) -> Result<CompiledQuery> {
        crate::quarry_profile_scope!("compile", "insert");
        self.run(|w| w.insert(query))
    }

    pub fn compile_update(&self, query: &UpdateQuery) -> Result<CompiledQuery> {
        crate::quarry_profile_scope!("compile", "update");
        self.run(|w| w.update(query))
    }

    pub fn compile_delete(&self, query: &DeleteQuery) -> Result<CompiledQuery> {
        crate::quarry_profile_scope!("compile", "delete");
        self.run(|w| w.delete(query))
    }

    pub fn compile_call(&self, query: &CallQuery) -> Result<CompiledQuery> {
        crate::quarry_profile_scope!("compile", "call");
        self.run(|w| w.call(query))
    }

    /// Compiles a schema change; literals are inlined since DDL cannot bind.
    pub fn compile_ddl(&self, statement: &DdlStatement) -> Result<CompiledDdl> {
        crate::quarry_profile_scope!("compile", "ddl");
        let compiled = self.dialect.ddl.compile(&self.dialect, statement)?;
        crate::quarry_trace_compile!(self.dialect.name(), compiled.statements.join("; "), 0usize);
        Ok(compiled)
    }

    fn run(&self, render: impl FnOnce(&mut SqlWriter<'_>) -> Result<()>) -> Result<CompiledQuery> {
        let mut writer = SqlWriter::new(&self.dialect);
        render(&mut writer)?;
        let compiled = writer.finish();
        crate::quarry_trace_compile!(self.dialect.name(), compiled.sql, compiled.params.len());
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::expr::*;
    use crate::value::Value;

    fn ansi() -> SqlCompiler {
        SqlCompiler::new(Dialect::ansi("ansi"))
    }

    fn users() -> SelectQuery {
        let mut q = SelectQuery::from_table("users");
        q.columns = vec![SelectItem::new(col("id")), SelectItem::new(col("name"))];
        q
    }

    #[test]
    fn select_clause_order() {
        let mut q = users();
        q.where_ = Some(and([eq(col("done"), 0).unwrap(), gt(col("priority"), 2).unwrap()]));
        q.group_by = vec![col("id").into()];
        q.having = Some(gt(count_all(), 1).unwrap());
        q.order_by = vec![OrderByItem::asc(col("id"))];
        q.limit = Some(10);
        q.offset = Some(20);
        let out = ansi().compile_select(&q).unwrap();
        assert_eq!(
            out.sql,
            "SELECT \"id\", \"name\" FROM \"users\" WHERE (\"done\" = ? AND \"priority\" > ?) \
             GROUP BY \"id\" HAVING COUNT(*) > ? ORDER BY \"id\" ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            out.params,
            vec![Value::from(0), Value::from(2), Value::from(1)]
        );
    }

    #[test]
    fn params_follow_emission_order_through_nesting() {
        let mut q = users();
        let sub = {
            let mut s = SelectQuery::from_table("posts");
            s.columns = vec![SelectItem::new(col("user_id"))];
            s.where_ = Some(eq(col("score"), 2).unwrap());
            s
        };
        q.columns.push(SelectItem::aliased(add(col("id"), 1).unwrap(), "next"));
        q.where_ = Some(and([
            in_subquery(col("id"), sub).unwrap(),
            between(col("age"), 3, 4).unwrap(),
        ]));
        let out = ansi().compile_select(&q).unwrap();
        assert_eq!(
            out.params,
            vec![Value::from(1), Value::from(2), Value::from(3), Value::from(4)]
        );
        assert_eq!(out.sql.matches('?').count(), out.params.len());
    }

    #[test]
    fn empty_lists_and_logical_groups_are_constant() {
        let mut q = users();
        q.where_ = Some(or([
            in_list(col("id"), Vec::<i32>::new()).unwrap(),
            not_in_list(col("id"), Vec::<i32>::new()).unwrap(),
            and(Vec::new()),
            or(Vec::new()),
        ]));
        let out = ansi().compile_select(&q).unwrap();
        assert!(out.sql.ends_with("WHERE (1 = 0 OR 1 = 1 OR 1 = 1 OR 1 = 0)"));
        assert!(out.params.is_empty());
    }

    #[test]
    fn compound_queries_order_the_result_only() {
        let mut q = users();
        let mut other = SelectQuery::from_table("admins");
        other.columns = vec![SelectItem::new(col("id")), SelectItem::new(col("name"))];
        q.set_ops = vec![SetOperation {
            op: SetOperator::UnionAll,
            query: Box::new(other),
        }];
        q.order_by = vec![OrderByItem::desc(alias_ref("name"))];
        q.limit = Some(5);
        let out = ansi().compile_select(&q).unwrap();
        assert_eq!(
            out.sql,
            "(SELECT \"id\", \"name\" FROM \"users\") UNION ALL \
             (SELECT \"id\", \"name\" FROM \"admins\") ORDER BY \"name\" DESC LIMIT 5"
        );
    }

    #[test]
    fn recursive_ctes_get_the_keyword() {
        let mut q = SelectQuery::default();
        q.ctes = vec![Cte {
            name: "tree".into(),
            columns: vec!["id".into()],
            query: Box::new(users()),
            recursive: true,
        }];
        q.from = Some(TableSource::table("tree"));
        let out = ansi().compile_select(&q).unwrap();
        assert!(out.sql.starts_with("WITH RECURSIVE \"tree\" (\"id\") AS (SELECT"));
        assert!(out.sql.ends_with(") SELECT * FROM \"tree\""));
    }

    #[test]
    fn distinct_on_is_a_capability() {
        let mut q = users();
        q.distinct = Some(Distinct::On(vec![col("name").into()]));
        let err = ansi().compile_select(&q).unwrap_err();
        assert_eq!(err.to_string(), "DISTINCT ON is not supported by ansi");
    }

    #[test]
    fn ilike_is_emulated_without_native_support() {
        let mut q = users();
        q.where_ = Some(ilike(col("name"), "a%").unwrap());
        let out = ansi().compile_select(&q).unwrap();
        assert!(out.sql.ends_with("WHERE LOWER(\"name\") LIKE LOWER(?)"));
    }

    #[test]
    fn insert_update_delete() {
        let insert = InsertQuery {
            into: TableRef::new("users"),
            columns: vec!["id".into(), "name".into()],
            source: InsertSource::Values(vec![
                vec![lit(1), lit("a")],
                vec![lit(2), lit("b")],
            ]),
            on_conflict: None,
            returning: Returning::None,
        };
        let out = ansi().compile_insert(&insert).unwrap();
        assert_eq!(
            out.sql,
            "INSERT INTO \"users\" (\"id\", \"name\") VALUES (?, ?), (?, ?)"
        );
        assert_eq!(out.params.len(), 4);

        let update = UpdateQuery {
            table: TableRef::new("users"),
            set: vec![Assignment::new("name", lit("z"))],
            where_: Some(eq(col("id"), 1).unwrap()),
            returning: Returning::None,
        };
        assert_eq!(
            ansi().compile_update(&update).unwrap().sql,
            "UPDATE \"users\" SET \"name\" = ? WHERE \"id\" = ?"
        );

        let delete = DeleteQuery {
            from: TableRef::new("users"),
            where_: None,
            returning: Returning::All,
        };
        assert_eq!(
            ansi().compile_delete(&delete).unwrap_err().to_string(),
            "RETURNING is not supported by ansi"
        );
    }

    #[test]
    fn excluded_is_only_legal_inside_upserts() {
        let update = UpdateQuery {
            table: TableRef::new("users"),
            set: vec![Assignment::new("name", excluded("name"))],
            where_: None,
            returning: Returning::None,
        };
        assert!(matches!(
            ansi().compile_update(&update),
            Err(crate::error::QuarryError::InvalidStatement(_))
        ));
    }

    #[test]
    fn insert_shape_is_validated() {
        let insert = InsertQuery {
            into: TableRef::new("users"),
            columns: vec![],
            source: InsertSource::Select(Box::new(users())),
            on_conflict: None,
            returning: Returning::None,
        };
        let err = ansi().compile_insert(&insert).unwrap_err();
        assert!(err.to_string().contains("INSERT...SELECT requires destination columns"));
    }

    fn project(compiler: &SqlCompiler, expr: Operand) -> Result<String> {
        let mut q = SelectQuery::from_table("t");
        q.columns = vec![SelectItem::aliased(expr, "x")];
        compiler.compile_select(&q).map(|out| out.sql)
    }

    #[test]
    fn window_functions_render_over_clause() {
        let ranked = row_number()
            .partition_by([col("dept")])
            .unwrap()
            .order_by([OrderByItem::desc(col("salary"))])
            .build();
        assert_eq!(
            project(&ansi(), ranked).unwrap(),
            "SELECT ROW_NUMBER() OVER (PARTITION BY \"dept\" ORDER BY \"salary\" DESC) AS \"x\" FROM \"t\""
        );
        let running = over(sum(col("amount")).unwrap())
            .unwrap()
            .partition_by([col("account")])
            .unwrap()
            .build();
        assert_eq!(
            project(&ansi(), running).unwrap(),
            "SELECT SUM(\"amount\") OVER (PARTITION BY \"account\") AS \"x\" FROM \"t\""
        );
    }

    #[test]
    fn windowed_aggregates_use_the_function_table() {
        fn total(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
            f.expect_args(1..=1)?;
            f.standard("TOTAL")
        }
        let compiler = SqlCompiler::new(Dialect::ansi("custom").with_function("SUM", total));
        let running = over(sum(col("amount")).unwrap()).unwrap().build();
        assert_eq!(
            project(&compiler, running).unwrap(),
            "SELECT TOTAL(\"amount\") OVER () AS \"x\" FROM \"t\""
        );

        for name in ["no_such_fn", "count(*) FROM secrets; --"] {
            let windowed = over(function(name, vec![]).unwrap()).unwrap().build();
            match project(&ansi(), windowed).unwrap_err() {
                crate::error::QuarryError::UnsupportedFunction { name: missing, .. } => {
                    assert_eq!(missing.as_str(), name);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn deserialized_casts_and_collations_are_checked() {
        let cast: Operand = serde_json::from_value(serde_json::json!({
            "type": "cast",
            "expression": {"type": "column", "table": null, "name": "a"},
            "cast_type": "int) FROM secrets --",
        }))
        .unwrap();
        assert!(matches!(
            project(&ansi(), cast),
            Err(crate::error::QuarryError::InvalidOperand { .. })
        ));
        let collate = Operand::Collate(Collate {
            expression: Box::new(col("a").into()),
            collation: "nocase; --".into(),
        });
        assert!(project(&ansi(), collate).is_err());
    }
}

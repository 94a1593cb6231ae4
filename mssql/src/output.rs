//! `OUTPUT` projections and `MERGE` upserts.

use quarry_core::ast::{
    ConflictAction, ConflictTarget, InsertQuery, InsertSource, OnConflict, Returning,
};
use quarry_core::compiler::{DmlKind, ReturningStrategy, SqlWriter, UpsertStrategy};
use quarry_core::error::{QuarryError, Result};

const TARGET: &str = "target";
const SOURCE: &str = "source";

/// `OUTPUT INSERTED.*` / `OUTPUT DELETED.[id]`, written before the row
/// source (INSERT) or the WHERE clause (UPDATE, DELETE).
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputReturning;

impl ReturningStrategy for OutputReturning {
    fn render_inline(
        &self,
        w: &mut SqlWriter<'_>,
        returning: &Returning,
        kind: DmlKind,
    ) -> Result<()> {
        let pseudo_table = match kind {
            DmlKind::Insert | DmlKind::Update => "INSERTED",
            DmlKind::Delete => "DELETED",
        };
        write_output(w, returning, pseudo_table)
    }

    fn render_trailing(
        &self,
        _w: &mut SqlWriter<'_>,
        _returning: &Returning,
        _kind: DmlKind,
    ) -> Result<()> {
        Ok(())
    }
}

fn write_output(w: &mut SqlWriter<'_>, returning: &Returning, pseudo_table: &str) -> Result<()> {
    match returning {
        Returning::None => Ok(()),
        Returning::All => {
            w.push(" OUTPUT ");
            w.push(pseudo_table);
            w.push(".*");
            Ok(())
        }
        Returning::Columns(columns) => {
            w.push(" OUTPUT ");
            w.comma_separated(columns, |w, column| {
                w.push(pseudo_table);
                w.push_char('.');
                w.ident(column);
                Ok(())
            })
        }
    }
}

/// Upsert as a `MERGE` from the proposed rows into the table:
///
/// ```sql
/// MERGE INTO [t] AS [target]
/// USING (VALUES (@p1, @p2)) AS [source] ([id], [name])
/// ON [target].[id] = [source].[id]
/// WHEN MATCHED THEN UPDATE SET [name] = [source].[name]
/// WHEN NOT MATCHED THEN INSERT ([id], [name]) VALUES ([source].[id], [source].[name]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeUpsert;

impl UpsertStrategy for MergeUpsert {
    fn compile(
        &self,
        w: &mut SqlWriter<'_>,
        insert: &InsertQuery,
        conflict: &OnConflict,
    ) -> Result<()> {
        let dialect = w.dialect().name();
        let keys = match &conflict.target {
            Some(ConflictTarget::Columns(columns)) if !columns.is_empty() => columns,
            Some(ConflictTarget::Constraint(_)) => {
                return Err(QuarryError::NamedConstraintUnsupported { dialect });
            }
            _ => return Err(QuarryError::MissingConflictTarget { dialect }),
        };
        quarry_core::compiler::validate_insert(insert)?;
        if let Some(key) = keys.iter().find(|key| !insert.columns.contains(key)) {
            return Err(QuarryError::InvalidStatement(format!(
                "MERGE key `{key}` is not among the inserted columns"
            )));
        }

        w.push("MERGE INTO ");
        w.table_name(&insert.into);
        w.push(" AS ");
        w.ident(TARGET);
        w.push(" USING ");
        match &insert.source {
            InsertSource::Values(rows) => {
                w.push("(VALUES ");
                w.values_rows(rows)?;
                w.push_char(')');
            }
            InsertSource::Select(query) => {
                w.push_char('(');
                w.select(query)?;
                w.push_char(')');
            }
            InsertSource::DefaultValues => {
                return Err(QuarryError::unsupported(dialect, "MERGE from DEFAULT VALUES"));
            }
        }
        w.push(" AS ");
        w.ident(SOURCE);
        w.push_char(' ');
        w.ident_list(&insert.columns);

        w.push(" ON ");
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                w.push(" AND ");
            }
            w.qualified(Some(TARGET), key);
            w.push(" = ");
            w.qualified(Some(SOURCE), key);
        }

        if let ConflictAction::DoUpdate { set, where_ } = &conflict.action {
            w.push(" WHEN MATCHED");
            w.set_excluded_scope(true);
            if let Some(filter) = where_ {
                w.push(" AND ");
                w.expression(filter)?;
            }
            w.push(" THEN UPDATE SET ");
            w.assignments(set)?;
            w.set_excluded_scope(false);
        }

        w.push(" WHEN NOT MATCHED THEN INSERT ");
        w.ident_list(&insert.columns);
        w.push(" VALUES (");
        for (i, column) in insert.columns.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.qualified(Some(SOURCE), column);
        }
        w.push_char(')');

        write_output(w, &insert.returning, "INSERTED")?;
        w.push_char(';');
        Ok(())
    }

    fn render_excluded(&self, w: &mut SqlWriter<'_>, column: &str) -> Result<()> {
        w.qualified(Some(SOURCE), column);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::ast::*;
    use quarry_core::expr::{col, excluded, lit, ne};
    use quarry_core::value::Value;
    use quarry_core::QuarryError;

    fn upsert(target: Option<ConflictTarget>, action: ConflictAction) -> InsertQuery {
        InsertQuery {
            into: TableRef::new("todos"),
            columns: vec!["id".into(), "name".into()],
            source: InsertSource::Values(vec![vec![lit(1), lit("milk")]]),
            on_conflict: Some(OnConflict { target, action }),
            returning: Returning::All,
        }
    }

    #[test]
    fn merge_with_conditional_update_and_output() {
        let insert = upsert(
            Some(ConflictTarget::Columns(vec!["id".into()])),
            ConflictAction::DoUpdate {
                set: vec![Assignment::new("name", excluded("name"))],
                where_: Some(ne(col("target.name"), excluded("name")).unwrap()),
            },
        );
        let out = crate::compiler().compile_insert(&insert).unwrap();
        assert_eq!(
            out.sql,
            "MERGE INTO [todos] AS [target] USING (VALUES (@p1, @p2)) AS [source] ([id], [name]) \
             ON [target].[id] = [source].[id] \
             WHEN MATCHED AND [target].[name] <> [source].[name] THEN UPDATE SET [name] = [source].[name] \
             WHEN NOT MATCHED THEN INSERT ([id], [name]) VALUES ([source].[id], [source].[name]) \
             OUTPUT INSERTED.*;"
        );
        assert_eq!(out.params, vec![Value::from(1), Value::from("milk")]);
    }

    #[test]
    fn do_nothing_only_inserts_missing_rows() {
        let insert = upsert(
            Some(ConflictTarget::Columns(vec!["id".into()])),
            ConflictAction::DoNothing,
        );
        let sql = crate::compiler().compile_insert(&insert).unwrap().sql;
        assert!(!sql.contains("WHEN MATCHED"));
        assert!(sql.contains("ON [target].[id] = [source].[id] WHEN NOT MATCHED THEN INSERT"));
    }

    #[test]
    fn merge_needs_column_keys() {
        let compiler = crate::compiler();
        assert_eq!(
            compiler
                .compile_insert(&upsert(None, ConflictAction::DoNothing))
                .unwrap_err(),
            QuarryError::MissingConflictTarget { dialect: "mssql" }
        );
        assert_eq!(
            compiler
                .compile_insert(&upsert(
                    Some(ConflictTarget::Constraint("pk".into())),
                    ConflictAction::DoNothing
                ))
                .unwrap_err(),
            QuarryError::NamedConstraintUnsupported { dialect: "mssql" }
        );
        assert!(compiler
            .compile_insert(&upsert(
                Some(ConflictTarget::Columns(vec!["email".into()])),
                ConflictAction::DoNothing
            ))
            .is_err());
    }
}

use quarry_core::compiler::Dialect;
use quarry_core::ddl::{
    AlterColumnType, CompiledDdl, CreateIndex, DdlStrategy, DropColumn, StandardDdl,
};
use quarry_core::error::{QuarryError, Result};

/// SQLite DDL.
///
/// Partial indexes are rejected. Column drops and type changes are answered
/// with a rebuild advisory: the drop is still emitted as `DROP COLUMN`,
/// while a type change has no statement form and comes back empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDdl;

impl DdlStrategy for SqliteDdl {
    fn create_index(&self, dialect: &Dialect, index: &CreateIndex) -> Result<CompiledDdl> {
        if index.where_.is_some() {
            return Err(QuarryError::unsupported(dialect.name(), "partial index"));
        }
        StandardDdl.create_index(dialect, index)
    }

    fn drop_column(&self, dialect: &Dialect, drop: &DropColumn) -> Result<CompiledDdl> {
        let compiled = StandardDdl.drop_column(dialect, drop)?;
        Ok(compiled.with_warning(format!(
            "dropping `{}` from `{}` fails on SQLite when the column is indexed, \
             constrained or referenced; rebuild the table in that case",
            drop.column, drop.table.name
        )))
    }

    fn alter_column_type(&self, _dialect: &Dialect, alter: &AlterColumnType) -> Result<CompiledDdl> {
        Ok(CompiledDdl::default().with_warning(format!(
            "SQLite cannot change the type of `{}` on `{}` in place; \
             rebuild the table with the column declared as {}",
            alter.column, alter.table.name, alter.sql_type
        )))
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::ast::TableRef;
    use quarry_core::ddl::{AddColumn, AlterColumnType, CreateIndex, DdlStatement, DropColumn};
    use quarry_core::expr::{col, eq};
    use quarry_core::schema::ColumnDef;
    use quarry_core::QuarryError;

    #[test]
    fn partial_index_must_throw() {
        let err = crate::compiler()
            .compile_ddl(&DdlStatement::CreateIndex(CreateIndex {
                name: "open_todos".into(),
                table: TableRef::new("todos"),
                columns: vec!["name".into()],
                unique: false,
                where_: Some(eq(col("done"), 0).unwrap()),
            }))
            .unwrap_err();
        assert!(matches!(err, QuarryError::Unsupported { dialect: "sqlite", .. }));
    }

    #[test]
    fn plain_index_and_add_column_are_native() {
        let compiler = crate::compiler();
        let index = compiler
            .compile_ddl(&DdlStatement::CreateIndex(CreateIndex {
                name: "todos_name".into(),
                table: TableRef::new("todos"),
                columns: vec!["name".into()],
                unique: true,
                where_: None,
            }))
            .unwrap();
        assert_eq!(
            index.statements,
            vec!["CREATE UNIQUE INDEX \"todos_name\" ON \"todos\" (\"name\")".to_string()]
        );
        let add = compiler
            .compile_ddl(&DdlStatement::AddColumn(AddColumn {
                table: TableRef::new("todos"),
                column: ColumnDef::new("note", "text").nullable(),
            }))
            .unwrap();
        assert_eq!(add.statements[0], "ALTER TABLE \"todos\" ADD COLUMN \"note\" text");
        assert!(add.warnings.is_empty());
    }

    #[test]
    fn drop_and_alter_warn_instead_of_failing() {
        let compiler = crate::compiler();
        let drop = compiler
            .compile_ddl(&DdlStatement::DropColumn(DropColumn {
                table: TableRef::new("todos"),
                column: "done".into(),
            }))
            .unwrap();
        assert_eq!(drop.statements, vec!["ALTER TABLE \"todos\" DROP COLUMN \"done\"".to_string()]);
        assert_eq!(drop.warnings.len(), 1);
        assert!(drop.warnings[0].contains("rebuild"));

        let alter = compiler
            .compile_ddl(&DdlStatement::AlterColumnType(AlterColumnType {
                table: TableRef::new("todos"),
                column: "done".into(),
                sql_type: "integer".into(),
            }))
            .unwrap();
        assert!(alter.statements.is_empty());
        assert!(alter.warnings[0].contains("rebuild the table"));
    }
}

use quarry_core::compiler::Dialect;
use quarry_core::ddl::{
    AlterColumnType, CompiledDdl, CreateIndex, DdlStrategy, StandardDdl, render_ddl,
};
use quarry_core::error::{QuarryError, Result};

/// MySQL DDL: no partial indexes, and type changes go through `MODIFY COLUMN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDdl;

impl DdlStrategy for MySqlDdl {
    fn create_index(&self, dialect: &Dialect, index: &CreateIndex) -> Result<CompiledDdl> {
        if index.where_.is_some() {
            return Err(QuarryError::unsupported(dialect.name(), "partial index"));
        }
        StandardDdl.create_index(dialect, index)
    }

    fn alter_column_type(&self, dialect: &Dialect, alter: &AlterColumnType) -> Result<CompiledDdl> {
        let sql = render_ddl(dialect, |w| {
            w.push("ALTER TABLE ");
            w.table_name(&alter.table);
            w.push(" MODIFY COLUMN ");
            w.ident(&alter.column);
            w.push_char(' ');
            w.push(&alter.sql_type);
            Ok(())
        })?;
        Ok(CompiledDdl::statement(sql))
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::ast::TableRef;
    use quarry_core::ddl::{AlterColumnType, CreateIndex, DdlStatement, DropColumn};
    use quarry_core::expr::{col, eq};

    #[test]
    fn modify_column_and_drop_column() {
        let compiler = crate::compiler();
        let alter = compiler
            .compile_ddl(&DdlStatement::AlterColumnType(AlterColumnType {
                table: TableRef::new("todos"),
                column: "name".into(),
                sql_type: "varchar(255)".into(),
            }))
            .unwrap();
        assert_eq!(
            alter.statements,
            vec!["ALTER TABLE `todos` MODIFY COLUMN `name` varchar(255)".to_string()]
        );
        let drop = compiler
            .compile_ddl(&DdlStatement::DropColumn(DropColumn {
                table: TableRef::new("todos"),
                column: "done".into(),
            }))
            .unwrap();
        assert_eq!(drop.statements[0], "ALTER TABLE `todos` DROP COLUMN `done`");
        assert!(drop.warnings.is_empty());
    }

    #[test]
    fn partial_indexes_are_rejected() {
        let err = crate::compiler()
            .compile_ddl(&DdlStatement::CreateIndex(CreateIndex {
                name: "open".into(),
                table: TableRef::new("todos"),
                columns: vec!["name".into()],
                unique: false,
                where_: Some(eq(col("done"), 0).unwrap()),
            }))
            .unwrap_err();
        assert_eq!(err.to_string(), "partial index is not supported by mysql");
    }
}

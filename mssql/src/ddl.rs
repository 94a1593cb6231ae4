use quarry_core::compiler::Dialect;
use quarry_core::ddl::{
    AddColumn, AlterColumnType, CompiledDdl, DdlStrategy, render_ddl, write_column_def,
};
use quarry_core::error::Result;

/// T-SQL column changes: `ADD` without `COLUMN`, `ALTER COLUMN c type`.
/// Filtered indexes use the standard `WHERE` form.
#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlDdl;

impl DdlStrategy for MssqlDdl {
    fn add_column(&self, dialect: &Dialect, add: &AddColumn) -> Result<CompiledDdl> {
        let sql = render_ddl(dialect, |w| {
            w.push("ALTER TABLE ");
            w.table_name(&add.table);
            w.push(" ADD ");
            write_column_def(w, &add.column);
            Ok(())
        })?;
        Ok(CompiledDdl::statement(sql))
    }

    fn alter_column_type(&self, dialect: &Dialect, alter: &AlterColumnType) -> Result<CompiledDdl> {
        let sql = render_ddl(dialect, |w| {
            w.push("ALTER TABLE ");
            w.table_name(&alter.table);
            w.push(" ALTER COLUMN ");
            w.ident(&alter.column);
            w.push_char(' ');
            w.push(&alter.sql_type);
            Ok(())
        })?;
        Ok(CompiledDdl::statement(sql))
    }
}

//! Schema-change statements covered by the dialect capability matrix:
//! indexes (optionally partial) and single-column table alterations.
//!
//! DDL cannot bind parameters, so literals inside a partial-index predicate
//! are written inline. Gaps that are still expressible, only less directly,
//! come back as `warnings` next to the statements instead of as errors.

use core::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::ast::{Expression, TableRef};
use crate::compiler::{Dialect, SqlWriter};
use crate::error::{QuarryError, Result};
use crate::schema::ColumnDef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndex {
    pub name: String,
    pub table: TableRef,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    /// Partial/filtered index predicate
    #[serde(default, rename = "where")]
    pub where_: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddColumn {
    pub table: TableRef,
    pub column: ColumnDef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropColumn {
    pub table: TableRef,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterColumnType {
    pub table: TableRef,
    pub column: String,
    pub sql_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DdlStatement {
    CreateIndex(CreateIndex),
    AddColumn(AddColumn),
    DropColumn(DropColumn),
    AlterColumnType(AlterColumnType),
}

/// Compiled DDL: zero or more statements plus advisory warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledDdl {
    pub statements: Vec<String>,
    pub warnings: Vec<String>,
}

impl CompiledDdl {
    pub fn statement(sql: String) -> Self {
        Self {
            statements: vec![sql],
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Renders one DDL statement through an inline-literal writer.
pub fn render_ddl(
    dialect: &Dialect,
    render: impl FnOnce(&mut SqlWriter<'_>) -> Result<()>,
) -> Result<String> {
    let mut w = SqlWriter::inline(dialect);
    render(&mut w)?;
    Ok(w.finish().sql)
}

/// `"name" type [NOT NULL] [DEFAULT expr]`.
pub fn write_column_def(w: &mut SqlWriter<'_>, column: &ColumnDef) {
    w.ident(&column.name);
    w.push_char(' ');
    w.push(&column.sql_type);
    if !column.nullable {
        w.push(" NOT NULL");
    }
    if let Some(default) = &column.default {
        w.push(" DEFAULT ");
        w.push(default);
    }
}

/// Per-dialect DDL rendering. The defaults are the native forms
/// (`ALTER TABLE ... ADD COLUMN`, `ALTER COLUMN ... TYPE`, partial indexes).
pub trait DdlStrategy: Debug + Send + Sync {
    fn compile(&self, dialect: &Dialect, statement: &DdlStatement) -> Result<CompiledDdl> {
        match statement {
            DdlStatement::CreateIndex(index) => self.create_index(dialect, index),
            DdlStatement::AddColumn(add) => self.add_column(dialect, add),
            DdlStatement::DropColumn(drop) => self.drop_column(dialect, drop),
            DdlStatement::AlterColumnType(alter) => self.alter_column_type(dialect, alter),
        }
    }

    fn create_index(&self, dialect: &Dialect, index: &CreateIndex) -> Result<CompiledDdl> {
        if index.columns.is_empty() {
            return Err(QuarryError::InvalidStatement(format!(
                "index `{}` has no columns",
                index.name
            )));
        }
        let sql = render_ddl(dialect, |w| {
            w.push(if index.unique {
                "CREATE UNIQUE INDEX "
            } else {
                "CREATE INDEX "
            });
            w.ident(&index.name);
            w.push(" ON ");
            w.table_name(&index.table);
            w.push_char(' ');
            w.ident_list(&index.columns);
            if let Some(filter) = &index.where_ {
                w.push(" WHERE ");
                w.expression(filter)?;
            }
            Ok(())
        })?;
        Ok(CompiledDdl::statement(sql))
    }

    fn add_column(&self, dialect: &Dialect, add: &AddColumn) -> Result<CompiledDdl> {
        let sql = render_ddl(dialect, |w| {
            w.push("ALTER TABLE ");
            w.table_name(&add.table);
            w.push(" ADD COLUMN ");
            write_column_def(w, &add.column);
            Ok(())
        })?;
        Ok(CompiledDdl::statement(sql))
    }

    fn drop_column(&self, dialect: &Dialect, drop: &DropColumn) -> Result<CompiledDdl> {
        let sql = render_ddl(dialect, |w| {
            w.push("ALTER TABLE ");
            w.table_name(&drop.table);
            w.push(" DROP COLUMN ");
            w.ident(&drop.column);
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
            w.push(" TYPE ");
            w.push(&alter.sql_type);
            Ok(())
        })?;
        Ok(CompiledDdl::statement(sql))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDdl;

impl StandardDdl {
    pub const fn new() -> Self {
        Self
    }
}

impl DdlStrategy for StandardDdl {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::SqlCompiler;
    use crate::expr::{col, eq};

    #[test]
    fn partial_index_inlines_its_predicate() {
        let compiler = SqlCompiler::new(Dialect::ansi("ansi"));
        let out = compiler
            .compile_ddl(&DdlStatement::CreateIndex(CreateIndex {
                name: "active_email".into(),
                table: TableRef::new("users"),
                columns: vec!["email".into()],
                unique: true,
                where_: Some(eq(col("active"), true).unwrap()),
            }))
            .unwrap();
        assert_eq!(
            out.statements,
            vec![
                "CREATE UNIQUE INDEX \"active_email\" ON \"users\" (\"email\") WHERE \"active\" = TRUE"
                    .to_string()
            ]
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn add_column_renders_constraints() {
        let compiler = SqlCompiler::new(Dialect::ansi("ansi"));
        let out = compiler
            .compile_ddl(&DdlStatement::AddColumn(AddColumn {
                table: TableRef::new("users"),
                column: ColumnDef::new("age", "integer").default_sql("0"),
            }))
            .unwrap();
        assert_eq!(
            out.statements[0],
            "ALTER TABLE \"users\" ADD COLUMN \"age\" integer NOT NULL DEFAULT 0"
        );
    }
}

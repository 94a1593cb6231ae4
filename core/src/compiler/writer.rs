//! The rendering surface shared by the pipeline and every strategy.

use serde::{Deserialize, Serialize};

use super::context::CompilerContext;
use super::dialect::Dialect;
use crate::ast::{TableRef, TableSource};
use crate::error::{QuarryError, Result};
use crate::value::Value;

/// Output of one compile call.
///
/// `params.len()` always equals the number of placeholders in `sql`, and the
/// two are in the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// SQL writer bound to one dialect and one [`CompilerContext`].
///
/// Strategies receive this and call back into it for nested operands,
/// expressions and sub-selects, so parameters are always bound in the order
/// their placeholders are written.
#[derive(Debug)]
pub struct SqlWriter<'d> {
    dialect: &'d Dialect,
    ctx: CompilerContext,
    excluded_scope: bool,
}

impl<'d> SqlWriter<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self {
            dialect,
            ctx: CompilerContext::new(dialect.placeholders()),
            excluded_scope: false,
        }
    }

    /// A writer that inlines literals; used for DDL where nothing can be bound.
    pub fn inline(dialect: &'d Dialect) -> Self {
        Self {
            dialect,
            ctx: CompilerContext::inline(dialect.placeholders()),
            excluded_scope: false,
        }
    }

    #[inline]
    pub fn dialect(&self) -> &'d Dialect {
        self.dialect
    }

    pub fn context(&self) -> &CompilerContext {
        &self.ctx
    }

    // ==================== raw output ====================

    #[inline]
    pub fn push(&mut self, text: &str) {
        self.ctx.push_str(text);
    }

    #[inline]
    pub fn push_char(&mut self, c: char) {
        self.ctx.push_char(c);
    }

    pub fn push_number(&mut self, value: u64) {
        self.ctx.push_number(value);
    }

    /// A quoted identifier; `*` is written bare.
    pub fn ident(&mut self, name: &str) {
        if name == "*" {
            self.ctx.push_char('*');
            return;
        }
        let mut buf = String::with_capacity(name.len() + 2);
        self.dialect.quote().write(name, &mut buf);
        self.ctx.push_str(&buf);
    }

    /// `"qualifier"."name"` or just `"name"`.
    pub fn qualified(&mut self, qualifier: Option<&str>, name: &str) {
        if let Some(qualifier) = qualifier {
            self.ident(qualifier);
            self.push_char('.');
        }
        self.ident(name);
    }

    /// A single-quoted string literal written inline, quotes doubled (and
    /// backslashes too where the dialect treats them as escapes).
    pub fn string_literal(&mut self, text: &str) {
        let backslashes = self.dialect().capabilities().backslash_escapes;
        self.push_char('\'');
        for c in text.chars() {
            if c == '\'' || (backslashes && c == '\\') {
                self.push_char(c);
            }
            self.push_char(c);
        }
        self.push_char('\'');
    }

    /// Binds a literal, or writes it inline in DDL mode.
    pub fn literal(&mut self, value: &Value) -> Result<()> {
        if !self.ctx.inlines_literals() {
            self.ctx.push_param(value.clone());
            return Ok(());
        }
        match value {
            Value::Null => self.push("NULL"),
            Value::Bool(b) => {
                let text = match (self.dialect.capabilities().boolean_literals, b) {
                    (true, true) => "TRUE",
                    (true, false) => "FALSE",
                    (false, true) => "1",
                    (false, false) => "0",
                };
                self.push(text);
            }
            Value::Integer(i) => self.push(&i.to_string()),
            Value::Real(r) => self.push(&r.to_string()),
            Value::Text(s) => self.string_literal(s),
            Value::Json(j) => self.string_literal(&j.to_string()),
            Value::Blob(_) => {
                return Err(QuarryError::unsupported(
                    self.dialect.name(),
                    "inline binary literals",
                ));
            }
        }
        Ok(())
    }

    /// Writes `items` separated by `, `.
    pub fn comma_separated<T>(
        &mut self,
        items: &[T],
        mut render: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            render(self, item)?;
        }
        Ok(())
    }

    /// A parenthesized, comma-separated identifier list.
    pub fn ident_list(&mut self, names: &[String]) {
        self.push_char('(');
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.ident(name);
        }
        self.push_char(')');
    }

    // ==================== sources ====================

    /// `"schema"."name"`, without alias.
    pub fn table_name(&mut self, table: &TableRef) {
        self.qualified(table.schema.as_deref(), &table.name);
    }

    /// `"schema"."name" AS "alias"`.
    pub fn table(&mut self, table: &TableRef) {
        self.table_name(table);
        if let Some(alias) = &table.alias {
            self.push(" AS ");
            self.ident(alias);
        }
    }

    pub fn source(&mut self, source: &TableSource) -> Result<()> {
        match source {
            TableSource::Table(table) => {
                self.table(table);
                Ok(())
            }
            TableSource::Subquery { query, alias } => {
                self.push_char('(');
                self.select(query)?;
                self.push(") AS ");
                self.ident(alias);
                Ok(())
            }
            TableSource::Function(func) => {
                let dialect = self.dialect;
                dialect.table_functions.render(self, func)
            }
        }
    }

    // ==================== upsert scope ====================

    /// Opens or closes the region where `Excluded` operands are legal.
    pub fn set_excluded_scope(&mut self, open: bool) {
        self.excluded_scope = open;
    }

    pub(crate) fn in_excluded_scope(&self) -> bool {
        self.excluded_scope
    }

    pub fn finish(self) -> CompiledQuery {
        let (sql, params) = self.ctx.finish();
        CompiledQuery { sql, params }
    }
}

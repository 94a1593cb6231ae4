//! INSERT, UPDATE, DELETE and procedure call assembly.

use super::dialect::CallStyle;
use super::strategy::DmlKind;
use super::writer::SqlWriter;
use crate::ast::{Assignment, CallQuery, DeleteQuery, InsertQuery, InsertSource, UpdateQuery};
use crate::error::{QuarryError, Result};

impl SqlWriter<'_> {
    pub fn insert(&mut self, insert: &InsertQuery) -> Result<()> {
        let dialect = self.dialect();
        if let Some(conflict) = &insert.on_conflict {
            return dialect.upsert.compile(self, insert, conflict);
        }
        self.insert_head(insert)?;
        dialect
            .returning
            .render_trailing(self, &insert.returning, DmlKind::Insert)
    }

    /// `INSERT INTO t (cols) [OUTPUT ...] VALUES ... | SELECT ... | DEFAULT VALUES`.
    pub fn insert_head(&mut self, insert: &InsertQuery) -> Result<()> {
        let dialect = self.dialect();
        validate_insert(insert)?;
        self.push("INSERT INTO ");
        self.table_name(&insert.into);

        match &insert.source {
            InsertSource::DefaultValues if !dialect.capabilities().default_values => {
                self.push(" ()");
                dialect
                    .returning
                    .render_inline(self, &insert.returning, DmlKind::Insert)?;
                self.push(" VALUES ()");
            }
            InsertSource::DefaultValues => {
                dialect
                    .returning
                    .render_inline(self, &insert.returning, DmlKind::Insert)?;
                self.push(" DEFAULT VALUES");
            }
            InsertSource::Values(rows) => {
                self.push_char(' ');
                self.ident_list(&insert.columns);
                dialect
                    .returning
                    .render_inline(self, &insert.returning, DmlKind::Insert)?;
                self.push(" VALUES ");
                self.values_rows(rows)?;
            }
            InsertSource::Select(query) => {
                self.push_char(' ');
                self.ident_list(&insert.columns);
                dialect
                    .returning
                    .render_inline(self, &insert.returning, DmlKind::Insert)?;
                self.push_char(' ');
                self.select(query)?;
            }
        }
        Ok(())
    }

    /// `(a, b), (c, d)`.
    pub fn values_rows(&mut self, rows: &[Vec<crate::ast::Operand>]) -> Result<()> {
        self.comma_separated(rows, |w, row| {
            w.push_char('(');
            w.comma_separated(row, |w, value| w.operand(value))?;
            w.push_char(')');
            Ok(())
        })
    }

    /// `"a" = ?, "b" = ?`.
    pub fn assignments(&mut self, set: &[Assignment]) -> Result<()> {
        if set.is_empty() {
            return Err(QuarryError::InvalidStatement(
                "SET requires at least one assignment".into(),
            ));
        }
        self.comma_separated(set, |w, assignment| {
            w.ident(&assignment.column);
            w.push(" = ");
            w.operand(&assignment.value)
        })
    }

    pub fn update(&mut self, update: &UpdateQuery) -> Result<()> {
        let dialect = self.dialect();
        self.push("UPDATE ");
        self.table(&update.table);
        self.push(" SET ");
        self.assignments(&update.set)?;
        dialect
            .returning
            .render_inline(self, &update.returning, DmlKind::Update)?;
        if let Some(filter) = &update.where_ {
            self.push(" WHERE ");
            self.expression(filter)?;
        }
        dialect
            .returning
            .render_trailing(self, &update.returning, DmlKind::Update)
    }

    pub fn delete(&mut self, delete: &DeleteQuery) -> Result<()> {
        let dialect = self.dialect();
        self.push("DELETE FROM ");
        self.table(&delete.from);
        dialect
            .returning
            .render_inline(self, &delete.returning, DmlKind::Delete)?;
        if let Some(filter) = &delete.where_ {
            self.push(" WHERE ");
            self.expression(filter)?;
        }
        dialect
            .returning
            .render_trailing(self, &delete.returning, DmlKind::Delete)
    }

    /// `CALL p(args)` or `EXEC p args`, arguments bound like any operand.
    pub fn call(&mut self, call: &CallQuery) -> Result<()> {
        let dialect = self.dialect();
        match dialect.calls() {
            CallStyle::Call => {
                self.push("CALL ");
                self.table_name(&call.procedure);
                self.push_char('(');
                self.comma_separated(&call.args, |w, arg| w.operand(arg))?;
                self.push_char(')');
            }
            CallStyle::Exec => {
                self.push("EXEC ");
                self.table_name(&call.procedure);
                if !call.args.is_empty() {
                    self.push_char(' ');
                    self.comma_separated(&call.args, |w, arg| w.operand(arg))?;
                }
            }
            CallStyle::Unsupported => {
                return Err(QuarryError::unsupported(dialect.name(), "CALL"));
            }
        }
        Ok(())
    }
}

/// Shape checks that hold for every dialect.
pub fn validate_insert(insert: &InsertQuery) -> Result<()> {
    match &insert.source {
        InsertSource::DefaultValues => {
            if !insert.columns.is_empty() {
                return Err(QuarryError::InvalidStatement(
                    "DEFAULT VALUES cannot name columns".into(),
                ));
            }
        }
        InsertSource::Values(rows) => {
            if insert.columns.is_empty() {
                return Err(QuarryError::InvalidStatement(
                    "INSERT ... VALUES requires destination columns".into(),
                ));
            }
            if rows.is_empty() {
                return Err(QuarryError::InvalidStatement(
                    "INSERT ... VALUES requires at least one row".into(),
                ));
            }
            if let Some(row) = rows.iter().find(|row| row.len() != insert.columns.len()) {
                return Err(QuarryError::InvalidStatement(format!(
                    "VALUES row has {} values for {} columns",
                    row.len(),
                    insert.columns.len()
                )));
            }
        }
        InsertSource::Select(_) => {
            if insert.columns.is_empty() {
                return Err(QuarryError::InvalidStatement(
                    "INSERT...SELECT requires destination columns".into(),
                ));
            }
        }
    }
    Ok(())
}

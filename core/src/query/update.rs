use std::sync::Arc;

use crate::ast::{Assignment, Expression, Returning, UpdateQuery};
use crate::compiler::{CompiledQuery, SqlCompiler};
use crate::error::{QuarryError, Result};
use crate::expr::{conjoin, IntoOperand};
use crate::schema::TableDef;

use super::{returning_columns, table_ref};

/// UPDATE of one table.
#[derive(Debug, Clone)]
pub struct UpdateState {
    table: Arc<TableDef>,
    set: Vec<Assignment>,
    where_: Option<Expression>,
    returning: Returning,
}

impl UpdateState {
    pub fn new(table: Arc<TableDef>) -> Self {
        Self {
            table,
            set: Vec::new(),
            where_: None,
            returning: Returning::None,
        }
    }

    /// Assigns `value` to `column`, replacing an earlier assignment to it.
    pub fn set(&self, column: &str, value: impl IntoOperand) -> Result<Self> {
        self.table.require_column(column)?;
        let value = value.into_operand(column)?;
        let mut next = self.clone();
        match next.set.iter_mut().find(|a| a.column == column) {
            Some(existing) => existing.value = value,
            None => next.set.push(Assignment::new(column, value)),
        }
        Ok(next)
    }

    /// ANDs `condition` onto the WHERE clause.
    pub fn r#where(&self, condition: Expression) -> Self {
        let mut next = self.clone();
        next.where_ = Some(conjoin(next.where_.take(), condition));
        next
    }

    pub fn returning_all(&self) -> Self {
        let mut next = self.clone();
        next.returning = Returning::All;
        next
    }

    pub fn returning<I, S>(&self, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.returning = returning_columns(&self.table, columns)?;
        Ok(next)
    }

    pub fn build(&self) -> Result<UpdateQuery> {
        if self.set.is_empty() {
            return Err(QuarryError::InvalidStatement(format!(
                "UPDATE of `{}` requires at least one assignment",
                self.table.name
            )));
        }
        Ok(UpdateQuery {
            table: table_ref(&self.table),
            set: self.set.clone(),
            where_: self.where_.clone(),
            returning: self.returning.clone(),
        })
    }

    pub fn compile(&self, compiler: &SqlCompiler) -> Result<CompiledQuery> {
        compiler.compile_update(&self.build()?)
    }
}

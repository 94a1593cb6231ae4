use std::sync::Arc;

use crate::ast::{DeleteQuery, Expression, Returning};
use crate::compiler::{CompiledQuery, SqlCompiler};
use crate::error::Result;
use crate::expr::conjoin;
use crate::schema::TableDef;

use super::{returning_columns, table_ref};

/// DELETE from one table. Without a WHERE clause every row goes.
#[derive(Debug, Clone)]
pub struct DeleteState {
    table: Arc<TableDef>,
    where_: Option<Expression>,
    returning: Returning,
}

impl DeleteState {
    pub fn new(table: Arc<TableDef>) -> Self {
        Self {
            table,
            where_: None,
            returning: Returning::None,
        }
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

    pub fn build(&self) -> DeleteQuery {
        DeleteQuery {
            from: table_ref(&self.table),
            where_: self.where_.clone(),
            returning: self.returning.clone(),
        }
    }

    pub fn compile(&self, compiler: &SqlCompiler) -> Result<CompiledQuery> {
        compiler.compile_delete(&self.build())
    }
}

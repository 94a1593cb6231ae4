use std::sync::Arc;

use crate::ast::{
    Assignment, ConflictAction, ConflictTarget, Expression, InsertQuery, InsertSource, OnConflict,
    Operand, Returning, SelectQuery,
};
use crate::compiler::{validate_insert, CompiledQuery, SqlCompiler};
use crate::error::{QuarryError, Result};
use crate::expr::IntoOperand;
use crate::schema::TableDef;

use super::{returning_columns, table_ref};

/// INSERT into one table.
///
/// The source is fixed by the first call that sets one: VALUES rows, a
/// SELECT, or DEFAULT VALUES. Mixing them is rejected when it is attempted,
/// not at compile time.
#[derive(Debug, Clone)]
pub struct InsertState {
    table: Arc<TableDef>,
    columns: Vec<String>,
    source: Option<InsertSource>,
    on_conflict: Option<OnConflict>,
    returning: Returning,
}

impl InsertState {
    pub fn new(table: Arc<TableDef>) -> Self {
        Self {
            table,
            columns: Vec::new(),
            source: None,
            on_conflict: None,
            returning: Returning::None,
        }
    }

    /// Appends one VALUES row given as `(column, value)` pairs.
    ///
    /// The first row fixes the column list; later rows must name the same
    /// columns, in any order.
    pub fn values<I, K, V>(&self, row: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoOperand,
    {
        let mut cells: Vec<(String, Operand)> = Vec::new();
        for (column, value) in row {
            let column = column.into();
            self.table.require_column(&column)?;
            if cells.iter().any(|(existing, _)| *existing == column) {
                return Err(QuarryError::invalid_operand(
                    "values",
                    format!("column `{column}` appears twice in one row"),
                ));
            }
            let value = value.into_operand(&column)?;
            cells.push((column, value));
        }
        if cells.is_empty() {
            return Err(QuarryError::invalid_operand(
                "values",
                "a row needs at least one column; use default_values() instead",
            ));
        }

        let mut next = self.clone();
        match &mut next.source {
            None => {
                next.columns = cells.iter().map(|(column, _)| column.clone()).collect();
                let row = cells.into_iter().map(|(_, value)| value).collect();
                next.source = Some(InsertSource::Values(vec![row]));
            }
            Some(InsertSource::Values(rows)) => {
                if cells.len() != next.columns.len() {
                    return Err(QuarryError::invalid_operand(
                        "values",
                        format!(
                            "row has {} columns, expected {} ({})",
                            cells.len(),
                            next.columns.len(),
                            next.columns.join(", ")
                        ),
                    ));
                }
                let mut row = Vec::with_capacity(cells.len());
                for column in &next.columns {
                    let position = cells
                        .iter()
                        .position(|(name, _)| name == column)
                        .ok_or_else(|| {
                            QuarryError::invalid_operand(
                                "values",
                                format!("row is missing column `{column}`"),
                            )
                        })?;
                    row.push(cells.swap_remove(position).1);
                }
                rows.push(row);
            }
            Some(_) => return Err(mixed_sources()),
        }
        Ok(next)
    }

    /// `INSERT INTO t (columns) SELECT ...`.
    pub fn from_select<I, S>(&self, columns: I, query: SelectQuery) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.source.is_some() {
            return Err(mixed_sources());
        }
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for column in &columns {
            self.table.require_column(column)?;
        }
        let mut next = self.clone();
        next.columns = columns;
        next.source = Some(InsertSource::Select(Box::new(query)));
        Ok(next)
    }

    /// Inserts a single row of column defaults.
    pub fn default_values(&self) -> Result<Self> {
        if self.source.is_some() {
            return Err(mixed_sources());
        }
        let mut next = self.clone();
        next.columns.clear();
        next.source = Some(InsertSource::DefaultValues);
        Ok(next)
    }

    /// Sets the conflict clause after checking its columns against the table.
    pub fn on_conflict(&self, on_conflict: OnConflict) -> Result<Self> {
        if let Some(ConflictTarget::Columns(columns)) = &on_conflict.target {
            for column in columns {
                self.table.require_column(column)?;
            }
        }
        if let ConflictAction::DoUpdate { set, .. } = &on_conflict.action {
            if set.is_empty() {
                return Err(QuarryError::invalid_operand(
                    "on_conflict",
                    "DO UPDATE needs at least one assignment",
                ));
            }
            for assignment in set {
                self.table.require_column(&assignment.column)?;
            }
        }
        let mut next = self.clone();
        next.on_conflict = Some(on_conflict);
        Ok(next)
    }

    /// `ON CONFLICT (columns) DO NOTHING`.
    pub fn on_conflict_do_nothing<I, S>(&self, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on_conflict(OnConflict {
            target: conflict_columns(columns),
            action: ConflictAction::DoNothing,
        })
    }

    /// `ON CONFLICT (columns) DO UPDATE SET ...`.
    pub fn on_conflict_do_update<I, S>(&self, columns: I, set: Vec<Assignment>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on_conflict(OnConflict {
            target: conflict_columns(columns),
            action: ConflictAction::DoUpdate { set, where_: None },
        })
    }

    /// `... DO UPDATE SET ... WHERE condition`.
    pub fn on_conflict_do_update_where<I, S>(
        &self,
        columns: I,
        set: Vec<Assignment>,
        condition: Expression,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on_conflict(OnConflict {
            target: conflict_columns(columns),
            action: ConflictAction::DoUpdate {
                set,
                where_: Some(condition),
            },
        })
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

    pub fn build(&self) -> Result<InsertQuery> {
        let source = self.source.clone().ok_or_else(|| {
            QuarryError::InvalidStatement(
                "INSERT requires VALUES rows, a SELECT source, or DEFAULT VALUES".into(),
            )
        })?;
        let query = InsertQuery {
            into: table_ref(&self.table),
            columns: self.columns.clone(),
            source,
            on_conflict: self.on_conflict.clone(),
            returning: self.returning.clone(),
        };
        validate_insert(&query)?;
        Ok(query)
    }

    pub fn compile(&self, compiler: &SqlCompiler) -> Result<CompiledQuery> {
        compiler.compile_insert(&self.build()?)
    }
}

fn conflict_columns<I, S>(columns: I) -> Option<ConflictTarget>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
    if columns.is_empty() {
        None
    } else {
        Some(ConflictTarget::Columns(columns))
    }
}

fn mixed_sources() -> QuarryError {
    QuarryError::InvalidStatement(
        "an INSERT takes exactly one source: VALUES rows, a SELECT, or DEFAULT VALUES".into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Dialect;
    use crate::expr::excluded;
    use crate::query::fixtures::schema;
    use crate::query::QueryBuilder;
    use crate::value::Value;

    fn ansi() -> SqlCompiler {
        SqlCompiler::new(Dialect::ansi("ansi"))
    }

    #[test]
    fn rows_are_aligned_to_the_first_column_list() {
        let qb = QueryBuilder::new(schema());
        let insert = qb
            .insert("todos")
            .unwrap()
            .values([("name", Value::from("a")), ("done", Value::from(0))])
            .unwrap()
            .values([("done", Value::from(1)), ("name", Value::from("b"))])
            .unwrap();
        let out = insert.compile(&ansi()).unwrap();
        assert_eq!(
            out.sql,
            "INSERT INTO \"todos\" (\"name\", \"done\") VALUES (?, ?), (?, ?)"
        );
        assert_eq!(
            out.params,
            vec![
                Value::from("a"),
                Value::from(0),
                Value::from("b"),
                Value::from(1)
            ]
        );
    }

    #[test]
    fn sources_cannot_be_mixed() {
        let qb = QueryBuilder::new(schema());
        let select = qb.select("todos").unwrap().build();
        let with_rows = qb
            .insert("todos")
            .unwrap()
            .values([("name", "a")])
            .unwrap();
        assert!(with_rows.from_select(["name"], select.clone()).is_err());
        assert!(with_rows.default_values().is_err());

        let from_select = qb
            .insert("todos")
            .unwrap()
            .from_select(["name"], select)
            .unwrap();
        assert!(from_select.values([("name", "b")]).is_err());
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let qb = QueryBuilder::new(schema());
        let insert = qb
            .insert("todos")
            .unwrap()
            .values([("name", "a")])
            .unwrap();
        assert!(insert.values([("done", 1)]).is_err());
        assert!(insert.values([("nope", 1)]).is_err());
        assert!(qb.insert("todos").unwrap().build().is_err());
    }

    #[test]
    fn upsert_columns_are_checked() {
        let qb = QueryBuilder::new(schema());
        let insert = qb
            .insert("todos")
            .unwrap()
            .values([("id", Value::from(1)), ("name", Value::from("a"))])
            .unwrap();
        assert!(insert
            .on_conflict_do_update(["id"], vec![Assignment::new("nope", excluded("name"))])
            .is_err());
        let upsert = insert
            .on_conflict_do_update(["id"], vec![Assignment::new("name", excluded("name"))])
            .unwrap();
        assert_eq!(
            upsert.compile(&ansi()).unwrap().sql,
            "INSERT INTO \"todos\" (\"id\", \"name\") VALUES (?, ?) \
             ON CONFLICT (\"id\") DO UPDATE SET \"name\" = EXCLUDED.\"name\""
        );
    }
}

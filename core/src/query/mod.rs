//! Immutable query states.
//!
//! Every builder method borrows the current state and returns a new one, so
//! a partially built state can be kept around as a template and extended in
//! several directions:
//!
//! ```ignore
//! let qb = QueryBuilder::new(schema.into_shared());
//! let open = qb.select("todos")?.r#where(eq(col("done"), 0)?);
//! let first_page = open.order_by([OrderByItem::asc(col("id"))]).limit(20);
//! let count = open.select_expr(count_all(), "total");
//! ```

mod delete;
mod insert;
mod qualify;
mod select;
mod update;

pub use delete::DeleteState;
pub use insert::InsertState;
pub use select::SelectState;
pub use update::UpdateState;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ast::{CallQuery, Returning, TableRef};
use crate::error::{QuarryError, Result};
use crate::expr::IntoOperand;
use crate::relation::DEFAULT_ALIAS_SEPARATOR;
use crate::schema::{Schema, TableDef};

/// Planner knobs carried by every state a [`QueryBuilder`] hands out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Separator between an include's alias prefix and a column name
    #[serde(default = "default_separator")]
    pub alias_separator: String,
}

fn default_separator() -> String {
    DEFAULT_ALIAS_SEPARATOR.to_owned()
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            alias_separator: default_separator(),
        }
    }
}

/// Entry point for statement states over one schema registry.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    schema: Arc<Schema>,
    options: QueryOptions,
}

impl QueryBuilder {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            options: QueryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn select(&self, table: &str) -> Result<SelectState> {
        SelectState::new(
            Arc::clone(&self.schema),
            table,
            &self.options.alias_separator,
        )
    }

    pub fn insert(&self, table: &str) -> Result<InsertState> {
        Ok(InsertState::new(Arc::clone(self.schema.table(table)?)))
    }

    pub fn update(&self, table: &str) -> Result<UpdateState> {
        Ok(UpdateState::new(Arc::clone(self.schema.table(table)?)))
    }

    pub fn delete(&self, table: &str) -> Result<DeleteState> {
        Ok(DeleteState::new(Arc::clone(self.schema.table(table)?)))
    }

    /// A stored procedure call; `procedure` may be written `schema.name`.
    pub fn call<I, T>(&self, procedure: &str, args: I) -> Result<CallQuery>
    where
        I: IntoIterator<Item = T>,
        T: IntoOperand,
    {
        if procedure.is_empty() {
            return Err(QuarryError::invalid_operand("procedure", "name must not be empty"));
        }
        let procedure = match procedure.split_once('.') {
            Some((schema, name)) => {
                let mut procedure = TableRef::new(name);
                procedure.schema = Some(schema.to_owned());
                procedure
            }
            None => TableRef::new(procedure),
        };
        let args = args
            .into_iter()
            .map(|arg| arg.into_operand("args"))
            .collect::<Result<Vec<_>>>()?;
        Ok(CallQuery { procedure, args })
    }
}

pub(crate) fn table_ref(table: &TableDef) -> TableRef {
    let mut table_ref = TableRef::new(&table.name);
    table_ref.schema = table.schema.clone();
    table_ref
}

/// `RETURNING col, ...` after checking every column against `table`.
pub(crate) fn returning_columns<I, S>(table: &TableDef, columns: I) -> Result<Returning>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
    if columns.is_empty() {
        return Err(QuarryError::invalid_operand(
            "returning",
            "expected at least one column",
        ));
    }
    for column in &columns {
        table.require_column(column)?;
    }
    Ok(Returning::Columns(columns))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::schema::{PivotDef, RelationDef, Schema, TableDef};
    use std::sync::Arc;

    pub(crate) fn schema() -> Arc<Schema> {
        Schema::new()
            .with_table(
                TableDef::new("users")
                    .column("id", "integer")
                    .column("name", "text")
                    .column("email", "text")
                    .primary_key("id")
                    .relation("posts", RelationDef::has_many("posts", "user_id")),
            )
            .with_table(
                TableDef::new("posts")
                    .column("id", "integer")
                    .column("user_id", "integer")
                    .column("title", "text")
                    .primary_key("id")
                    .relation("author", RelationDef::belongs_to("users", "user_id"))
                    .relation(
                        "tags",
                        RelationDef::belongs_to_many(
                            "tags",
                            "post_id",
                            PivotDef::new("post_tags", "tag_id"),
                        ),
                    ),
            )
            .with_table(
                TableDef::new("tags")
                    .column("id", "integer")
                    .column("label", "text")
                    .primary_key("id"),
            )
            .with_table(
                TableDef::new("post_tags")
                    .column("post_id", "integer")
                    .column("tag_id", "integer"),
            )
            .with_table(
                TableDef::new("todos")
                    .column("id", "integer")
                    .column("name", "text")
                    .column("done", "integer")
                    .primary_key("id"),
            )
            .into_shared()
    }
}

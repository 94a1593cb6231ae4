#![allow(dead_code)]

use std::sync::Arc;

use quarry::prelude::*;

/// users ─< posts >─< tags, plus a standalone `todos` table.
pub fn schema() -> Arc<Schema> {
    Schema::new()
        .with_table(
            TableDef::new("users")
                .column("id", "integer")
                .column("name", "text")
                .column("email", "text")
                .column("done", "integer")
                .primary_key("id")
                .relation("posts", RelationDef::has_many("posts", "user_id")),
        )
        .with_table(
            TableDef::new("posts")
                .column("id", "integer")
                .column("user_id", "integer")
                .column("title", "text")
                .column("published", "boolean")
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
                .column("tag_id", "integer")
                .column("position", "integer"),
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

pub fn builder() -> QueryBuilder {
    QueryBuilder::new(schema())
}

/// Builds a result row from `(key, value)` cells, keeping their order.
pub fn row<const N: usize>(cells: [(&str, Value); N]) -> Row {
    cells
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

/// Result keys of a compiled projection: the alias when present, otherwise
/// the column name.
pub fn projected_keys(query: &SelectQuery) -> Vec<String> {
    query
        .columns
        .iter()
        .filter_map(|item| match (&item.alias, &item.expr) {
            (Some(alias), _) => Some(alias.clone()),
            (None, quarry::ast::Operand::Column(column)) => Some(column.name.clone()),
            _ => None,
        })
        .collect()
}

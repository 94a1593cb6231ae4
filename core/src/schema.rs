//! Schema metadata consumed by the query states and the include planner.
//!
//! Tables are plain data. Relations point at their target by name and are
//! resolved against a [`Schema`] registry at planning time, so two tables may
//! reference each other without any construction-order constraint.

use std::sync::Arc;

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};

/// A column declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: false,
            default: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_sql(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }
}

/// The closed set of relation cardinalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    /// Nullable single child; the foreign key lives on the target
    HasOne,
    /// Array of children; the foreign key lives on the target
    HasMany,
    /// Nullable single parent; the foreign key lives on the root
    BelongsTo,
    /// Array of children joined through a pivot table
    BelongsToMany,
}

impl RelationKind {
    /// True when the hydrated slot is a collection.
    pub const fn is_many(self) -> bool {
        matches!(self, RelationKind::HasMany | RelationKind::BelongsToMany)
    }
}

/// Pivot table backing a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotDef {
    pub table: String,
    /// Pivot column pointing at the target table
    pub related_key: String,
    /// Target column the pivot points at (defaults to the target primary key)
    #[serde(default)]
    pub target_references: Option<String>,
}

impl PivotDef {
    pub fn new(table: impl Into<String>, related_key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            related_key: related_key.into(),
            target_references: None,
        }
    }
}

/// A relation declared on a table.
///
/// `foreign_key` is always the column that makes the first hop away from the
/// root: on the target for `HasOne`/`HasMany`, on the root for `BelongsTo`,
/// on the pivot for `BelongsToMany`. `references` is the column it points at
/// and defaults to the primary key of the referenced side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    pub kind: RelationKind,
    pub target: String,
    pub foreign_key: String,
    #[serde(default)]
    pub references: Option<String>,
    #[serde(default)]
    pub pivot: Option<PivotDef>,
}

impl RelationDef {
    pub fn has_one(target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self::direct(RelationKind::HasOne, target, foreign_key)
    }

    pub fn has_many(target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self::direct(RelationKind::HasMany, target, foreign_key)
    }

    pub fn belongs_to(target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self::direct(RelationKind::BelongsTo, target, foreign_key)
    }

    /// Many-to-many through `pivot`; `foreign_key` is the pivot column pointing at the root.
    pub fn belongs_to_many(
        target: impl Into<String>,
        foreign_key: impl Into<String>,
        pivot: PivotDef,
    ) -> Self {
        Self {
            kind: RelationKind::BelongsToMany,
            target: target.into(),
            foreign_key: foreign_key.into(),
            references: None,
            pivot: Some(pivot),
        }
    }

    fn direct(kind: RelationKind, target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            foreign_key: foreign_key.into(),
            references: None,
            pivot: None,
        }
    }

    /// Overrides the referenced column.
    pub fn references(mut self, column: impl Into<String>) -> Self {
        self.references = Some(column.into());
        self
    }
}

/// A table declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub columns: IndexMap<String, ColumnDef>,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub relations: IndexMap<String, RelationDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns: IndexMap::new(),
            primary_key: None,
            relations: IndexMap::new(),
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn column(mut self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        let def = ColumnDef::new(name, sql_type);
        self.columns.insert(def.name.clone(), def);
        self
    }

    pub fn column_def(mut self, def: ColumnDef) -> Self {
        self.columns.insert(def.name.clone(), def);
        self
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    pub fn relation(mut self, name: impl Into<String>, relation: RelationDef) -> Self {
        self.relations.insert(name.into(), relation);
        self
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Fails with a message naming the table and column when it is not declared.
    pub fn require_column(&self, column: &str) -> Result<&ColumnDef> {
        self.columns
            .get(column)
            .ok_or_else(|| QuarryError::UnknownColumn {
                table: CompactString::from(self.name.as_str()),
                column: CompactString::from(column),
            })
    }

    pub fn require_relation(&self, relation: &str) -> Result<&RelationDef> {
        self.relations
            .get(relation)
            .ok_or_else(|| QuarryError::UnknownRelation {
                table: CompactString::from(self.name.as_str()),
                relation: CompactString::from(relation),
            })
    }

    /// The primary key, or an error naming the table.
    pub fn require_primary_key(&self) -> Result<&str> {
        self.primary_key.as_deref().ok_or_else(|| {
            QuarryError::InvalidStatement(format!("table `{}` has no primary key", self.name))
        })
    }
}

/// Registry of table definitions, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: IndexMap<CompactString, Arc<TableDef>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing any previous definition with the same name.
    pub fn with_table(mut self, table: TableDef) -> Self {
        self.add(table);
        self
    }

    pub fn add(&mut self, table: TableDef) {
        self.tables
            .insert(CompactString::from(table.name.as_str()), Arc::new(table));
    }

    pub fn table(&self, name: &str) -> Result<&Arc<TableDef>> {
        self.tables
            .get(name)
            .ok_or_else(|| QuarryError::UnknownTable(CompactString::from(name)))
    }

    pub fn tables(&self) -> impl Iterator<Item = &Arc<TableDef>> {
        self.tables.values()
    }

    /// Freezes the registry for sharing between query states.
    pub fn into_shared(self) -> Arc<Schema> {
        Arc::new(self)
    }
}

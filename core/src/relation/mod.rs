//! Relation include planning.
//!
//! An include turns a declared relation into extra joins, extra aliased
//! projection columns and one [`RelationPlan`] fragment that tells the
//! hydration engine where those columns live in a flat row.
//!
//! ```ignore
//! let state = SelectState::new(schema, "users")?
//!     .include("posts", IncludeOptions::new().columns(["title"]))?;
//! // SELECT "users"."id", ..., "posts"."id" AS "posts__id", "posts"."title" AS "posts__title"
//! // FROM "users" LEFT JOIN "posts" AS "posts" ON "posts"."user_id" = "users"."id"
//! ```

mod filter;
mod plan;

pub use filter::*;
pub use plan::*;

use smallvec::{smallvec, SmallVec};

use crate::ast::{ColumnRef, Expression, Join, JoinKind, SelectItem, TableRef, TableSource};
use crate::error::Result;
use crate::expr::{conjoin, eq};
use crate::schema::{RelationDef, RelationKind, Schema, TableDef};

/// Caller choices for one include.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeOptions {
    pub(crate) columns: Option<Vec<String>>,
    pub(crate) exclude: Vec<String>,
    pub(crate) pivot_columns: Option<Vec<String>>,
    pub(crate) merge_pivot: bool,
    pub(crate) join: JoinKind,
    pub(crate) on: Option<Expression>,
}

impl Default for IncludeOptions {
    fn default() -> Self {
        Self {
            columns: None,
            exclude: Vec::new(),
            pivot_columns: None,
            merge_pivot: false,
            join: JoinKind::Left,
            on: None,
        }
    }
}

impl IncludeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target columns to project; defaults to every target column.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Target columns to leave out. The target primary key is kept regardless.
    pub fn exclude<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Pivot columns to project for a many-to-many include.
    pub fn pivot_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pivot_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Copy pivot fields onto each child for keys the child lacks.
    pub fn merge_pivot(mut self) -> Self {
        self.merge_pivot = true;
        self
    }

    /// Use an inner join, dropping roots without a related row.
    pub fn inner(mut self) -> Self {
        self.join = JoinKind::Inner;
        self
    }

    /// Extra join condition on the target, written against the include's
    /// alias prefix (`col("posts.published")`).
    pub fn on(mut self, condition: Expression) -> Self {
        self.on = Some(condition);
        self
    }
}

/// What one include adds to a select.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedInclude {
    /// One join, or two through a pivot table
    pub joins: SmallVec<[Join; 2]>,
    pub columns: Vec<SelectItem>,
    /// Root columns the joins and hydration depend on
    pub required_root_columns: SmallVec<[String; 1]>,
    pub relation: RelationPlan,
}

/// Resolves one include against the schema registry.
///
/// `root_ref` is the name root columns are qualified with, `prefix` the
/// already de-duplicated alias prefix, `plan` the plan being grown (used for
/// alias construction only).
pub fn plan_include(
    schema: &Schema,
    root: &TableDef,
    root_ref: &str,
    name: &str,
    prefix: &str,
    options: &IncludeOptions,
    plan: &HydrationPlan,
) -> Result<PlannedInclude> {
    let relation = root.require_relation(name)?;
    let target = schema.table(&relation.target)?;
    let target_pk = target.require_primary_key()?.to_owned();

    let mut columns: Vec<String> = match &options.columns {
        Some(requested) => {
            for column in requested {
                target.require_column(column)?;
            }
            requested.clone()
        }
        None => target.column_names().map(str::to_owned).collect(),
    };
    columns.retain(|column| !options.exclude.contains(column));
    if !columns.contains(&target_pk) {
        columns.insert(0, target_pk.clone());
    }

    let mut joins: SmallVec<[Join; 2]> = SmallVec::new();
    let mut items = Vec::new();
    let mut required_root_columns: SmallVec<[String; 1]> = smallvec![];
    let mut pivot_plan = None;

    match relation.kind {
        RelationKind::HasOne | RelationKind::HasMany => {
            target.require_column(&relation.foreign_key)?;
            let local_key = local_key(root, relation)?;
            let on = eq(
                ColumnRef::new(&relation.foreign_key).scoped(prefix),
                ColumnRef::new(&local_key).scoped(root_ref),
            )?;
            joins.push(join_to(&target.name, target.schema.as_deref(), prefix, on, options));
            required_root_columns.push(local_key);
        }
        RelationKind::BelongsTo => {
            root.require_column(&relation.foreign_key)?;
            let referenced = relation.references.clone().unwrap_or_else(|| target_pk.clone());
            target.require_column(&referenced)?;
            let on = eq(
                ColumnRef::new(&referenced).scoped(prefix),
                ColumnRef::new(&relation.foreign_key).scoped(root_ref),
            )?;
            joins.push(join_to(&target.name, target.schema.as_deref(), prefix, on, options));
            required_root_columns.push(relation.foreign_key.clone());
        }
        RelationKind::BelongsToMany => {
            let pivot = pivot_def(root, name, relation)?;
            let pivot_table = schema.table(&pivot.table)?;
            pivot_table.require_column(&relation.foreign_key)?;
            pivot_table.require_column(&pivot.related_key)?;
            let local_key = local_key(root, relation)?;
            let target_key = pivot
                .target_references
                .clone()
                .unwrap_or_else(|| target_pk.clone());
            target.require_column(&target_key)?;

            let pivot_prefix = format!("{prefix}_pivot");
            let pivot_on = eq(
                ColumnRef::new(&relation.foreign_key).scoped(&pivot_prefix),
                ColumnRef::new(&local_key).scoped(root_ref),
            )?;
            joins.push(Join {
                kind: options.join,
                source: TableSource::Table(aliased(
                    &pivot_table.name,
                    pivot_table.schema.as_deref(),
                    &pivot_prefix,
                )),
                on: Some(pivot_on),
            });
            let target_on = eq(
                ColumnRef::new(&target_key).scoped(prefix),
                ColumnRef::new(&pivot.related_key).scoped(&pivot_prefix),
            )?;
            joins.push(join_to(&target.name, target.schema.as_deref(), prefix, target_on, options));

            let pivot_columns = match &options.pivot_columns {
                Some(requested) => {
                    for column in requested {
                        pivot_table.require_column(column)?;
                    }
                    requested.clone()
                }
                None => {
                    let mut defaults = vec![relation.foreign_key.clone(), pivot.related_key.clone()];
                    if let Some(pk) = &pivot_table.primary_key {
                        if !defaults.contains(pk) {
                            defaults.push(pk.clone());
                        }
                    }
                    defaults
                }
            };
            items.extend(
                pivot_columns
                    .iter()
                    .map(|column| aliased_column(&pivot_prefix, column, plan)),
            );
            pivot_plan = Some(PivotPlan {
                alias_prefix: pivot_prefix,
                columns: pivot_columns,
                merge: options.merge_pivot,
            });
            required_root_columns.push(local_key);
        }
    }

    items.extend(columns.iter().map(|column| aliased_column(prefix, column, plan)));

    crate::quarry_trace_plan!(name, relation.kind, prefix);

    Ok(PlannedInclude {
        joins,
        columns: items,
        required_root_columns,
        relation: RelationPlan {
            name: name.to_owned(),
            kind: relation.kind,
            alias_prefix: prefix.to_owned(),
            target_primary_key: target_pk,
            columns,
            pivot: pivot_plan,
        },
    })
}

/// Root-side column a Has*/BelongsToMany relation points at.
pub(crate) fn local_key(root: &TableDef, relation: &RelationDef) -> Result<String> {
    let key = match &relation.references {
        Some(column) => column.clone(),
        None => root.require_primary_key()?.to_owned(),
    };
    root.require_column(&key)?;
    Ok(key)
}

pub(crate) fn pivot_def<'r>(
    root: &TableDef,
    name: &str,
    relation: &'r RelationDef,
) -> Result<&'r crate::schema::PivotDef> {
    relation.pivot.as_ref().ok_or_else(|| {
        crate::error::QuarryError::InvalidStatement(format!(
            "relation `{name}` on `{}` is many-to-many but declares no pivot table",
            root.name
        ))
    })
}

pub(crate) fn aliased(table: &str, schema: Option<&str>, alias: &str) -> TableRef {
    let mut table_ref = TableRef::aliased(table, alias);
    table_ref.schema = schema.map(str::to_owned);
    table_ref
}

fn join_to(
    table: &str,
    schema: Option<&str>,
    alias: &str,
    on: Expression,
    options: &IncludeOptions,
) -> Join {
    let on = match &options.on {
        Some(extra) => conjoin(Some(on), extra.clone()),
        None => on,
    };
    Join {
        kind: options.join,
        source: TableSource::Table(aliased(table, schema, alias)),
        on: Some(on),
    }
}

fn aliased_column(prefix: &str, column: &str, plan: &HydrationPlan) -> SelectItem {
    SelectItem::aliased(ColumnRef::new(column).scoped(prefix), plan.alias(prefix, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PivotDef, RelationDef};

    pub(crate) fn schema() -> Schema {
        Schema::new()
            .with_table(
                TableDef::new("users")
                    .column("id", "integer")
                    .column("name", "text")
                    .primary_key("id")
                    .relation("posts", RelationDef::has_many("posts", "user_id"))
                    .relation("profile", RelationDef::has_one("profiles", "user_id")),
            )
            .with_table(
                TableDef::new("posts")
                    .column("id", "integer")
                    .column("user_id", "integer")
                    .column("title", "text")
                    .column("body", "text")
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
                TableDef::new("profiles")
                    .column("id", "integer")
                    .column("user_id", "integer")
                    .primary_key("id"),
            )
            .with_table(
                TableDef::new("tags")
                    .column("id", "integer")
                    .column("label", "text")
                    .primary_key("id"),
            )
            .with_table(
                TableDef::new("post_tags")
                    .column("id", "integer")
                    .column("post_id", "integer")
                    .column("tag_id", "integer")
                    .column("weight", "integer")
                    .primary_key("id"),
            )
    }

    #[test]
    fn target_primary_key_is_forced() {
        let schema = schema();
        let users = schema.table("users").unwrap();
        let plan = HydrationPlan::new(Some("id".into()));
        let planned = plan_include(
            &schema,
            users,
            "users",
            "posts",
            "posts",
            &IncludeOptions::new().columns(["title"]).exclude(["id"]),
            &plan,
        )
        .unwrap();
        assert_eq!(planned.relation.columns, ["id", "title"]);
        assert_eq!(planned.required_root_columns.as_slice(), ["id"]);
        assert_eq!(
            planned
                .columns
                .iter()
                .filter_map(|item| item.alias.clone())
                .collect::<Vec<_>>(),
            ["posts__id", "posts__title"]
        );
    }

    #[test]
    fn many_to_many_projects_pivot_defaults() {
        let schema = schema();
        let posts = schema.table("posts").unwrap();
        let plan = HydrationPlan::new(Some("id".into()));
        let planned =
            plan_include(&schema, posts, "posts", "tags", "tags", &IncludeOptions::new(), &plan)
                .unwrap();
        assert_eq!(planned.joins.len(), 2);
        let pivot = planned.relation.pivot.unwrap();
        assert_eq!(pivot.alias_prefix, "tags_pivot");
        assert_eq!(pivot.columns, ["post_id", "tag_id", "id"]);
    }

    #[test]
    fn unknown_relation_is_named() {
        let schema = schema();
        let users = schema.table("users").unwrap();
        let plan = HydrationPlan::new(Some("id".into()));
        let err = plan_include(
            &schema,
            users,
            "users",
            "comments",
            "comments",
            &IncludeOptions::new(),
            &plan,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unknown relation `comments` on table `users`");
    }

    #[test]
    fn unknown_requested_column_is_named() {
        let schema = schema();
        let users = schema.table("users").unwrap();
        let plan = HydrationPlan::new(Some("id".into()));
        let err = plan_include(
            &schema,
            users,
            "users",
            "posts",
            "posts",
            &IncludeOptions::new().columns(["nope"]),
            &plan,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unknown column `nope` on table `posts`");
    }
}

//! Filtering roots by their related rows.
//!
//! Unlike an include, a relation filter never widens the projection: it
//! compiles to a correlated `EXISTS`/`NOT EXISTS` or to a grouped `IN`
//! subquery over the relation's keys, so it cannot fan out the root rows.

use serde::{Deserialize, Serialize};

use super::{aliased, local_key, pivot_def};
use crate::ast::{
    BinaryExpression, BinaryOperator, ColumnRef, Expression, Join, JoinKind, Operand, SelectItem,
    SelectQuery, TableSource,
};
use crate::error::{QuarryError, Result};
use crate::expr::{and2, count_all, eq, exists, in_subquery, not, not_exists, or};
use crate::schema::{RelationKind, Schema, TableDef};

/// A predicate over the rows reachable through one relation.
///
/// Conditions are written against the relation name as qualifier, e.g.
/// `RelationFilter::Some { filter: eq(col("posts.published"), true)? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RelationFilter {
    /// At least one related row matches
    Some { filter: Expression },
    /// No related row matches
    None { filter: Expression },
    /// Every related row matches (vacuously true without related rows)
    Every { filter: Expression },
    /// No related rows at all
    IsEmpty,
    /// The number of related rows compares to `value` with `op`
    Count { op: BinaryOperator, value: i64 },
}

/// How the root reaches the related rows.
struct Correlation {
    /// Root-side column, qualified by the root reference
    outer: ColumnRef,
    /// Related-side column the outer one equals
    inner: ColumnRef,
    /// FROM source and joins of the correlated subquery
    from: TableSource,
    joins: Vec<Join>,
}

impl Correlation {
    fn subquery(&self, filter: Option<Expression>) -> Result<SelectQuery> {
        let link = eq(self.inner.clone(), self.outer.clone())?;
        Ok(SelectQuery {
            columns: vec![SelectItem::new(self.inner.clone())],
            from: Some(self.from.clone()),
            joins: self.joins.clone(),
            where_: Some(match filter {
                Some(filter) => and2(link, filter),
                None => link,
            }),
            ..SelectQuery::default()
        })
    }

    fn grouped(&self, op: BinaryOperator, value: i64) -> SelectQuery {
        let having = Expression::Binary(BinaryExpression {
            left: count_all(),
            op,
            right: Operand::literal(value),
        });
        SelectQuery {
            columns: vec![SelectItem::new(self.inner.clone())],
            from: Some(self.from.clone()),
            joins: self.joins.clone(),
            group_by: vec![self.inner.clone().into()],
            having: Some(having),
            ..SelectQuery::default()
        }
    }
}

/// Compiles `filter` over relation `name` of `root` into a WHERE predicate.
pub fn relation_filter(
    schema: &Schema,
    root: &TableDef,
    root_ref: &str,
    name: &str,
    filter: &RelationFilter,
) -> Result<Expression> {
    let correlation = correlate(schema, root, root_ref, name)?;
    match filter {
        RelationFilter::Some { filter } => Ok(exists(correlation.subquery(Some(filter.clone()))?)),
        RelationFilter::None { filter } => {
            Ok(not_exists(correlation.subquery(Some(filter.clone()))?))
        }
        RelationFilter::Every { filter } => Ok(not_exists(
            correlation.subquery(Some(not(filter.clone())))?,
        )),
        RelationFilter::IsEmpty => Ok(not_exists(correlation.subquery(None)?)),
        RelationFilter::Count { op, value } => {
            let zero_matches = compare(*op, 0, *value)?;
            let grouped = in_subquery(correlation.outer.clone(), correlation.grouped(*op, *value))?;
            if zero_matches {
                // roots without related rows never reach the GROUP BY
                Ok(or([not_exists(correlation.subquery(None)?), grouped]))
            } else {
                Ok(grouped)
            }
        }
    }
}

fn compare(op: BinaryOperator, left: i64, right: i64) -> Result<bool> {
    Ok(match op {
        BinaryOperator::Eq => left == right,
        BinaryOperator::Ne => left != right,
        BinaryOperator::Lt => left < right,
        BinaryOperator::Le => left <= right,
        BinaryOperator::Gt => left > right,
        BinaryOperator::Ge => left >= right,
        other => {
            return Err(QuarryError::invalid_operand(
                "op",
                format!("`{}` cannot compare a relation count", other.as_str()),
            ));
        }
    })
}

fn correlate(schema: &Schema, root: &TableDef, root_ref: &str, name: &str) -> Result<Correlation> {
    let relation = root.require_relation(name)?;
    let target = schema.table(&relation.target)?;
    let target_source = TableSource::Table(aliased(&target.name, target.schema.as_deref(), name));

    match relation.kind {
        RelationKind::HasOne | RelationKind::HasMany => {
            target.require_column(&relation.foreign_key)?;
            let local = local_key(root, relation)?;
            Ok(Correlation {
                outer: ColumnRef::new(local).scoped(root_ref),
                inner: ColumnRef::new(&relation.foreign_key).scoped(name),
                from: target_source,
                joins: Vec::new(),
            })
        }
        RelationKind::BelongsTo => {
            root.require_column(&relation.foreign_key)?;
            let referenced = match &relation.references {
                Some(column) => column.clone(),
                None => target.require_primary_key()?.to_owned(),
            };
            target.require_column(&referenced)?;
            Ok(Correlation {
                outer: ColumnRef::new(&relation.foreign_key).scoped(root_ref),
                inner: ColumnRef::new(referenced).scoped(name),
                from: target_source,
                joins: Vec::new(),
            })
        }
        RelationKind::BelongsToMany => {
            let pivot = pivot_def(root, name, relation)?;
            let pivot_table = schema.table(&pivot.table)?;
            pivot_table.require_column(&relation.foreign_key)?;
            pivot_table.require_column(&pivot.related_key)?;
            let target_key = match &pivot.target_references {
                Some(column) => column.clone(),
                None => target.require_primary_key()?.to_owned(),
            };
            target.require_column(&target_key)?;
            let local = local_key(root, relation)?;
            let pivot_alias = format!("{name}_pivot");
            Ok(Correlation {
                outer: ColumnRef::new(local).scoped(root_ref),
                inner: ColumnRef::new(&relation.foreign_key).scoped(&pivot_alias),
                from: TableSource::Table(aliased(
                    &pivot_table.name,
                    pivot_table.schema.as_deref(),
                    &pivot_alias,
                )),
                joins: vec![Join {
                    kind: JoinKind::Inner,
                    source: target_source,
                    on: Some(eq(
                        ColumnRef::new(target_key).scoped(name),
                        ColumnRef::new(&pivot.related_key).scoped(&pivot_alias),
                    )?),
                }],
            })
        }
    }
}

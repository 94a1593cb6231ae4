//! Hydration plan: where to find each included relation again in a flat row.

use serde::{Deserialize, Serialize};

use crate::schema::RelationKind;

/// Default separator between an alias prefix and a column name.
pub const DEFAULT_ALIAS_SEPARATOR: &str = "__";

/// Built incrementally while a select state grows includes, consumed once by
/// [`hydrate`](crate::hydrate::hydrate) after rows arrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationPlan {
    /// Root identity column; `None` for tables without a primary key
    pub root_primary_key: Option<String>,
    /// Result keys of the root projection; empty means "every column that
    /// is not a relation alias"
    #[serde(default)]
    pub root_columns: Vec<String>,
    #[serde(default)]
    pub relations: Vec<RelationPlan>,
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    DEFAULT_ALIAS_SEPARATOR.to_owned()
}

impl HydrationPlan {
    pub fn new(root_primary_key: Option<String>) -> Self {
        Self {
            root_primary_key,
            root_columns: Vec::new(),
            relations: Vec::new(),
            separator: default_separator(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// `prefix + separator + column`.
    pub fn alias(&self, prefix: &str, column: &str) -> String {
        let mut alias = String::with_capacity(prefix.len() + self.separator.len() + column.len());
        alias.push_str(prefix);
        alias.push_str(&self.separator);
        alias.push_str(column);
        alias
    }

    /// Every alias the plan expects to read back, relation columns first and
    /// pivot columns after, in include order.
    pub fn expected_aliases(&self) -> Vec<String> {
        let mut aliases = Vec::new();
        for relation in &self.relations {
            if let Some(pivot) = &relation.pivot {
                aliases.extend(pivot.columns.iter().map(|c| self.alias(&pivot.alias_prefix, c)));
            }
            aliases.extend(
                relation
                    .columns
                    .iter()
                    .map(|c| self.alias(&relation.alias_prefix, c)),
            );
        }
        aliases
    }

    /// True when `key` belongs to one of the relation or pivot prefixes.
    pub fn is_relation_alias(&self, key: &str) -> bool {
        self.relations.iter().any(|relation| {
            self.has_prefix(key, &relation.alias_prefix)
                || relation
                    .pivot
                    .as_ref()
                    .is_some_and(|pivot| self.has_prefix(key, &pivot.alias_prefix))
        })
    }

    fn has_prefix(&self, key: &str, prefix: &str) -> bool {
        key.strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(self.separator.as_str()))
    }

    /// True when some relation or pivot already uses `prefix`.
    pub fn uses_prefix(&self, prefix: &str) -> bool {
        self.relations.iter().any(|relation| {
            relation.alias_prefix == prefix
                || relation
                    .pivot
                    .as_ref()
                    .is_some_and(|pivot| pivot.alias_prefix == prefix)
        })
    }
}

/// One included relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationPlan {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub alias_prefix: String,
    pub target_primary_key: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub pivot: Option<PivotPlan>,
}

/// Pivot columns of a many-to-many include, under their own prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotPlan {
    pub alias_prefix: String,
    pub columns: Vec<String>,
    /// Copy pivot fields onto the child for keys the child lacks
    #[serde(default)]
    pub merge: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> HydrationPlan {
        let mut plan = HydrationPlan::new(Some("id".into()));
        plan.relations.push(RelationPlan {
            name: "tags".into(),
            kind: RelationKind::BelongsToMany,
            alias_prefix: "tags".into(),
            target_primary_key: "id".into(),
            columns: vec!["id".into(), "label".into()],
            pivot: Some(PivotPlan {
                alias_prefix: "tags_pivot".into(),
                columns: vec!["post_id".into()],
                merge: false,
            }),
        });
        plan
    }

    #[test]
    fn aliases_use_the_separator() {
        let plan = plan();
        assert_eq!(
            plan.expected_aliases(),
            ["tags_pivot__post_id", "tags__id", "tags__label"]
        );
        assert!(plan.is_relation_alias("tags__label"));
        assert!(plan.is_relation_alias("tags_pivot__post_id"));
        assert!(!plan.is_relation_alias("tagsline"));
        assert!(!plan.is_relation_alias("id"));
    }

    #[test]
    fn plans_serialize_camel_case() {
        let json = serde_json::to_value(plan()).unwrap();
        assert_eq!(json["rootPrimaryKey"], "id");
        assert_eq!(json["relations"][0]["type"], "belongsToMany");
        assert_eq!(json["relations"][0]["pivot"]["aliasPrefix"], "tags_pivot");
    }
}

//! Hydration: flat joined rows back into nested entities.
//!
//! A to-many include multiplies root rows; a second to-many include on the
//! same root multiplies them again. Hydration undoes both by grouping on the
//! root primary key and de-duplicating children per `(root, relation)` on
//! the child primary key, keeping first-seen order everywhere.

use hashbrown::HashSet;
use indexmap::IndexMap;

use crate::relation::{HydrationPlan, RelationPlan};
use crate::value::{Row, Value, ValueKey};

/// One hydrated record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    pub fields: IndexMap<String, Value>,
    /// One slot per planned relation, in include order
    pub relations: IndexMap<String, Related>,
    /// Pivot columns carried by a many-to-many child; side data only
    pub pivot: Option<IndexMap<String, Value>>,
}

impl Entity {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn relation(&self, name: &str) -> Option<&Related> {
        self.relations.get(name)
    }

    /// Fields followed by relations. The pivot payload is not serialized.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::with_capacity(self.fields.len() + self.relations.len());
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.to_json());
        }
        for (name, related) in &self.relations {
            object.insert(name.clone(), related.to_json());
        }
        serde_json::Value::Object(object)
    }
}

/// A relation slot on a hydrated entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    One(Option<Box<Entity>>),
    Many(Vec<Entity>),
}

impl Related {
    fn empty(many: bool) -> Self {
        if many {
            Related::Many(Vec::new())
        } else {
            Related::One(None)
        }
    }

    pub fn as_one(&self) -> Option<&Entity> {
        match self {
            Related::One(entity) => entity.as_deref(),
            Related::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> &[Entity] {
        match self {
            Related::Many(entities) => entities,
            Related::One(_) => &[],
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Related::One(Some(entity)) => entity.to_json(),
            Related::One(None) => serde_json::Value::Null,
            Related::Many(entities) => {
                serde_json::Value::Array(entities.iter().map(Entity::to_json).collect())
            }
        }
    }
}

/// Reassembles `rows` into root entities following `plan`.
///
/// Roots come out in first-seen order, collection children in row order.
/// Rows whose root key is missing or NULL are skipped, unless the plan has no
/// relations, in which case each such row is returned as its own entity.
pub fn hydrate(rows: &[Row], plan: &HydrationPlan) -> Vec<Entity> {
    crate::quarry_profile_scope!("hydrate", "rows");

    let mut roots: Vec<Entity> = Vec::new();
    let mut index: IndexMap<ValueKey, usize> = IndexMap::new();
    let mut seen: HashSet<(usize, usize, ValueKey)> = HashSet::new();

    for row in rows {
        let root_key = plan
            .root_primary_key
            .as_deref()
            .and_then(|pk| row.get(pk))
            .filter(|value| !value.is_null())
            .map(Value::key);

        let Some(root_key) = root_key else {
            if plan.relations.is_empty() {
                roots.push(base_entity(row, plan));
            }
            continue;
        };

        let slot = match index.get(&root_key) {
            Some(&slot) => slot,
            None => {
                roots.push(base_entity(row, plan));
                let slot = roots.len() - 1;
                index.insert(root_key, slot);
                slot
            }
        };

        for (position, relation) in plan.relations.iter().enumerate() {
            let child_key = row
                .get(&plan.alias(&relation.alias_prefix, &relation.target_primary_key))
                .filter(|value| !value.is_null())
                .map(Value::key);
            // outer join miss
            let Some(child_key) = child_key else {
                continue;
            };
            if !seen.insert((slot, position, child_key)) {
                continue;
            }
            let child = child_entity(row, plan, relation);
            match roots[slot].relations.get_mut(&relation.name) {
                Some(Related::Many(children)) => children.push(child),
                Some(Related::One(existing)) => {
                    if existing.is_none() {
                        *existing = Some(Box::new(child));
                    }
                }
                None => {}
            }
        }
    }

    crate::quarry_trace_hydrate!(rows.len(), roots.len());
    roots
}

fn base_entity(row: &Row, plan: &HydrationPlan) -> Entity {
    let fields = if plan.root_columns.is_empty() {
        row.iter()
            .filter(|(key, _)| !plan.is_relation_alias(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    } else {
        plan.root_columns
            .iter()
            .filter_map(|key| row.get(key).map(|value| (key.clone(), value.clone())))
            .collect()
    };
    let relations = plan
        .relations
        .iter()
        .map(|relation| (relation.name.clone(), Related::empty(relation.kind.is_many())))
        .collect();
    Entity {
        fields,
        relations,
        pivot: None,
    }
}

fn child_entity(row: &Row, plan: &HydrationPlan, relation: &RelationPlan) -> Entity {
    let mut fields: IndexMap<String, Value> = relation
        .columns
        .iter()
        .map(|column| {
            let value = row
                .get(&plan.alias(&relation.alias_prefix, column))
                .cloned()
                .unwrap_or_default();
            (column.clone(), value)
        })
        .collect();

    let mut pivot = None;
    if let Some(pivot_plan) = &relation.pivot {
        let payload: IndexMap<String, Value> = pivot_plan
            .columns
            .iter()
            .map(|column| {
                let value = row
                    .get(&plan.alias(&pivot_plan.alias_prefix, column))
                    .cloned()
                    .unwrap_or_default();
                (column.clone(), value)
            })
            .collect();
        if payload.values().any(|value| !value.is_null()) {
            if pivot_plan.merge {
                for (key, value) in &payload {
                    fields
                        .entry(key.clone())
                        .or_insert_with(|| value.clone());
                }
            }
            pivot = Some(payload);
        }
    }

    Entity {
        fields,
        relations: IndexMap::new(),
        pivot,
    }
}

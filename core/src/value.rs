//! Bound parameter and result cell values.

use core::fmt;
use core::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A flat result row as handed back by an executor: column name to value,
/// in projection order.
pub type Row = IndexMap<String, Value>;

/// A dialect-neutral SQL value.
///
/// This is what literal operands carry into the parameter list and what an
/// executor hands back in result rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Json(serde_json::Value),
}

impl Value {
    /// True for SQL NULL (and a JSON `null` document).
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Json(serde_json::Value::Null))
    }

    /// Returns a hashable projection used for identity comparisons.
    ///
    /// Floats are compared bitwise so that `1.0` read twice from the same
    /// column groups to the same entity.
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Null => ValueKey::Null,
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Integer(i) => ValueKey::Integer(*i),
            Value::Real(f) => ValueKey::Real(f.to_bits()),
            Value::Text(s) => ValueKey::Text(s.clone()),
            Value::Blob(b) => ValueKey::Blob(b.clone()),
            Value::Json(j) => ValueKey::Json(j.to_string()),
        }
    }

    /// Converts into a JSON value for serialization of hydrated output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Real(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Blob(b) => serde_json::Value::Array(
                b.iter().map(|byte| serde_json::Value::from(*byte)).collect(),
            ),
            Value::Json(j) => j.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Value::Json(j) => write!(f, "{j}"),
        }
    }
}

/// Hashable identity of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKey {
    Null,
    Bool(bool),
    Integer(i64),
    Real(u64),
    Text(String),
    Blob(Vec<u8>),
    /// Serialized JSON document
    Json(String),
}

impl Hash for ValueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            ValueKey::Null => {}
            ValueKey::Bool(b) => b.hash(state),
            ValueKey::Integer(i) => i.hash(state),
            ValueKey::Real(bits) => bits.hash(state),
            ValueKey::Text(s) => s.hash(state),
            ValueKey::Blob(b) => b.hash(state),
            ValueKey::Json(j) => j.hash(state),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Integer(value as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Real(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_group_equal_values() {
        assert_eq!(Value::from(1).key(), Value::Integer(1).key());
        assert_eq!(Value::Real(1.5).key(), Value::from(1.5f64).key());
        assert_ne!(Value::from("1").key(), Value::from(1).key());
        assert_ne!(
            Value::Json(serde_json::json!("a")).key(),
            Value::from("\"a\"").key()
        );
        assert_eq!(
            Value::Json(serde_json::json!({"a": 1})).key(),
            Value::Json(serde_json::json!({"a": 1})).key()
        );
    }

    #[test]
    fn json_null_is_null() {
        assert!(Value::Json(serde_json::Value::Null).is_null());
        assert!(Value::from(None::<i32>).is_null());
        assert!(!Value::from(0).is_null());
    }
}

//! Expression and operand builders.
//!
//! Builders validate shape only; they never look at a dialect. Every builder
//! that accepts a value funnels it through [`to_operand`], the one place raw
//! scalars, column references and prebuilt operands are normalized.
//!
//! ```ignore
//! use quarry_core::expr::*;
//!
//! let cond = and([eq(col("done"), 0)?, gt(col("priority"), 2)?]);
//! // Renders: ("done" = ? AND "priority" > ?)
//! ```

mod agg;
mod case;
mod cmp;
mod datetime;
mod logical;
mod math;
mod null;
mod primitives;
mod set;
mod string;
mod subquery;
mod window;

pub use agg::*;
pub use case::*;
pub use cmp::*;
pub use datetime::*;
pub use logical::*;
pub use math::*;
pub use null::*;
pub use primitives::*;
pub use set::*;
pub use string::*;
pub use subquery::*;
pub use window::*;

use crate::ast::{ColumnRef, Operand, SelectQuery};
use crate::error::{QuarryError, Result};
use crate::value::Value;

/// Conversion into an [`Operand`], naming the argument on failure.
pub trait IntoOperand {
    fn into_operand(self, argument: &str) -> Result<Operand>;
}

/// Normalizes a raw scalar, a column reference or a prebuilt operand.
///
/// Shapes that have no operand meaning (JSON arrays and objects passed as
/// bare scalars) are rejected with an error naming `argument`; wrap them in
/// [`Value::Json`] to bind a JSON document instead.
pub fn to_operand(argument: &str, value: impl IntoOperand) -> Result<Operand> {
    value.into_operand(argument)
}

impl IntoOperand for Operand {
    fn into_operand(self, _argument: &str) -> Result<Operand> {
        Ok(self)
    }
}

impl IntoOperand for &Operand {
    fn into_operand(self, _argument: &str) -> Result<Operand> {
        Ok(self.clone())
    }
}

impl IntoOperand for ColumnRef {
    fn into_operand(self, _argument: &str) -> Result<Operand> {
        Ok(Operand::Column(self))
    }
}

impl IntoOperand for &ColumnRef {
    fn into_operand(self, _argument: &str) -> Result<Operand> {
        Ok(Operand::Column(self.clone()))
    }
}

impl IntoOperand for Value {
    fn into_operand(self, _argument: &str) -> Result<Operand> {
        Ok(Operand::Literal { value: self })
    }
}

impl IntoOperand for SelectQuery {
    fn into_operand(self, _argument: &str) -> Result<Operand> {
        Ok(Operand::ScalarSubquery {
            query: Box::new(self),
        })
    }
}

impl IntoOperand for serde_json::Value {
    fn into_operand(self, argument: &str) -> Result<Operand> {
        let value = match self {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Real(n.as_f64().ok_or_else(|| {
                    QuarryError::invalid_operand(argument, format!("number {n} is out of range"))
                })?),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(_) => {
                return Err(QuarryError::invalid_operand(
                    argument,
                    "expected a literal, column reference, or operand node, got an array",
                ));
            }
            serde_json::Value::Object(_) => {
                return Err(QuarryError::invalid_operand(
                    argument,
                    "expected a literal, column reference, or operand node, got an object",
                ));
            }
        };
        Ok(Operand::Literal { value })
    }
}

impl<T: IntoOperand> IntoOperand for Option<T> {
    fn into_operand(self, argument: &str) -> Result<Operand> {
        match self {
            Some(inner) => inner.into_operand(argument),
            None => Ok(Operand::Literal { value: Value::Null }),
        }
    }
}

macro_rules! impl_into_operand_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoOperand for $t {
                fn into_operand(self, _argument: &str) -> Result<Operand> {
                    Ok(Operand::Literal { value: Value::from(self) })
                }
            }
        )*
    };
}

impl_into_operand_scalar!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    &str,
    String,
    Vec<u8>,
);

// =============================================================================
// Leaf constructors
// =============================================================================

/// A column reference; `"table.column"` is split into a qualified reference.
pub fn col(name: &str) -> ColumnRef {
    match name.split_once('.') {
        Some((table, column)) if !table.is_empty() && !column.is_empty() => {
            ColumnRef::qualified(table, column)
        }
        _ => ColumnRef::new(name),
    }
}

/// A literal that will be bound as a parameter.
pub fn lit(value: impl Into<Value>) -> Operand {
    Operand::literal(value)
}

/// A reference to a projection alias.
pub fn alias_ref(name: impl Into<String>) -> Operand {
    Operand::AliasRef { name: name.into() }
}

/// The proposed row's value for `column` inside an upsert update.
pub fn excluded(column: impl Into<String>) -> Operand {
    Operand::Excluded {
        column: column.into(),
    }
}

pub(crate) fn operands<I, T>(argument: &str, values: I) -> Result<Vec<Operand>>
where
    I: IntoIterator<Item = T>,
    T: IntoOperand,
{
    values
        .into_iter()
        .map(|value| value.into_operand(argument))
        .collect()
}

pub(crate) fn require_type_name(argument: &str, name: &str) -> Result<()> {
    if !crate::ast::is_type_name(name) {
        return Err(QuarryError::invalid_operand(
            argument,
            format!("`{name}` is not a type name"),
        ));
    }
    Ok(())
}

pub(crate) fn require_collation(argument: &str, name: &str) -> Result<()> {
    if !crate::ast::is_collation_name(name) {
        return Err(QuarryError::invalid_operand(
            argument,
            format!("`{name}` is not a collation name"),
        ));
    }
    Ok(())
}

pub(crate) fn require_name(argument: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(QuarryError::invalid_operand(argument, "name must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_operand_normalizes_each_shape() {
        assert_eq!(to_operand("x", 3).unwrap(), lit(3));
        assert_eq!(
            to_operand("x", col("users.id")).unwrap(),
            Operand::Column(ColumnRef::qualified("users", "id"))
        );
        let prebuilt = lit("a");
        assert_eq!(to_operand("x", prebuilt.clone()).unwrap(), prebuilt);
        assert_eq!(to_operand("x", None::<i32>).unwrap(), lit(Value::Null));
    }

    #[test]
    fn to_operand_rejects_structured_json() {
        let err = to_operand("right", json!([1, 2])).unwrap_err();
        match err {
            QuarryError::InvalidOperand { argument, .. } => assert_eq!(argument, "right"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(to_operand("right", json!({"a": 1})).is_err());
        assert_eq!(to_operand("right", json!(1.5)).unwrap(), lit(1.5));
    }

    #[test]
    fn col_splits_qualified_names() {
        assert_eq!(col("id"), ColumnRef::new("id"));
        assert_eq!(col("posts.title"), ColumnRef::qualified("posts", "title"));
        assert_eq!(col(".weird"), ColumnRef::new(".weird"));
    }
}

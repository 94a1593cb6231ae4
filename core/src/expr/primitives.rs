//! Generic function calls, casts, collations and JSON path extraction.

use crate::ast::{Cast, Collate, ColumnRef, FunctionCall, JsonPath, Operand, OrderByItem};
use crate::error::{QuarryError, Result};

use super::{IntoOperand, operands, require_collation, require_name, require_type_name};

/// A function call by name. Whether the name exists is decided by the
/// dialect's function table at compile time, not here.
pub fn function(name: &str, args: Vec<Operand>) -> Result<Operand> {
    require_name("name", name)?;
    Ok(Operand::Function(FunctionCall::new(name, args)))
}

/// Like [`function`], coercing each argument through `to_operand`.
pub fn call<I, T>(name: &str, args: I) -> Result<Operand>
where
    I: IntoIterator<Item = T>,
    T: IntoOperand,
{
    function(name, operands("args", args)?)
}

/// Builder for function calls that need `DISTINCT`, an inner `ORDER BY`,
/// or a separator (string aggregation).
#[derive(Debug, Clone)]
pub struct FunctionBuilder {
    call: FunctionCall,
}

impl FunctionBuilder {
    pub fn new(name: &str, args: Vec<Operand>) -> Result<Self> {
        require_name("name", name)?;
        Ok(Self {
            call: FunctionCall::new(name, args),
        })
    }

    pub fn distinct(mut self) -> Self {
        self.call.distinct = true;
        self
    }

    pub fn order_by(mut self, items: impl IntoIterator<Item = OrderByItem>) -> Self {
        self.call.order_by.extend(items);
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.call.separator = Some(separator.into());
        self
    }

    pub fn build(self) -> Operand {
        Operand::Function(self.call)
    }
}

/// `CAST(expr AS cast_type)`.
pub fn cast(expr: impl IntoOperand, cast_type: &str) -> Result<Operand> {
    require_type_name("cast_type", cast_type)?;
    Ok(Operand::Cast(Cast {
        expression: Box::new(expr.into_operand("expression")?),
        cast_type: cast_type.to_owned(),
    }))
}

/// `expr COLLATE collation`.
pub fn collate(expr: impl IntoOperand, collation: &str) -> Result<Operand> {
    require_collation("collation", collation)?;
    Ok(Operand::Collate(Collate {
        expression: Box::new(expr.into_operand("expression")?),
        collation: collation.to_owned(),
    }))
}

/// Extracts the scalar at a dot-separated `path` (optionally `$`-prefixed)
/// from a JSON column.
pub fn json_path(column: ColumnRef, path: &str) -> Result<Operand> {
    let node = JsonPath {
        column,
        path: path.to_owned(),
    };
    if node.segments().next().is_none() {
        return Err(QuarryError::invalid_operand(
            "path",
            "JSON path must name at least one key",
        ));
    }
    if node.segments().any(|segment| segment.contains('\'')) {
        return Err(QuarryError::invalid_operand(
            "path",
            "JSON path keys must not contain quotes",
        ));
    }
    Ok(Operand::JsonPath(node))
}

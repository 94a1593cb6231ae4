//! NULL checks and NULL handling functions.

use crate::ast::{Expression, NullExpression, Operand};
use crate::error::Result;

use super::{IntoOperand, function, operands};

/// `operand IS NULL`.
pub fn is_null(operand: impl IntoOperand) -> Result<Expression> {
    Ok(Expression::Null(NullExpression {
        operand: operand.into_operand("operand")?,
        negated: false,
    }))
}

/// `operand IS NOT NULL`.
pub fn is_not_null(operand: impl IntoOperand) -> Result<Expression> {
    Ok(Expression::Null(NullExpression {
        operand: operand.into_operand("operand")?,
        negated: true,
    }))
}

/// `COALESCE(a, b, ...)`.
pub fn coalesce<I, T>(values: I) -> Result<Operand>
where
    I: IntoIterator<Item = T>,
    T: IntoOperand,
{
    function("COALESCE", operands("values", values)?)
}

/// `NULLIF(a, b)`.
pub fn nullif(left: impl IntoOperand, right: impl IntoOperand) -> Result<Operand> {
    function(
        "NULLIF",
        vec![left.into_operand("left")?, right.into_operand("right")?],
    )
}

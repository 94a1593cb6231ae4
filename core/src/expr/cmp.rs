//! Comparison builders.
//!
//! - `eq`, `ne`, `gt`, `gte`, `lt`, `lte`: binary comparisons
//! - `like`, `not_like`, `ilike`, `not_ilike`: pattern matches
//! - `between`, `not_between`: range checks

use crate::ast::{BetweenExpression, BinaryExpression, BinaryOperator, Expression};
use crate::error::Result;

use super::IntoOperand;

// =============================================================================
// Internal Helper
// =============================================================================

fn binary<L, R>(left: L, op: BinaryOperator, right: R) -> Result<Expression>
where
    L: IntoOperand,
    R: IntoOperand,
{
    Ok(Expression::Binary(BinaryExpression {
        left: left.into_operand("left")?,
        op,
        right: right.into_operand("right")?,
    }))
}

// =============================================================================
// Equality Comparisons
// =============================================================================

/// Equality comparison (`=`).
pub fn eq(left: impl IntoOperand, right: impl IntoOperand) -> Result<Expression> {
    binary(left, BinaryOperator::Eq, right)
}

/// Inequality comparison (`<>`).
pub fn ne(left: impl IntoOperand, right: impl IntoOperand) -> Result<Expression> {
    binary(left, BinaryOperator::Ne, right)
}

// =============================================================================
// Ordering Comparisons
// =============================================================================

pub fn gt(left: impl IntoOperand, right: impl IntoOperand) -> Result<Expression> {
    binary(left, BinaryOperator::Gt, right)
}

pub fn gte(left: impl IntoOperand, right: impl IntoOperand) -> Result<Expression> {
    binary(left, BinaryOperator::Ge, right)
}

pub fn lt(left: impl IntoOperand, right: impl IntoOperand) -> Result<Expression> {
    binary(left, BinaryOperator::Lt, right)
}

pub fn lte(left: impl IntoOperand, right: impl IntoOperand) -> Result<Expression> {
    binary(left, BinaryOperator::Le, right)
}

// =============================================================================
// Pattern Matching
// =============================================================================

pub fn like(left: impl IntoOperand, pattern: impl IntoOperand) -> Result<Expression> {
    binary(left, BinaryOperator::Like, pattern)
}

pub fn not_like(left: impl IntoOperand, pattern: impl IntoOperand) -> Result<Expression> {
    binary(left, BinaryOperator::NotLike, pattern)
}

/// Case-insensitive LIKE. Dialects without `ILIKE` compile it as
/// `LOWER(left) LIKE LOWER(pattern)`.
pub fn ilike(left: impl IntoOperand, pattern: impl IntoOperand) -> Result<Expression> {
    binary(left, BinaryOperator::ILike, pattern)
}

pub fn not_ilike(left: impl IntoOperand, pattern: impl IntoOperand) -> Result<Expression> {
    binary(left, BinaryOperator::NotILike, pattern)
}

// =============================================================================
// BETWEEN
// =============================================================================

/// `operand BETWEEN low AND high`.
pub fn between(
    operand: impl IntoOperand,
    low: impl IntoOperand,
    high: impl IntoOperand,
) -> Result<Expression> {
    Ok(Expression::Between(BetweenExpression {
        operand: operand.into_operand("operand")?,
        low: low.into_operand("low")?,
        high: high.into_operand("high")?,
        negated: false,
    }))
}

/// `operand NOT BETWEEN low AND high`.
pub fn not_between(
    operand: impl IntoOperand,
    low: impl IntoOperand,
    high: impl IntoOperand,
) -> Result<Expression> {
    let mut expr = between(operand, low, high)?;
    if let Expression::Between(inner) = &mut expr {
        inner.negated = true;
    }
    Ok(expr)
}

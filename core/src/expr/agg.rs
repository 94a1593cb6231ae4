//! Aggregate functions.
//!
//! These produce [`Operand::Function`] nodes; the dialect's function table
//! decides the final spelling (`STRING_AGG` vs `GROUP_CONCAT`, for instance).

use crate::ast::{FunctionCall, Operand, OrderByItem};
use crate::error::Result;

use super::{FunctionBuilder, IntoOperand};

fn aggregate(name: &str, expr: impl IntoOperand) -> Result<Operand> {
    Ok(Operand::Function(FunctionCall::new(
        name,
        vec![expr.into_operand("expr")?],
    )))
}

// =============================================================================
// COUNT
// =============================================================================

/// COUNT(*) - counts all rows.
pub fn count_all() -> Operand {
    Operand::Function(FunctionCall::new("COUNT", Vec::new()))
}

/// COUNT(expr) - counts non-null values.
pub fn count(expr: impl IntoOperand) -> Result<Operand> {
    aggregate("COUNT", expr)
}

/// COUNT(DISTINCT expr).
pub fn count_distinct(expr: impl IntoOperand) -> Result<Operand> {
    Ok(FunctionBuilder::new("COUNT", vec![expr.into_operand("expr")?])?
        .distinct()
        .build())
}

// =============================================================================
// SUM / AVG / MIN / MAX
// =============================================================================

pub fn sum(expr: impl IntoOperand) -> Result<Operand> {
    aggregate("SUM", expr)
}

pub fn avg(expr: impl IntoOperand) -> Result<Operand> {
    aggregate("AVG", expr)
}

pub fn min(expr: impl IntoOperand) -> Result<Operand> {
    aggregate("MIN", expr)
}

pub fn max(expr: impl IntoOperand) -> Result<Operand> {
    aggregate("MAX", expr)
}

// =============================================================================
// String aggregation
// =============================================================================

/// Concatenates values of `expr` across a group with `separator`.
///
/// Rendered as `STRING_AGG` on Postgres and MSSQL, `GROUP_CONCAT` on MySQL and SQLite.
pub fn string_agg(
    expr: impl IntoOperand,
    separator: &str,
    order_by: impl IntoIterator<Item = OrderByItem>,
) -> Result<Operand> {
    Ok(
        FunctionBuilder::new("STRING_AGG", vec![expr.into_operand("expr")?])?
            .separator(separator)
            .order_by(order_by)
            .build(),
    )
}

/// Aggregates values of `expr` into a JSON array.
pub fn json_agg(expr: impl IntoOperand) -> Result<Operand> {
    aggregate("JSON_AGG", expr)
}

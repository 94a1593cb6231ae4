//! Logical operators (AND, OR, NOT).
//!
//! Composition stays structural: `and([a, or([b, c])])` keeps the OR as a
//! child node instead of flattening it into the parent.

use crate::ast::{Expression, LogicalExpression, LogicalOperator};

// =============================================================================
// NOT
// =============================================================================

/// Logical NOT.
pub fn not(expr: Expression) -> Expression {
    Expression::Not {
        operand: Box::new(expr),
    }
}

// =============================================================================
// AND / OR
// =============================================================================

/// Logical AND of any number of conditions.
///
/// Zero conditions compile to a constant-true predicate; one condition is
/// returned unchanged.
pub fn and<I>(conditions: I) -> Expression
where
    I: IntoIterator<Item = Expression>,
{
    logical(LogicalOperator::And, conditions)
}

/// Logical OR of any number of conditions.
///
/// Zero conditions compile to a constant-false predicate.
pub fn or<I>(conditions: I) -> Expression
where
    I: IntoIterator<Item = Expression>,
{
    logical(LogicalOperator::Or, conditions)
}

/// Logical AND of two expressions.
pub fn and2(left: Expression, right: Expression) -> Expression {
    and([left, right])
}

/// Logical OR of two expressions.
pub fn or2(left: Expression, right: Expression) -> Expression {
    or([left, right])
}

fn logical<I>(operator: LogicalOperator, conditions: I) -> Expression
where
    I: IntoIterator<Item = Expression>,
{
    let mut operands: Vec<Expression> = conditions.into_iter().collect();
    if operands.len() == 1 {
        if let Some(only) = operands.pop() {
            return only;
        }
    }
    Expression::Logical(LogicalExpression { operator, operands })
}

/// Appends `extra` to an optional existing condition with AND.
///
/// Used by the query states so repeated `where_` calls accumulate.
pub(crate) fn conjoin(existing: Option<Expression>, extra: Expression) -> Expression {
    match existing {
        None => extra,
        Some(Expression::Logical(LogicalExpression {
            operator: LogicalOperator::And,
            mut operands,
        })) => {
            operands.push(extra);
            Expression::Logical(LogicalExpression {
                operator: LogicalOperator::And,
                operands,
            })
        }
        Some(other) => and([other, extra]),
    }
}

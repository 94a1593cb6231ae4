//! Set membership (IN, NOT IN).

use crate::ast::{Expression, InExpression, InRight, SelectQuery};
use crate::error::Result;

use super::{IntoOperand, operands};

/// `left IN (values...)`.
///
/// An empty list is legal here; the compiler renders it as a constant-false
/// predicate since `IN ()` is not valid SQL.
pub fn in_list<I, T>(left: impl IntoOperand, values: I) -> Result<Expression>
where
    I: IntoIterator<Item = T>,
    T: IntoOperand,
{
    Ok(Expression::In(InExpression {
        left: left.into_operand("left")?,
        negated: false,
        right: InRight::List(operands("values", values)?),
    }))
}

/// `left NOT IN (values...)`; an empty list is constant-true.
pub fn not_in_list<I, T>(left: impl IntoOperand, values: I) -> Result<Expression>
where
    I: IntoIterator<Item = T>,
    T: IntoOperand,
{
    Ok(Expression::In(InExpression {
        left: left.into_operand("left")?,
        negated: true,
        right: InRight::List(operands("values", values)?),
    }))
}

/// `left IN (SELECT ...)`.
pub fn in_subquery(left: impl IntoOperand, query: SelectQuery) -> Result<Expression> {
    Ok(Expression::In(InExpression {
        left: left.into_operand("left")?,
        negated: false,
        right: InRight::Subquery(Box::new(query)),
    }))
}

/// `left NOT IN (SELECT ...)`.
pub fn not_in_subquery(left: impl IntoOperand, query: SelectQuery) -> Result<Expression> {
    Ok(Expression::In(InExpression {
        left: left.into_operand("left")?,
        negated: true,
        right: InRight::Subquery(Box::new(query)),
    }))
}

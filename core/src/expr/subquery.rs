//! Subquery predicates and scalar subqueries.

use crate::ast::{ExistsExpression, Expression, Operand, SelectQuery};

/// `EXISTS (SELECT ...)`.
pub fn exists(query: SelectQuery) -> Expression {
    Expression::Exists(ExistsExpression {
        negated: false,
        query: Box::new(query),
    })
}

/// `NOT EXISTS (SELECT ...)`.
pub fn not_exists(query: SelectQuery) -> Expression {
    Expression::Exists(ExistsExpression {
        negated: true,
        query: Box::new(query),
    })
}

/// `(SELECT ...)` used as a value.
pub fn scalar_subquery(query: SelectQuery) -> Operand {
    Operand::ScalarSubquery {
        query: Box::new(query),
    }
}

//! Boolean-producing nodes.

use serde::{Deserialize, Serialize};

use super::operand::Operand;
use super::stmt::SelectQuery;

/// A boolean-producing node.
///
/// Logical composition is structural: `AND`/`OR` nest rather than flatten,
/// and rendering is a pre-order walk of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Not { operand: Box<Expression> },
    Null(NullExpression),
    In(InExpression),
    Exists(ExistsExpression),
    Between(BetweenExpression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
    /// Case-insensitive LIKE; emulated where the dialect lacks it
    ILike,
    NotILike,
}

impl BinaryOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Like => "LIKE",
            BinaryOperator::NotLike => "NOT LIKE",
            BinaryOperator::ILike => "ILIKE",
            BinaryOperator::NotILike => "NOT ILIKE",
        }
    }

    pub const fn is_case_insensitive(self) -> bool {
        matches!(self, BinaryOperator::ILike | BinaryOperator::NotILike)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub left: Operand,
    pub op: BinaryOperator,
    pub right: Operand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalExpression {
    pub operator: LogicalOperator,
    pub operands: Vec<Expression>,
}

/// `IS NULL` / `IS NOT NULL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullExpression {
    pub operand: Operand,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InRight {
    List(Vec<Operand>),
    Subquery(Box<SelectQuery>),
}

/// `IN` / `NOT IN` against a list or a subquery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InExpression {
    pub left: Operand,
    pub negated: bool,
    pub right: InRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistsExpression {
    pub negated: bool,
    pub query: Box<SelectQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetweenExpression {
    pub operand: Operand,
    pub low: Operand,
    pub high: Operand,
    pub negated: bool,
}

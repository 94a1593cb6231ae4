//! String functions.

use crate::ast::Operand;
use crate::error::Result;

use super::{IntoOperand, function, operands};

pub fn upper(expr: impl IntoOperand) -> Result<Operand> {
    function("UPPER", vec![expr.into_operand("expr")?])
}

pub fn lower(expr: impl IntoOperand) -> Result<Operand> {
    function("LOWER", vec![expr.into_operand("expr")?])
}

/// Character length; `LEN` on MSSQL.
pub fn length(expr: impl IntoOperand) -> Result<Operand> {
    function("LENGTH", vec![expr.into_operand("expr")?])
}

pub fn trim(expr: impl IntoOperand) -> Result<Operand> {
    function("TRIM", vec![expr.into_operand("expr")?])
}

/// SUBSTRING(expr, start, len) with a 1-based start.
pub fn substring(expr: impl IntoOperand, start: i64, len: Option<i64>) -> Result<Operand> {
    let mut args = vec![expr.into_operand("expr")?, Operand::literal(start)];
    if let Some(len) = len {
        args.push(Operand::literal(len));
    }
    function("SUBSTRING", args)
}

/// String concatenation; `||` on Postgres and SQLite, `CONCAT()` elsewhere.
pub fn concat<I, T>(parts: I) -> Result<Operand>
where
    I: IntoIterator<Item = T>,
    T: IntoOperand,
{
    function("CONCAT", operands("parts", parts)?)
}

pub fn replace(
    expr: impl IntoOperand,
    from: impl IntoOperand,
    to: impl IntoOperand,
) -> Result<Operand> {
    function(
        "REPLACE",
        vec![
            expr.into_operand("expr")?,
            from.into_operand("from")?,
            to.into_operand("to")?,
        ],
    )
}

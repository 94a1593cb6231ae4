//! Arithmetic and bitwise operators, plus numeric functions.

use crate::ast::{
    ArithmeticExpression, ArithmeticOperator, BitwiseExpression, BitwiseOperator, Operand,
};
use crate::error::Result;

use super::{IntoOperand, function, operands};

// =============================================================================
// Arithmetic
// =============================================================================

fn arithmetic(
    left: impl IntoOperand,
    op: ArithmeticOperator,
    right: impl IntoOperand,
) -> Result<Operand> {
    Ok(Operand::Arithmetic(ArithmeticExpression {
        left: Box::new(left.into_operand("left")?),
        op,
        right: Box::new(right.into_operand("right")?),
    }))
}

pub fn add(left: impl IntoOperand, right: impl IntoOperand) -> Result<Operand> {
    arithmetic(left, ArithmeticOperator::Add, right)
}

pub fn sub(left: impl IntoOperand, right: impl IntoOperand) -> Result<Operand> {
    arithmetic(left, ArithmeticOperator::Sub, right)
}

pub fn mul(left: impl IntoOperand, right: impl IntoOperand) -> Result<Operand> {
    arithmetic(left, ArithmeticOperator::Mul, right)
}

pub fn div(left: impl IntoOperand, right: impl IntoOperand) -> Result<Operand> {
    arithmetic(left, ArithmeticOperator::Div, right)
}

pub fn rem(left: impl IntoOperand, right: impl IntoOperand) -> Result<Operand> {
    arithmetic(left, ArithmeticOperator::Mod, right)
}

// =============================================================================
// Bitwise
// =============================================================================

fn bitwise(
    left: impl IntoOperand,
    op: BitwiseOperator,
    right: impl IntoOperand,
) -> Result<Operand> {
    Ok(Operand::Bitwise(BitwiseExpression {
        left: Box::new(left.into_operand("left")?),
        op,
        right: Box::new(right.into_operand("right")?),
    }))
}

pub fn bit_and(left: impl IntoOperand, right: impl IntoOperand) -> Result<Operand> {
    bitwise(left, BitwiseOperator::And, right)
}

pub fn bit_or(left: impl IntoOperand, right: impl IntoOperand) -> Result<Operand> {
    bitwise(left, BitwiseOperator::Or, right)
}

/// Bitwise XOR. Spelled `#` on Postgres, `^` on MySQL and MSSQL, emulated on SQLite.
pub fn bit_xor(left: impl IntoOperand, right: impl IntoOperand) -> Result<Operand> {
    bitwise(left, BitwiseOperator::Xor, right)
}

pub fn shift_left(left: impl IntoOperand, right: impl IntoOperand) -> Result<Operand> {
    bitwise(left, BitwiseOperator::ShiftLeft, right)
}

pub fn shift_right(left: impl IntoOperand, right: impl IntoOperand) -> Result<Operand> {
    bitwise(left, BitwiseOperator::ShiftRight, right)
}

// =============================================================================
// Numeric functions
// =============================================================================

pub fn abs(expr: impl IntoOperand) -> Result<Operand> {
    function("ABS", vec![expr.into_operand("expr")?])
}

pub fn round(expr: impl IntoOperand, digits: u32) -> Result<Operand> {
    function(
        "ROUND",
        vec![expr.into_operand("expr")?, Operand::literal(digits as i64)],
    )
}

pub fn ceil(expr: impl IntoOperand) -> Result<Operand> {
    function("CEIL", vec![expr.into_operand("expr")?])
}

pub fn floor(expr: impl IntoOperand) -> Result<Operand> {
    function("FLOOR", vec![expr.into_operand("expr")?])
}

pub fn power(base: impl IntoOperand, exponent: impl IntoOperand) -> Result<Operand> {
    function(
        "POWER",
        vec![
            base.into_operand("base")?,
            exponent.into_operand("exponent")?,
        ],
    )
}

/// Largest of the arguments (`MAX(a, b)` on SQLite).
pub fn greatest<I, T>(values: I) -> Result<Operand>
where
    I: IntoIterator<Item = T>,
    T: IntoOperand,
{
    function("GREATEST", operands("values", values)?)
}

pub fn least<I, T>(values: I) -> Result<Operand>
where
    I: IntoIterator<Item = T>,
    T: IntoOperand,
{
    function("LEAST", operands("values", values)?)
}

pub fn random() -> Operand {
    Operand::Function(crate::ast::FunctionCall::new("RANDOM", Vec::new()))
}

//! Date and time functions.

use crate::ast::{FunctionCall, Operand};
use crate::error::Result;

use super::{IntoOperand, function};

/// Current timestamp (`NOW()`, `CURRENT_TIMESTAMP`, `GETDATE()` per dialect).
pub fn now() -> Operand {
    Operand::Function(FunctionCall::new("NOW", Vec::new()))
}

pub fn current_date() -> Operand {
    Operand::Function(FunctionCall::new("CURRENT_DATE", Vec::new()))
}

/// EXTRACT(field FROM expr); `field` is e.g. `year`, `month`, `day`.
pub fn extract(field: &str, expr: impl IntoOperand) -> Result<Operand> {
    function(
        "EXTRACT",
        vec![Operand::literal(field), expr.into_operand("expr")?],
    )
}

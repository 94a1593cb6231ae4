//! CASE/WHEN expressions.
//!
//! ```ignore
//! use quarry_core::expr::*;
//!
//! case()
//!     .when(gt(col("age"), 65)?, "Senior")?
//!     .when(gt(col("age"), 18)?, "Adult")?
//!     .r#else("Minor")?
//! ```

use crate::ast::{CaseExpression, CaseWhen, Expression, Operand};
use crate::error::{QuarryError, Result};

use super::IntoOperand;

/// Start building a searched CASE expression.
pub fn case() -> CaseBuilder {
    CaseBuilder {
        conditions: Vec::new(),
    }
}

/// Accumulates WHEN branches; finish with [`CaseBuilder::end`] or
/// [`CaseBuilder::r#else`].
#[derive(Debug, Clone)]
pub struct CaseBuilder {
    conditions: Vec<CaseWhen>,
}

impl CaseBuilder {
    pub fn when(mut self, condition: Expression, then: impl IntoOperand) -> Result<Self> {
        self.conditions.push(CaseWhen {
            when: condition,
            then: then.into_operand("then")?,
        });
        Ok(self)
    }

    /// Finishes without an ELSE branch (unmatched rows yield NULL).
    pub fn end(self) -> Result<Operand> {
        self.finish(None)
    }

    /// Finishes with an ELSE branch.
    pub fn r#else(self, otherwise: impl IntoOperand) -> Result<Operand> {
        let otherwise = otherwise.into_operand("else")?;
        self.finish(Some(Box::new(otherwise)))
    }

    fn finish(self, else_: Option<Box<Operand>>) -> Result<Operand> {
        if self.conditions.is_empty() {
            return Err(QuarryError::invalid_operand(
                "conditions",
                "CASE requires at least one WHEN branch",
            ));
        }
        Ok(Operand::Case(CaseExpression {
            conditions: self.conditions,
            else_,
        }))
    }
}

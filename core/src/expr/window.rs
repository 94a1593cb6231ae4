//! Window functions and OVER clause support.
//!
//! ```ignore
//! use quarry_core::expr::*;
//!
//! // Pure window function
//! row_number().partition_by([col("dept")])?.order_by([OrderByItem::desc(col("salary"))]).build()
//! // → ROW_NUMBER() OVER (PARTITION BY "dept" ORDER BY "salary" DESC)
//!
//! // Aggregate as window function
//! over(sum(col("amount"))?)?.partition_by([col("account")])?.build()
//! ```

use crate::ast::{Operand, OrderByItem, WindowFunction};
use crate::error::{QuarryError, Result};

use super::{IntoOperand, operands};

/// Builder for a window function call and its `OVER (...)` specification.
#[derive(Debug, Clone)]
pub struct WindowBuilder {
    window: WindowFunction,
}

impl WindowBuilder {
    fn new(name: &str, args: Vec<Operand>) -> Self {
        Self {
            window: WindowFunction {
                name: name.to_owned(),
                args,
                partition_by: Vec::new(),
                order_by: Vec::new(),
            },
        }
    }

    /// Sets the PARTITION BY list.
    pub fn partition_by<I, T>(mut self, exprs: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: IntoOperand,
    {
        self.window.partition_by = operands("partition_by", exprs)?;
        Ok(self)
    }

    /// Sets the ORDER BY list inside the window.
    pub fn order_by(mut self, items: impl IntoIterator<Item = OrderByItem>) -> Self {
        self.window.order_by = items.into_iter().collect();
        self
    }

    pub fn build(self) -> Operand {
        Operand::WindowFunction(self.window)
    }
}

/// Turns an aggregate call (`SUM(x)`, `COUNT(*)`, ...) into a window function.
pub fn over(aggregate: Operand) -> Result<WindowBuilder> {
    match aggregate {
        Operand::Function(call) => {
            if call.distinct || call.separator.is_some() || !call.order_by.is_empty() {
                return Err(QuarryError::invalid_operand(
                    "aggregate",
                    "windowed aggregates cannot carry DISTINCT, ORDER BY or a separator",
                ));
            }
            Ok(WindowBuilder::new(&call.name, call.args))
        }
        _ => Err(QuarryError::invalid_operand(
            "aggregate",
            "only function calls can be windowed",
        )),
    }
}

pub fn row_number() -> WindowBuilder {
    WindowBuilder::new("ROW_NUMBER", Vec::new())
}

pub fn rank() -> WindowBuilder {
    WindowBuilder::new("RANK", Vec::new())
}

pub fn dense_rank() -> WindowBuilder {
    WindowBuilder::new("DENSE_RANK", Vec::new())
}

/// NTILE(n); `buckets` must be positive.
pub fn ntile(buckets: u32) -> Result<WindowBuilder> {
    if buckets == 0 {
        return Err(QuarryError::invalid_operand(
            "buckets",
            "NTILE requires at least one bucket",
        ));
    }
    Ok(WindowBuilder::new(
        "NTILE",
        vec![Operand::literal(buckets as i64)],
    ))
}

/// LAG(expr, offset).
pub fn lag(expr: impl IntoOperand, offset: u32) -> Result<WindowBuilder> {
    Ok(WindowBuilder::new(
        "LAG",
        vec![expr.into_operand("expr")?, Operand::literal(offset as i64)],
    ))
}

/// LEAD(expr, offset).
pub fn lead(expr: impl IntoOperand, offset: u32) -> Result<WindowBuilder> {
    Ok(WindowBuilder::new(
        "LEAD",
        vec![expr.into_operand("expr")?, Operand::literal(offset as i64)],
    ))
}

pub fn first_value(expr: impl IntoOperand) -> Result<WindowBuilder> {
    Ok(WindowBuilder::new(
        "FIRST_VALUE",
        vec![expr.into_operand("expr")?],
    ))
}

pub fn last_value(expr: impl IntoOperand) -> Result<WindowBuilder> {
    Ok(WindowBuilder::new(
        "LAST_VALUE",
        vec![expr.into_operand("expr")?],
    ))
}

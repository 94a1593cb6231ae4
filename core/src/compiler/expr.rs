//! Operand and expression rendering.

use super::dialect::XorStyle;
use super::functions::FunctionWriter;
use super::writer::SqlWriter;
use crate::ast::{
    BinaryExpression, BinaryOperator, BitwiseExpression, BitwiseOperator, CaseExpression,
    Expression, FunctionCall, InRight, LogicalOperator, Operand, WindowFunction, is_collation_name,
    is_type_name,
};
use crate::error::{QuarryError, Result};

/// Functions that only exist with an `OVER` clause.
const WINDOW_ONLY_FUNCTIONS: &[&str] = &[
    "ROW_NUMBER",
    "RANK",
    "DENSE_RANK",
    "PERCENT_RANK",
    "CUME_DIST",
    "NTILE",
    "LAG",
    "LEAD",
    "FIRST_VALUE",
    "LAST_VALUE",
    "NTH_VALUE",
];

impl SqlWriter<'_> {
    pub fn operand(&mut self, operand: &Operand) -> Result<()> {
        match operand {
            Operand::Literal { value } => self.literal(value),
            Operand::Column(col) => {
                self.qualified(col.qualifier(), &col.name);
                Ok(())
            }
            Operand::AliasRef { name } => {
                self.ident(name);
                Ok(())
            }
            Operand::Function(call) => {
                let dialect = self.dialect();
                let renderer = dialect.functions().resolve(&call.name).ok_or_else(|| {
                    QuarryError::UnsupportedFunction {
                        dialect: dialect.name(),
                        name: call.name.as_str().into(),
                    }
                })?;
                renderer(&mut FunctionWriter::new(self, call))
            }
            Operand::JsonPath(path) => {
                let dialect = self.dialect();
                dialect.json.render(self, path)
            }
            Operand::ScalarSubquery { query } => {
                self.push_char('(');
                self.select(query)?;
                self.push_char(')');
                Ok(())
            }
            Operand::Case(case) => self.case(case),
            Operand::Cast(cast) => {
                if !is_type_name(&cast.cast_type) {
                    return Err(QuarryError::invalid_operand(
                        "cast_type",
                        format!("`{}` is not a type name", cast.cast_type),
                    ));
                }
                self.push("CAST(");
                self.operand(&cast.expression)?;
                self.push(" AS ");
                self.push(&cast.cast_type);
                self.push_char(')');
                Ok(())
            }
            Operand::Collate(collate) => {
                if !is_collation_name(&collate.collation) {
                    return Err(QuarryError::invalid_operand(
                        "collation",
                        format!("`{}` is not a collation name", collate.collation),
                    ));
                }
                self.operand(&collate.expression)?;
                self.push(" COLLATE ");
                self.push(&collate.collation);
                Ok(())
            }
            Operand::WindowFunction(window) => self.window(window),
            Operand::Arithmetic(arith) => {
                self.push_char('(');
                self.operand(&arith.left)?;
                self.push_char(' ');
                self.push(arith.op.as_str());
                self.push_char(' ');
                self.operand(&arith.right)?;
                self.push_char(')');
                Ok(())
            }
            Operand::Bitwise(bitwise) => self.bitwise(bitwise),
            Operand::Excluded { column } => {
                if !self.in_excluded_scope() {
                    return Err(QuarryError::InvalidStatement(format!(
                        "excluded value `{column}` used outside an upsert update"
                    )));
                }
                let dialect = self.dialect();
                dialect.upsert.render_excluded(self, column)
            }
        }
    }

    fn case(&mut self, case: &CaseExpression) -> Result<()> {
        self.push("CASE");
        for branch in &case.conditions {
            self.push(" WHEN ");
            self.expression(&branch.when)?;
            self.push(" THEN ");
            self.operand(&branch.then)?;
        }
        if let Some(otherwise) = &case.else_ {
            self.push(" ELSE ");
            self.operand(otherwise)?;
        }
        self.push(" END");
        Ok(())
    }

    /// Ranking and offset functions render by name; anything else is an
    /// aggregate and goes through the dialect's function table.
    fn window(&mut self, window: &WindowFunction) -> Result<()> {
        let name = window.name.to_ascii_uppercase();
        if WINDOW_ONLY_FUNCTIONS.contains(&name.as_str()) {
            self.push(&name);
            self.push_char('(');
            self.comma_separated(&window.args, |w, arg| w.operand(arg))?;
            self.push_char(')');
        } else {
            let dialect = self.dialect();
            let renderer = dialect.functions().resolve(&window.name).ok_or_else(|| {
                QuarryError::UnsupportedFunction {
                    dialect: dialect.name(),
                    name: window.name.as_str().into(),
                }
            })?;
            let call = FunctionCall::new(window.name.clone(), window.args.clone());
            renderer(&mut FunctionWriter::new(self, &call))?;
        }
        self.push(" OVER (");
        if !window.partition_by.is_empty() {
            self.push("PARTITION BY ");
            self.comma_separated(&window.partition_by, |w, op| w.operand(op))?;
        }
        if !window.order_by.is_empty() {
            if !window.partition_by.is_empty() {
                self.push_char(' ');
            }
            self.push("ORDER BY ");
            self.order_items(&window.order_by)?;
        }
        self.push_char(')');
        Ok(())
    }

    fn bitwise(&mut self, expr: &BitwiseExpression) -> Result<()> {
        if expr.op == BitwiseOperator::Xor {
            match self.dialect().xor() {
                XorStyle::Caret => {}
                XorStyle::Hash => return self.bitwise_infix(expr, "#"),
                XorStyle::Emulated => {
                    // Each side is written twice, so its params are bound twice.
                    self.push("((");
                    self.operand(&expr.left)?;
                    self.push(" | ");
                    self.operand(&expr.right)?;
                    self.push(") & ~(");
                    self.operand(&expr.left)?;
                    self.push(" & ");
                    self.operand(&expr.right)?;
                    self.push("))");
                    return Ok(());
                }
            }
        }
        self.bitwise_infix(expr, expr.op.as_str())
    }

    fn bitwise_infix(&mut self, expr: &BitwiseExpression, op: &str) -> Result<()> {
        self.push_char('(');
        self.operand(&expr.left)?;
        self.push_char(' ');
        self.push(op);
        self.push_char(' ');
        self.operand(&expr.right)?;
        self.push_char(')');
        Ok(())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn expression(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Binary(binary) => self.binary(binary),
            Expression::Logical(logical) => {
                if logical.operands.is_empty() {
                    self.push(match logical.operator {
                        LogicalOperator::And => "1 = 1",
                        LogicalOperator::Or => "1 = 0",
                    });
                    return Ok(());
                }
                if logical.operands.len() == 1 {
                    return self.expression(&logical.operands[0]);
                }
                self.push_char('(');
                for (i, operand) in logical.operands.iter().enumerate() {
                    if i > 0 {
                        self.push_char(' ');
                        self.push(logical.operator.as_str());
                        self.push_char(' ');
                    }
                    self.expression(operand)?;
                }
                self.push_char(')');
                Ok(())
            }
            Expression::Not { operand } => {
                self.push("NOT (");
                self.expression(operand)?;
                self.push_char(')');
                Ok(())
            }
            Expression::Null(null) => {
                self.operand(&null.operand)?;
                self.push(if null.negated {
                    " IS NOT NULL"
                } else {
                    " IS NULL"
                });
                Ok(())
            }
            Expression::In(in_expr) => match &in_expr.right {
                InRight::List(values) if values.is_empty() => {
                    self.push(if in_expr.negated { "1 = 1" } else { "1 = 0" });
                    Ok(())
                }
                InRight::List(values) => {
                    self.operand(&in_expr.left)?;
                    self.push(if in_expr.negated { " NOT IN (" } else { " IN (" });
                    self.comma_separated(values, |w, value| w.operand(value))?;
                    self.push_char(')');
                    Ok(())
                }
                InRight::Subquery(query) => {
                    self.operand(&in_expr.left)?;
                    self.push(if in_expr.negated { " NOT IN (" } else { " IN (" });
                    self.select(query)?;
                    self.push_char(')');
                    Ok(())
                }
            },
            Expression::Exists(exists) => {
                self.push(if exists.negated {
                    "NOT EXISTS ("
                } else {
                    "EXISTS ("
                });
                self.select(&exists.query)?;
                self.push_char(')');
                Ok(())
            }
            Expression::Between(between) => {
                self.operand(&between.operand)?;
                self.push(if between.negated {
                    " NOT BETWEEN "
                } else {
                    " BETWEEN "
                });
                self.operand(&between.low)?;
                self.push(" AND ");
                self.operand(&between.high)?;
                Ok(())
            }
        }
    }

    fn binary(&mut self, binary: &BinaryExpression) -> Result<()> {
        if binary.op.is_case_insensitive() && !self.dialect().capabilities().ilike {
            self.push("LOWER(");
            self.operand(&binary.left)?;
            self.push(if binary.op == BinaryOperator::ILike {
                ") LIKE LOWER("
            } else {
                ") NOT LIKE LOWER("
            });
            self.operand(&binary.right)?;
            self.push_char(')');
            return Ok(());
        }
        self.operand(&binary.left)?;
        self.push_char(' ');
        self.push(binary.op.as_str());
        self.push_char(' ');
        self.operand(&binary.right)
    }
}

//! Root-column qualification for queries that carry include joins.
//!
//! Only the outer query scope is rewritten. Subqueries keep their own
//! unqualified columns, which resolve against their own FROM.

use crate::ast::{Expression, InRight, Operand, OrderByItem, SelectItem, SelectQuery};
use crate::schema::TableDef;

pub(crate) struct RootQualifier<'a> {
    table: &'a TableDef,
}

impl<'a> RootQualifier<'a> {
    pub(crate) fn new(table: &'a TableDef) -> Self {
        Self { table }
    }

    /// Qualifies every clause of `query` except CTE bodies and set-op branches.
    pub(crate) fn query(&self, query: &mut SelectQuery) {
        for item in &mut query.columns {
            self.select_item(item);
        }
        if let Some(condition) = &mut query.where_ {
            self.expression(condition);
        }
        for op in &mut query.group_by {
            self.operand(op);
        }
        if let Some(condition) = &mut query.having {
            self.expression(condition);
        }
        self.order_items(&mut query.order_by);
    }

    fn select_item(&self, item: &mut SelectItem) {
        self.operand(&mut item.expr);
    }

    pub(crate) fn order_items(&self, items: &mut [OrderByItem]) {
        for item in items {
            self.operand(&mut item.expr);
        }
    }

    pub(crate) fn expression(&self, expr: &mut Expression) {
        match expr {
            Expression::Binary(binary) => {
                self.operand(&mut binary.left);
                self.operand(&mut binary.right);
            }
            Expression::Logical(logical) => {
                for operand in &mut logical.operands {
                    self.expression(operand);
                }
            }
            Expression::Not { operand } => self.expression(operand),
            Expression::Null(null) => self.operand(&mut null.operand),
            Expression::In(in_expr) => {
                self.operand(&mut in_expr.left);
                if let InRight::List(values) = &mut in_expr.right {
                    for value in values {
                        self.operand(value);
                    }
                }
            }
            Expression::Exists(_) => {}
            Expression::Between(between) => {
                self.operand(&mut between.operand);
                self.operand(&mut between.low);
                self.operand(&mut between.high);
            }
        }
    }

    pub(crate) fn operand(&self, operand: &mut Operand) {
        match operand {
            Operand::Column(column) => {
                if column.qualifier().is_none() && self.table.has_column(&column.name) {
                    column.table = Some(self.table.name.clone());
                }
            }
            Operand::JsonPath(path) => {
                let column = &mut path.column;
                if column.qualifier().is_none() && self.table.has_column(&column.name) {
                    column.table = Some(self.table.name.clone());
                }
            }
            Operand::Function(call) => {
                for arg in &mut call.args {
                    self.operand(arg);
                }
                self.order_items(&mut call.order_by);
            }
            Operand::Case(case) => {
                for branch in &mut case.conditions {
                    self.expression(&mut branch.when);
                    self.operand(&mut branch.then);
                }
                if let Some(otherwise) = &mut case.else_ {
                    self.operand(otherwise);
                }
            }
            Operand::Cast(cast) => self.operand(&mut cast.expression),
            Operand::Collate(collate) => self.operand(&mut collate.expression),
            Operand::WindowFunction(window) => {
                for op in window.args.iter_mut().chain(&mut window.partition_by) {
                    self.operand(op);
                }
                self.order_items(&mut window.order_by);
            }
            Operand::Arithmetic(arith) => {
                self.operand(&mut arith.left);
                self.operand(&mut arith.right);
            }
            Operand::Bitwise(bitwise) => {
                self.operand(&mut bitwise.left);
                self.operand(&mut bitwise.right);
            }
            Operand::Literal { .. }
            | Operand::AliasRef { .. }
            | Operand::ScalarSubquery { .. }
            | Operand::Excluded { .. } => {}
        }
    }
}

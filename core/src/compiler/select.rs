//! SELECT assembly.
//!
//! Clause order: CTE prefix, DISTINCT, projection, FROM and joins, WHERE,
//! GROUP BY, HAVING, ORDER BY, pagination. Compound queries hand the
//! branches to the set-operation strategy and apply ORDER BY and
//! pagination to the compound result only.

use super::strategy::Page;
use super::writer::SqlWriter;
use crate::ast::{Distinct, OrderByItem, SelectQuery};
use crate::error::{QuarryError, Result};

impl SqlWriter<'_> {
    /// Writes a complete SELECT, including CTEs, ordering and pagination.
    pub fn select(&mut self, query: &SelectQuery) -> Result<()> {
        let dialect = self.dialect();
        if !query.ctes.is_empty() {
            dialect.ctes.render(self, &query.ctes)?;
        }
        if query.set_ops.is_empty() {
            self.select_core(query)?;
        } else {
            dialect.set_operations.render(self, query, &query.set_ops)?;
        }
        dialect.ordering.render_order_by(self, &query.order_by)?;
        if query.limit.is_some() || query.offset.is_some() {
            dialect.pagination.render(
                self,
                Page {
                    limit: query.limit,
                    offset: query.offset,
                    ordered: !query.order_by.is_empty(),
                },
            )?;
        }
        Ok(())
    }

    /// Writes `SELECT ... FROM ... WHERE ... GROUP BY ... HAVING ...`,
    /// ignoring CTEs, compound branches, ordering and pagination.
    pub fn select_core(&mut self, query: &SelectQuery) -> Result<()> {
        let dialect = self.dialect();
        self.push("SELECT ");
        match &query.distinct {
            None => {}
            Some(Distinct::All) => self.push("DISTINCT "),
            Some(Distinct::On(exprs)) => {
                if !dialect.capabilities().distinct_on {
                    return Err(QuarryError::unsupported(dialect.name(), "DISTINCT ON"));
                }
                self.push("DISTINCT ON (");
                self.comma_separated(exprs, |w, expr| w.operand(expr))?;
                self.push(") ");
            }
        }

        if query.columns.is_empty() {
            self.push_char('*');
        } else {
            self.comma_separated(&query.columns, |w, item| {
                w.operand(&item.expr)?;
                if let Some(alias) = item.effective_alias() {
                    w.push(" AS ");
                    w.ident(alias);
                }
                Ok(())
            })?;
        }

        if let Some(from) = &query.from {
            self.push(" FROM ");
            self.source(from)?;
        } else if !query.joins.is_empty() {
            return Err(QuarryError::InvalidStatement(
                "joins require a FROM source".into(),
            ));
        }
        for join in &query.joins {
            dialect.joins.render(self, join)?;
        }

        if let Some(filter) = &query.where_ {
            self.push(" WHERE ");
            self.expression(filter)?;
        }
        dialect.ordering.render_group_by(self, &query.group_by)?;
        if let Some(having) = &query.having {
            self.push(" HAVING ");
            self.expression(having)?;
        }
        Ok(())
    }

    /// Comma-separated ordering items through the dialect's ordering strategy.
    pub fn order_items(&mut self, items: &[OrderByItem]) -> Result<()> {
        let dialect = self.dialect();
        self.comma_separated(items, |w, item| dialect.ordering.render_item(w, item))
    }
}

//! Pluggable strategies the shared pipeline calls through.
//!
//! Each trait is one small capability with a default rendering; a dialect
//! swaps in its own value where its syntax differs. Implementations receive
//! the [`SqlWriter`] and call back into it for anything nested.

use core::fmt::Debug;

use super::writer::SqlWriter;
use crate::ast::{
    ConflictAction, ConflictTarget, Cte, InsertQuery, Join, JoinKind, JsonPath, NullsOrder,
    OnConflict, OrderByItem, Returning, SelectQuery, SetOperation, TableFunction,
};
use crate::error::{QuarryError, Result};

/// Which DML statement a RETURNING/OUTPUT clause belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmlKind {
    Insert,
    Update,
    Delete,
}

// =============================================================================
// Pagination
// =============================================================================

/// Row window requested by a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Whether an ORDER BY has already been written
    pub ordered: bool,
}

pub trait PaginationStrategy: Debug + Send + Sync {
    fn render(&self, w: &mut SqlWriter<'_>, page: Page) -> Result<()>;
}

/// `LIMIT n [OFFSET m]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitOffset {
    offset_only_limit: Option<&'static str>,
}

impl LimitOffset {
    pub const fn new() -> Self {
        Self {
            offset_only_limit: None,
        }
    }

    /// Limit written when only an offset is requested, for dialects whose
    /// grammar has no bare OFFSET.
    pub const fn offset_only_limit(limit: &'static str) -> Self {
        Self {
            offset_only_limit: Some(limit),
        }
    }
}

impl PaginationStrategy for LimitOffset {
    fn render(&self, w: &mut SqlWriter<'_>, page: Page) -> Result<()> {
        match (page.limit, self.offset_only_limit) {
            (Some(limit), _) => {
                w.push(" LIMIT ");
                w.push_number(limit);
            }
            (None, Some(fallback)) if page.offset.is_some() => {
                w.push(" LIMIT ");
                w.push(fallback);
            }
            _ => {}
        }
        if let Some(offset) = page.offset {
            w.push(" OFFSET ");
            w.push_number(offset);
        }
        Ok(())
    }
}

// =============================================================================
// CTEs
// =============================================================================

pub trait CteStrategy: Debug + Send + Sync {
    /// Writes the `WITH ...` prefix, followed by a trailing space.
    fn render(&self, w: &mut SqlWriter<'_>, ctes: &[Cte]) -> Result<()>;
}

/// `WITH [RECURSIVE] name (cols) AS (...)`.
#[derive(Debug, Clone, Copy)]
pub struct StandardCte {
    recursive_keyword: bool,
}

impl StandardCte {
    pub const fn new() -> Self {
        Self {
            recursive_keyword: true,
        }
    }

    /// For dialects where recursion is implicit and `RECURSIVE` is a syntax error.
    pub const fn without_recursive_keyword() -> Self {
        Self {
            recursive_keyword: false,
        }
    }
}

impl Default for StandardCte {
    fn default() -> Self {
        Self::new()
    }
}

impl CteStrategy for StandardCte {
    fn render(&self, w: &mut SqlWriter<'_>, ctes: &[Cte]) -> Result<()> {
        if ctes.is_empty() {
            return Ok(());
        }
        w.push("WITH ");
        if self.recursive_keyword && ctes.iter().any(|cte| cte.recursive) {
            w.push("RECURSIVE ");
        }
        w.comma_separated(ctes, |w, cte| {
            w.ident(&cte.name);
            if !cte.columns.is_empty() {
                w.push_char(' ');
                w.ident_list(&cte.columns);
            }
            w.push(" AS (");
            w.select(&cte.query)?;
            w.push_char(')');
            Ok(())
        })?;
        w.push_char(' ');
        Ok(())
    }
}

// =============================================================================
// Joins
// =============================================================================

pub trait JoinStrategy: Debug + Send + Sync {
    /// Writes one join, preceded by a space.
    fn render(&self, w: &mut SqlWriter<'_>, join: &Join) -> Result<()>;
}

/// `{KIND} JOIN source ON condition`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardJoins;

impl JoinStrategy for StandardJoins {
    fn render(&self, w: &mut SqlWriter<'_>, join: &Join) -> Result<()> {
        if join.kind == JoinKind::Full && !w.dialect().capabilities().full_outer_join {
            return Err(QuarryError::unsupported(
                w.dialect().name(),
                "FULL OUTER JOIN",
            ));
        }
        w.push_char(' ');
        w.push(join.kind.as_str());
        w.push_char(' ');
        w.source(&join.source)?;
        match (&join.on, join.kind) {
            (Some(on), _) => {
                w.push(" ON ");
                w.expression(on)
            }
            (None, JoinKind::Cross) => Ok(()),
            (None, kind) => Err(QuarryError::InvalidStatement(format!(
                "{} requires an ON condition",
                kind.as_str()
            ))),
        }
    }
}

// =============================================================================
// GROUP BY / ORDER BY
// =============================================================================

pub trait OrderingStrategy: Debug + Send + Sync {
    /// Writes one ordering item (without a separator).
    fn render_item(&self, w: &mut SqlWriter<'_>, item: &OrderByItem) -> Result<()>;

    /// Writes ` GROUP BY ...` when `items` is non-empty.
    fn render_group_by(&self, w: &mut SqlWriter<'_>, items: &[crate::ast::Operand]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        w.push(" GROUP BY ");
        w.comma_separated(items, |w, item| w.operand(item))
    }

    /// Writes ` ORDER BY ...` when `items` is non-empty.
    fn render_order_by(&self, w: &mut SqlWriter<'_>, items: &[OrderByItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        w.push(" ORDER BY ");
        w.order_items(items)
    }
}

/// Orders with `expr DIR [NULLS FIRST|LAST]`, or emulates NULL placement
/// with a leading `CASE WHEN expr IS NULL ...` key.
#[derive(Debug, Clone, Copy)]
pub struct StandardOrdering {
    emulate_nulls: bool,
}

impl StandardOrdering {
    pub const fn native() -> Self {
        Self {
            emulate_nulls: false,
        }
    }

    pub const fn emulated_nulls() -> Self {
        Self {
            emulate_nulls: true,
        }
    }
}

impl OrderingStrategy for StandardOrdering {
    fn render_item(&self, w: &mut SqlWriter<'_>, item: &OrderByItem) -> Result<()> {
        match (item.nulls, self.emulate_nulls) {
            (Some(nulls), true) => {
                w.push("CASE WHEN ");
                w.operand(&item.expr)?;
                w.push(match nulls {
                    NullsOrder::First => " IS NULL THEN 0 ELSE 1 END, ",
                    NullsOrder::Last => " IS NULL THEN 1 ELSE 0 END, ",
                });
                w.operand(&item.expr)?;
                w.push_char(' ');
                w.push(item.direction.as_str());
            }
            (nulls, _) => {
                w.operand(&item.expr)?;
                w.push_char(' ');
                w.push(item.direction.as_str());
                match nulls {
                    Some(NullsOrder::First) => w.push(" NULLS FIRST"),
                    Some(NullsOrder::Last) => w.push(" NULLS LAST"),
                    None => {}
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// RETURNING
// =============================================================================

pub trait ReturningStrategy: Debug + Send + Sync {
    /// Clause written between the target and the row source (OUTPUT style).
    fn render_inline(
        &self,
        _w: &mut SqlWriter<'_>,
        _returning: &Returning,
        _kind: DmlKind,
    ) -> Result<()> {
        Ok(())
    }

    /// Clause written at the very end of the statement.
    fn render_trailing(
        &self,
        w: &mut SqlWriter<'_>,
        returning: &Returning,
        _kind: DmlKind,
    ) -> Result<()> {
        if returning.is_none() {
            return Ok(());
        }
        Err(QuarryError::unsupported(w.dialect().name(), "RETURNING"))
    }
}

/// No RETURNING support: any requested projection is a capability error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReturning;

impl ReturningStrategy for NoReturning {}

/// ` RETURNING *` / ` RETURNING "a", "b"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingReturning;

impl ReturningStrategy for TrailingReturning {
    fn render_trailing(
        &self,
        w: &mut SqlWriter<'_>,
        returning: &Returning,
        _kind: DmlKind,
    ) -> Result<()> {
        match returning {
            Returning::None => {}
            Returning::All => w.push(" RETURNING *"),
            Returning::Columns(columns) => {
                w.push(" RETURNING ");
                w.comma_separated(columns, |w, column| {
                    w.ident(column);
                    Ok(())
                })?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Upsert
// =============================================================================

pub trait UpsertStrategy: Debug + Send + Sync {
    /// Compiles a whole INSERT that carries a conflict clause, including any
    /// RETURNING projection.
    fn compile(
        &self,
        w: &mut SqlWriter<'_>,
        insert: &InsertQuery,
        conflict: &OnConflict,
    ) -> Result<()>;

    /// Writes the proposed row's value for `column`.
    fn render_excluded(&self, w: &mut SqlWriter<'_>, column: &str) -> Result<()>;
}

/// `ON CONFLICT (...) DO NOTHING | DO UPDATE SET ... [WHERE ...]`.
#[derive(Debug, Clone, Copy)]
pub struct OnConflictUpsert {
    named_constraints: bool,
}

impl OnConflictUpsert {
    pub const fn new() -> Self {
        Self {
            named_constraints: true,
        }
    }

    /// Rejects `ON CONFLICT ON CONSTRAINT name` targets.
    pub const fn without_named_constraints() -> Self {
        Self {
            named_constraints: false,
        }
    }
}

impl Default for OnConflictUpsert {
    fn default() -> Self {
        Self::new()
    }
}

impl UpsertStrategy for OnConflictUpsert {
    fn compile(
        &self,
        w: &mut SqlWriter<'_>,
        insert: &InsertQuery,
        conflict: &OnConflict,
    ) -> Result<()> {
        let dialect = w.dialect();
        w.insert_head(insert)?;
        w.push(" ON CONFLICT ");
        match &conflict.target {
            None => {
                return Err(QuarryError::MissingConflictTarget {
                    dialect: dialect.name(),
                });
            }
            Some(ConflictTarget::Columns(columns)) if columns.is_empty() => {
                return Err(QuarryError::MissingConflictTarget {
                    dialect: dialect.name(),
                });
            }
            Some(ConflictTarget::Columns(columns)) => w.ident_list(columns),
            Some(ConflictTarget::Constraint(name)) => {
                if !self.named_constraints {
                    return Err(QuarryError::NamedConstraintUnsupported {
                        dialect: dialect.name(),
                    });
                }
                w.push("ON CONSTRAINT ");
                w.ident(name);
            }
        }
        match &conflict.action {
            ConflictAction::DoNothing => w.push(" DO NOTHING"),
            ConflictAction::DoUpdate { set, where_ } => {
                w.push(" DO UPDATE SET ");
                w.set_excluded_scope(true);
                w.assignments(set)?;
                if let Some(filter) = where_ {
                    w.push(" WHERE ");
                    w.expression(filter)?;
                }
                w.set_excluded_scope(false);
            }
        }
        dialect
            .returning
            .render_trailing(w, &insert.returning, DmlKind::Insert)
    }

    fn render_excluded(&self, w: &mut SqlWriter<'_>, column: &str) -> Result<()> {
        w.push("EXCLUDED.");
        w.ident(column);
        Ok(())
    }
}

// =============================================================================
// JSON paths
// =============================================================================

pub trait JsonStrategy: Debug + Send + Sync {
    fn render(&self, w: &mut SqlWriter<'_>, path: &JsonPath) -> Result<()>;
}

/// `function(column, '$.a.b')`, e.g. `JSON_VALUE` or `json_extract`.
#[derive(Debug, Clone, Copy)]
pub struct FunctionJson {
    function: &'static str,
}

impl FunctionJson {
    pub const fn new(function: &'static str) -> Self {
        Self { function }
    }
}

impl JsonStrategy for FunctionJson {
    fn render(&self, w: &mut SqlWriter<'_>, path: &JsonPath) -> Result<()> {
        w.push(self.function);
        w.push_char('(');
        w.qualified(path.column.qualifier(), &path.column.name);
        w.push(", ");
        w.string_literal(&dollar_path(path));
        w.push_char(')');
        Ok(())
    }
}

/// `$.a.b` form of a path, whatever form it was written in.
pub fn dollar_path(path: &JsonPath) -> String {
    let mut out = String::from("$");
    for segment in path.segments() {
        out.push('.');
        out.push_str(segment);
    }
    out
}

// =============================================================================
// Table functions
// =============================================================================

pub trait TableFunctionFormatter: Debug + Send + Sync {
    fn render(&self, w: &mut SqlWriter<'_>, func: &TableFunction) -> Result<()>;
}

/// `name(args) [WITH ORDINALITY] AS "alias" ("c1", "c2")`.
#[derive(Debug, Clone, Copy)]
pub struct StandardTableFunctions {
    ordinality: bool,
}

impl StandardTableFunctions {
    pub const fn new() -> Self {
        Self { ordinality: false }
    }

    pub const fn with_ordinality() -> Self {
        Self { ordinality: true }
    }
}

impl Default for StandardTableFunctions {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFunctionFormatter for StandardTableFunctions {
    fn render(&self, w: &mut SqlWriter<'_>, func: &TableFunction) -> Result<()> {
        if func.with_ordinality && !self.ordinality {
            return Err(QuarryError::unsupported(
                w.dialect().name(),
                "WITH ORDINALITY",
            ));
        }
        w.push(&func.name);
        w.push_char('(');
        w.comma_separated(&func.args, |w, arg| w.operand(arg))?;
        w.push_char(')');
        if func.with_ordinality {
            w.push(" WITH ORDINALITY");
        }
        w.push(" AS ");
        w.ident(&func.alias);
        if !func.column_aliases.is_empty() {
            w.push_char(' ');
            w.ident_list(&func.column_aliases);
        }
        Ok(())
    }
}

// =============================================================================
// Set operations
// =============================================================================

pub trait SetOperationStrategy: Debug + Send + Sync {
    /// Writes `head` and every branch of a compound query, without the
    /// compound-level ORDER BY and pagination.
    fn render(
        &self,
        w: &mut SqlWriter<'_>,
        head: &SelectQuery,
        branches: &[SetOperation],
    ) -> Result<()>;
}

/// `(SELECT ...) UNION (SELECT ...)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParenthesizedSetOperations;

impl SetOperationStrategy for ParenthesizedSetOperations {
    fn render(
        &self,
        w: &mut SqlWriter<'_>,
        head: &SelectQuery,
        branches: &[SetOperation],
    ) -> Result<()> {
        w.push_char('(');
        w.select_core(head)?;
        w.push_char(')');
        for branch in branches {
            w.push_char(' ');
            w.push(branch.op.as_str());
            w.push(" (");
            w.select(&branch.query)?;
            w.push_char(')');
        }
        Ok(())
    }
}

/// `SELECT ... UNION SELECT ...` for grammars that reject parenthesized
/// compound members. A branch that needs its own ORDER BY, pagination, CTEs
/// or nested compound cannot be expressed this way.
#[derive(Debug, Clone, Copy, Default)]
pub struct BareSetOperations;

impl SetOperationStrategy for BareSetOperations {
    fn render(
        &self,
        w: &mut SqlWriter<'_>,
        head: &SelectQuery,
        branches: &[SetOperation],
    ) -> Result<()> {
        w.select_core(head)?;
        for branch in branches {
            let query = &branch.query;
            if !query.order_by.is_empty()
                || query.limit.is_some()
                || query.offset.is_some()
                || !query.ctes.is_empty()
                || !query.set_ops.is_empty()
            {
                return Err(QuarryError::unsupported(
                    w.dialect().name(),
                    "ORDER BY, LIMIT, WITH or nested set operations inside a compound branch",
                ));
            }
            w.push_char(' ');
            w.push(branch.op.as_str());
            w.push_char(' ');
            w.select_core(query)?;
        }
        Ok(())
    }
}

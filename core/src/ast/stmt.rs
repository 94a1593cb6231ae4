//! Statement nodes.

use serde::{Deserialize, Serialize};

use super::expr::Expression;
use super::operand::Operand;

/// A whole statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    Select(SelectQuery),
    Insert(InsertQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
    Call(CallQuery),
}

impl From<SelectQuery> for Statement {
    fn from(value: SelectQuery) -> Self {
        Statement::Select(value)
    }
}

impl From<InsertQuery> for Statement {
    fn from(value: InsertQuery) -> Self {
        Statement::Insert(value)
    }
}

impl From<UpdateQuery> for Statement {
    fn from(value: UpdateQuery) -> Self {
        Statement::Update(value)
    }
}

impl From<DeleteQuery> for Statement {
    fn from(value: DeleteQuery) -> Self {
        Statement::Delete(value)
    }
}

impl From<CallQuery> for Statement {
    fn from(value: CallQuery) -> Self {
        Statement::Call(value)
    }
}

// =============================================================================
// Sources
// =============================================================================

/// A named table, optionally schema-qualified and aliased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..Self::new(name)
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// The name other clauses use to qualify this table's columns.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A set-returning function used as a FROM source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFunction {
    pub name: String,
    pub args: Vec<Operand>,
    pub alias: String,
    #[serde(default)]
    pub column_aliases: Vec<String>,
    #[serde(default)]
    pub with_ordinality: bool,
}

/// Anything that can stand in a FROM or JOIN position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableSource {
    Table(TableRef),
    Subquery {
        query: Box<SelectQuery>,
        alias: String,
    },
    Function(TableFunction),
}

impl TableSource {
    pub fn table(name: impl Into<String>) -> Self {
        TableSource::Table(TableRef::new(name))
    }

    pub fn reference_name(&self) -> &str {
        match self {
            TableSource::Table(table) => table.reference_name(),
            TableSource::Subquery { alias, .. } => alias,
            TableSource::Function(func) => &func.alias,
        }
    }
}

impl From<TableRef> for TableSource {
    fn from(value: TableRef) -> Self {
        TableSource::Table(value)
    }
}

// =============================================================================
// SELECT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub kind: JoinKind,
    pub source: TableSource,
    /// Absent only for CROSS JOIN
    #[serde(default)]
    pub on: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByItem {
    pub expr: Operand,
    pub direction: SortDirection,
    #[serde(default)]
    pub nulls: Option<NullsOrder>,
}

impl OrderByItem {
    pub fn asc(expr: impl Into<Operand>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortDirection::Asc,
            nulls: None,
        }
    }

    pub fn desc(expr: impl Into<Operand>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortDirection::Desc,
            nulls: None,
        }
    }

    pub fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

/// One projected column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectItem {
    pub expr: Operand,
    #[serde(default)]
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn new(expr: impl Into<Operand>) -> Self {
        Self {
            expr: expr.into(),
            alias: None,
        }
    }

    pub fn aliased(expr: impl Into<Operand>, alias: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            alias: Some(alias.into()),
        }
    }

    /// The alias rendered with `AS`, from the item or from its column.
    pub fn effective_alias(&self) -> Option<&str> {
        self.alias.as_deref().or_else(|| self.expr.output_alias())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Distinct {
    All,
    On(Vec<Operand>),
}

/// A named sub-query in a WITH clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cte {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    pub query: Box<SelectQuery>,
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    Except,
}

impl SetOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            SetOperator::Union => "UNION",
            SetOperator::UnionAll => "UNION ALL",
            SetOperator::Intersect => "INTERSECT",
            SetOperator::Except => "EXCEPT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOperation {
    pub op: SetOperator,
    pub query: Box<SelectQuery>,
}

/// A SELECT statement.
///
/// When `set_ops` is non-empty, `order_by`/`limit`/`offset` apply to the
/// compound result, never to the first branch alone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectQuery {
    pub columns: Vec<SelectItem>,
    pub from: Option<TableSource>,
    #[serde(default)]
    pub joins: Vec<Join>,
    #[serde(default, rename = "where")]
    pub where_: Option<Expression>,
    #[serde(default)]
    pub group_by: Vec<Operand>,
    #[serde(default)]
    pub having: Option<Expression>,
    #[serde(default)]
    pub order_by: Vec<OrderByItem>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub ctes: Vec<Cte>,
    #[serde(default)]
    pub set_ops: Vec<SetOperation>,
    #[serde(default)]
    pub distinct: Option<Distinct>,
}

impl SelectQuery {
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            from: Some(TableSource::table(table)),
            ..Self::default()
        }
    }
}

// =============================================================================
// INSERT / UPDATE / DELETE
// =============================================================================

/// Column assignment in `SET` or an upsert update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub column: String,
    pub value: Operand,
}

impl Assignment {
    pub fn new(column: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Returning {
    #[default]
    None,
    All,
    Columns(Vec<String>),
}

impl Returning {
    pub fn is_none(&self) -> bool {
        matches!(self, Returning::None)
    }
}

/// An INSERT source: VALUES rows or a SELECT, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsertSource {
    Values(Vec<Vec<Operand>>),
    Select(Box<SelectQuery>),
    DefaultValues,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictTarget {
    Columns(Vec<String>),
    Constraint(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConflictAction {
    DoNothing,
    DoUpdate {
        set: Vec<Assignment>,
        #[serde(default, rename = "where")]
        where_: Option<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnConflict {
    #[serde(default)]
    pub target: Option<ConflictTarget>,
    pub action: ConflictAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertQuery {
    pub into: TableRef,
    pub columns: Vec<String>,
    pub source: InsertSource,
    #[serde(default)]
    pub on_conflict: Option<OnConflict>,
    #[serde(default)]
    pub returning: Returning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateQuery {
    pub table: TableRef,
    pub set: Vec<Assignment>,
    #[serde(default, rename = "where")]
    pub where_: Option<Expression>,
    #[serde(default)]
    pub returning: Returning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteQuery {
    pub from: TableRef,
    #[serde(default, rename = "where")]
    pub where_: Option<Expression>,
    #[serde(default)]
    pub returning: Returning,
}

/// A stored procedure invocation; `procedure` may be schema-qualified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallQuery {
    pub procedure: TableRef,
    #[serde(default)]
    pub args: Vec<Operand>,
}

//! Value-producing nodes.

use serde::{Deserialize, Serialize};

use super::expr::Expression;
use super::stmt::{OrderByItem, SelectQuery};
use crate::value::Value;

/// A value-producing node.
///
/// This is a closed set: every match over it is exhaustive, so adding a
/// variant is a compile-time checklist across the builders and the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operand {
    /// Bound as a parameter, never inlined
    Literal { value: Value },
    Column(ColumnRef),
    /// Reference to a projection alias (`ORDER BY "total"`)
    AliasRef { name: String },
    Function(FunctionCall),
    JsonPath(JsonPath),
    ScalarSubquery { query: Box<SelectQuery> },
    Case(CaseExpression),
    Cast(Cast),
    Collate(Collate),
    WindowFunction(WindowFunction),
    Arithmetic(ArithmeticExpression),
    Bitwise(BitwiseExpression),
    /// The proposed row's value inside an upsert update assignment
    Excluded { column: String },
}

impl Operand {
    pub fn literal(value: impl Into<Value>) -> Self {
        Operand::Literal {
            value: value.into(),
        }
    }

    /// Output alias attached to a column reference, if any.
    pub fn output_alias(&self) -> Option<&str> {
        match self {
            Operand::Column(col) => col.alias.as_deref(),
            _ => None,
        }
    }
}

impl From<ColumnRef> for Operand {
    fn from(value: ColumnRef) -> Self {
        Operand::Column(value)
    }
}

/// A column reference.
///
/// `scope` overrides `table` as the qualifier, for columns read through a join
/// or CTE alias rather than the base table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
            alias: None,
            scope: None,
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::new(name)
        }
    }

    /// Projects this column as `alias`.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Reads this column through the given source alias.
    pub fn scoped(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// The qualifier rendered in front of the column name.
    pub fn qualifier(&self) -> Option<&str> {
        self.scope.as_deref().or(self.table.as_deref())
    }

    /// The key under which this column shows up in a result row.
    pub fn result_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A scalar or aggregate function call, rendered through the dialect's
/// function table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Operand>,
    #[serde(default)]
    pub order_by: Vec<OrderByItem>,
    #[serde(default)]
    pub separator: Option<String>,
    #[serde(default)]
    pub distinct: bool,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Vec<Operand>) -> Self {
        Self {
            name: name.into(),
            args,
            order_by: Vec::new(),
            separator: None,
            distinct: false,
        }
    }
}

/// Extraction of a scalar at `path` (dot-separated) inside a JSON column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonPath {
    pub column: ColumnRef,
    pub path: String,
}

impl JsonPath {
    /// Path segments, ignoring a leading `$` and empty segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path
            .split('.')
            .filter(|segment| !segment.is_empty() && *segment != "$")
    }
}

/// Searched `CASE WHEN ... THEN ... [ELSE ...] END`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseExpression {
    pub conditions: Vec<CaseWhen>,
    #[serde(default)]
    pub else_: Option<Box<Operand>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseWhen {
    pub when: Expression,
    pub then: Operand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cast {
    pub expression: Box<Operand>,
    pub cast_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collate {
    pub expression: Box<Operand>,
    pub collation: String,
}

/// Whether `name` is a plain type name: words joined by single spaces, each
/// optionally followed by `(n)`, `(n, m)` or `(max)`, with an optional
/// trailing `[]`. Cast types are written into the SQL as is.
pub fn is_type_name(name: &str) -> bool {
    let mut rest = name.strip_suffix("[]").unwrap_or(name);
    loop {
        let word = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        if !is_identifier(&rest[..word]) {
            return false;
        }
        rest = &rest[word..];
        if let Some(inner) = rest.strip_prefix('(') {
            let Some(close) = inner.find(')') else {
                return false;
            };
            if !is_type_args(&inner[..close]) {
                return false;
            }
            rest = &inner[close + 1..];
        }
        match rest.strip_prefix(' ') {
            Some(next) => rest = next,
            None => return rest.is_empty(),
        }
    }
}

fn is_type_args(args: &str) -> bool {
    if args.trim().eq_ignore_ascii_case("max") {
        return true;
    }
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    let mut parts = args.split(',').map(str::trim);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(n), None, None) => digits(n),
        (Some(n), Some(m), None) => digits(n) && digits(m),
        _ => false,
    }
}

/// A bare identifier or a double-quoted name without embedded quotes.
pub fn is_collation_name(name: &str) -> bool {
    match name.strip_prefix('"').and_then(|n| n.strip_suffix('"')) {
        Some(quoted) => {
            !quoted.is_empty() && !quoted.contains('"') && !quoted.chars().any(char::is_control)
        }
        None => is_identifier(name),
    }
}

fn is_identifier(word: &str) -> bool {
    let mut bytes = word.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// `name(args) OVER (PARTITION BY ... ORDER BY ...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFunction {
    pub name: String,
    pub args: Vec<Operand>,
    #[serde(default)]
    pub partition_by: Vec<Operand>,
    #[serde(default)]
    pub order_by: Vec<OrderByItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithmeticOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithmeticOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            ArithmeticOperator::Add => "+",
            ArithmeticOperator::Sub => "-",
            ArithmeticOperator::Mul => "*",
            ArithmeticOperator::Div => "/",
            ArithmeticOperator::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticExpression {
    pub left: Box<Operand>,
    pub op: ArithmeticOperator,
    pub right: Box<Operand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitwiseOperator {
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRight,
}

impl BitwiseOperator {
    /// ANSI-ish spelling; XOR is the one dialects disagree on.
    pub const fn as_str(self) -> &'static str {
        match self {
            BitwiseOperator::And => "&",
            BitwiseOperator::Or => "|",
            BitwiseOperator::Xor => "^",
            BitwiseOperator::ShiftLeft => "<<",
            BitwiseOperator::ShiftRight => ">>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitwiseExpression {
    pub left: Box<Operand>,
    pub op: BitwiseOperator,
    pub right: Box<Operand>,
}

//! Dialect description: surface syntax knobs plus the strategy values the
//! shared pipeline calls through.

use std::sync::Arc;

use super::context::PlaceholderStyle;
use super::functions::{FunctionRegistry, FunctionRenderer};
use super::strategy::{
    CteStrategy, FunctionJson, JoinStrategy, JsonStrategy, LimitOffset, NoReturning,
    OnConflictUpsert, OrderingStrategy, PaginationStrategy, ParenthesizedSetOperations,
    ReturningStrategy, SetOperationStrategy, StandardCte, StandardJoins, StandardOrdering,
    StandardTableFunctions, TableFunctionFormatter, UpsertStrategy,
};
use crate::ddl::{DdlStrategy, StandardDdl};

/// Identifier quoting style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentQuote {
    /// `"name"`
    Double,
    /// `` `name` ``
    Backtick,
    /// `[name]`
    Bracket,
}

impl IdentQuote {
    pub const fn open(self) -> char {
        match self {
            IdentQuote::Double => '"',
            IdentQuote::Backtick => '`',
            IdentQuote::Bracket => '[',
        }
    }

    pub const fn close(self) -> char {
        match self {
            IdentQuote::Double => '"',
            IdentQuote::Backtick => '`',
            IdentQuote::Bracket => ']',
        }
    }

    /// Writes `name` quoted, doubling any embedded closing quote.
    pub fn write(self, name: &str, buf: &mut String) {
        let close = self.close();
        buf.push(self.open());
        for c in name.chars() {
            if c == close {
                buf.push(close);
            }
            buf.push(c);
        }
        buf.push(close);
    }
}

/// How bitwise XOR is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XorStyle {
    /// `a ^ b`
    Caret,
    /// `a # b`
    Hash,
    /// `((a | b) & ~(a & b))`
    Emulated,
}

/// How a stored procedure is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
    /// `CALL p(a, b)`
    Call,
    /// `EXEC p a, b`
    Exec,
    Unsupported,
}

/// Yes/no capabilities the shared pipeline consults directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub full_outer_join: bool,
    /// Native `ILIKE`; otherwise emulated with `LOWER(..) LIKE LOWER(..)`
    pub ilike: bool,
    pub distinct_on: bool,
    /// `INSERT INTO t DEFAULT VALUES`; otherwise `() VALUES ()`
    pub default_values: bool,
    /// `TRUE`/`FALSE` keywords when literals are inlined; otherwise `1`/`0`
    pub boolean_literals: bool,
    /// String literals read `\` as an escape, so inline strings double it
    pub backslash_escapes: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            full_outer_join: true,
            ilike: false,
            distinct_on: false,
            default_values: true,
            boolean_literals: true,
            backslash_escapes: false,
        }
    }
}

/// A target SQL surface syntax.
///
/// A dialect is the shared pipeline's defaults with a handful of strategies
/// swapped out and a function override table layered over the baseline. It is
/// cheap to clone and safe to share between threads.
#[derive(Debug, Clone)]
pub struct Dialect {
    name: &'static str,
    quote: IdentQuote,
    placeholders: PlaceholderStyle,
    xor: XorStyle,
    calls: CallStyle,
    capabilities: Capabilities,
    pub(crate) pagination: Arc<dyn PaginationStrategy>,
    pub(crate) ctes: Arc<dyn CteStrategy>,
    pub(crate) joins: Arc<dyn JoinStrategy>,
    pub(crate) ordering: Arc<dyn OrderingStrategy>,
    pub(crate) returning: Arc<dyn ReturningStrategy>,
    pub(crate) upsert: Arc<dyn UpsertStrategy>,
    pub(crate) json: Arc<dyn JsonStrategy>,
    pub(crate) table_functions: Arc<dyn TableFunctionFormatter>,
    pub(crate) set_operations: Arc<dyn SetOperationStrategy>,
    pub(crate) ddl: Arc<dyn DdlStrategy>,
    functions: FunctionRegistry,
}

impl Dialect {
    /// The ANSI baseline: double-quoted identifiers, `?` placeholders,
    /// `LIMIT/OFFSET`, no RETURNING and `ON CONFLICT` upserts.
    pub fn ansi(name: &'static str) -> Self {
        Self {
            name,
            quote: IdentQuote::Double,
            placeholders: PlaceholderStyle::Question,
            xor: XorStyle::Caret,
            calls: CallStyle::Call,
            capabilities: Capabilities::default(),
            pagination: Arc::new(LimitOffset::new()),
            ctes: Arc::new(StandardCte::new()),
            joins: Arc::new(StandardJoins),
            ordering: Arc::new(StandardOrdering::native()),
            returning: Arc::new(NoReturning),
            upsert: Arc::new(OnConflictUpsert::new()),
            json: Arc::new(FunctionJson::new("JSON_VALUE")),
            table_functions: Arc::new(StandardTableFunctions::new()),
            set_operations: Arc::new(ParenthesizedSetOperations),
            ddl: Arc::new(StandardDdl::new()),
            functions: FunctionRegistry::ansi(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn quote(&self) -> IdentQuote {
        self.quote
    }

    pub fn placeholders(&self) -> PlaceholderStyle {
        self.placeholders
    }

    pub fn xor(&self) -> XorStyle {
        self.xor
    }

    pub fn calls(&self) -> CallStyle {
        self.calls
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    // ==================== construction ====================

    pub fn with_quote(mut self, quote: IdentQuote) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_placeholders(mut self, style: PlaceholderStyle) -> Self {
        self.placeholders = style;
        self
    }

    pub fn with_xor(mut self, xor: XorStyle) -> Self {
        self.xor = xor;
        self
    }

    pub fn with_calls(mut self, calls: CallStyle) -> Self {
        self.calls = calls;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_pagination(mut self, strategy: impl PaginationStrategy + 'static) -> Self {
        self.pagination = Arc::new(strategy);
        self
    }

    pub fn with_ctes(mut self, strategy: impl CteStrategy + 'static) -> Self {
        self.ctes = Arc::new(strategy);
        self
    }

    pub fn with_joins(mut self, strategy: impl JoinStrategy + 'static) -> Self {
        self.joins = Arc::new(strategy);
        self
    }

    pub fn with_ordering(mut self, strategy: impl OrderingStrategy + 'static) -> Self {
        self.ordering = Arc::new(strategy);
        self
    }

    pub fn with_returning(mut self, strategy: impl ReturningStrategy + 'static) -> Self {
        self.returning = Arc::new(strategy);
        self
    }

    pub fn with_upsert(mut self, strategy: impl UpsertStrategy + 'static) -> Self {
        self.upsert = Arc::new(strategy);
        self
    }

    pub fn with_json(mut self, strategy: impl JsonStrategy + 'static) -> Self {
        self.json = Arc::new(strategy);
        self
    }

    pub fn with_table_functions(mut self, strategy: impl TableFunctionFormatter + 'static) -> Self {
        self.table_functions = Arc::new(strategy);
        self
    }

    pub fn with_set_operations(mut self, strategy: impl SetOperationStrategy + 'static) -> Self {
        self.set_operations = Arc::new(strategy);
        self
    }

    pub fn with_ddl(mut self, strategy: impl DdlStrategy + 'static) -> Self {
        self.ddl = Arc::new(strategy);
        self
    }

    /// Layers function overrides over the baseline table.
    pub fn with_functions<'a>(
        mut self,
        overrides: impl IntoIterator<Item = &'a (&'a str, FunctionRenderer)>,
    ) -> Self {
        self.functions = self.functions.with_overrides(overrides);
        self
    }

    /// Registers (or replaces) a single function renderer.
    pub fn with_function(mut self, name: &str, renderer: FunctionRenderer) -> Self {
        self.functions = self.functions.with_override(name, renderer);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_escapes_closing_character() {
        let mut buf = String::new();
        IdentQuote::Bracket.write("we]ird", &mut buf);
        assert_eq!(buf, "[we]]ird]");

        buf.clear();
        IdentQuote::Double.write("a\"b", &mut buf);
        assert_eq!(buf, "\"a\"\"b\"");
    }

    #[test]
    fn string_literals_double_backslashes_only_when_they_escape() {
        let render = |dialect: &Dialect| {
            let mut w = crate::compiler::SqlWriter::new(dialect);
            w.string_literal("it's a\\");
            w.finish().sql
        };
        assert_eq!(render(&Dialect::ansi("ansi")), "'it''s a\\'");
        let escaping = Dialect::ansi("escaping").with_capabilities(Capabilities {
            backslash_escapes: true,
            ..Capabilities::default()
        });
        assert_eq!(render(&escaping), "'it''s a\\\\'");
    }
}

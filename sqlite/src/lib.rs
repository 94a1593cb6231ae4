//! SQLite dialect for quarry
//!
//! Double-quoted identifiers, `?` placeholders, `RETURNING`, and
//! `ON CONFLICT` upserts that must name their conflict columns. Compound
//! queries are written without parentheses around their members, XOR is
//! emulated, JSON goes through `json_extract`, and there are no stored
//! procedures to call.

mod ddl;
pub mod functions;

pub use ddl::SqliteDdl;

use quarry_core::compiler::{
    BareSetOperations, CallStyle, Capabilities, Dialect, FunctionJson, LimitOffset,
    OnConflictUpsert, PlaceholderStyle, SqlCompiler, TrailingReturning, XorStyle,
};

pub const NAME: &str = "sqlite";

pub fn dialect() -> Dialect {
    Dialect::ansi(NAME)
        .with_placeholders(PlaceholderStyle::Question)
        .with_xor(XorStyle::Emulated)
        .with_calls(CallStyle::Unsupported)
        .with_capabilities(Capabilities::default())
        .with_pagination(LimitOffset::offset_only_limit("-1"))
        .with_returning(TrailingReturning)
        .with_upsert(OnConflictUpsert::without_named_constraints())
        .with_json(FunctionJson::new("json_extract"))
        .with_set_operations(BareSetOperations)
        .with_ddl(SqliteDdl)
        .with_functions(functions::OVERRIDES)
}

#[inline]
pub fn compiler() -> SqlCompiler {
    SqlCompiler::new(dialect())
}

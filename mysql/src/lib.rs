//! MySQL dialect for quarry
//!
//! Backtick identifiers, `?` placeholders, `ON DUPLICATE KEY UPDATE`
//! upserts and `->'$.path'` JSON access. There is no RETURNING and no
//! FULL OUTER JOIN; both are capability errors.

mod ddl;
pub mod functions;
mod json;
mod upsert;

pub use ddl::MySqlDdl;
pub use json::DollarPathJson;
pub use upsert::DuplicateKeyUpsert;

use quarry_core::compiler::{
    Capabilities, Dialect, IdentQuote, LimitOffset, NoReturning, PlaceholderStyle, SqlCompiler,
    StandardOrdering, XorStyle,
};

pub const NAME: &str = "mysql";

/// Largest row count MySQL accepts; written when only an OFFSET is requested.
pub const MAX_ROWS: &str = "18446744073709551615";

pub fn dialect() -> Dialect {
    Dialect::ansi(NAME)
        .with_quote(IdentQuote::Backtick)
        .with_placeholders(PlaceholderStyle::Question)
        .with_xor(XorStyle::Caret)
        .with_capabilities(Capabilities {
            full_outer_join: false,
            default_values: false,
            backslash_escapes: true,
            ..Capabilities::default()
        })
        .with_pagination(LimitOffset::offset_only_limit(MAX_ROWS))
        .with_ordering(StandardOrdering::emulated_nulls())
        .with_returning(NoReturning)
        .with_upsert(DuplicateKeyUpsert)
        .with_json(DollarPathJson)
        .with_ddl(MySqlDdl)
        .with_functions(functions::OVERRIDES)
}

#[inline]
pub fn compiler() -> SqlCompiler {
    SqlCompiler::new(dialect())
}

//! SQL Server dialect for quarry
//!
//! Bracketed identifiers, `@pN` placeholders, `OFFSET ... FETCH` paging,
//! `OUTPUT INSERTED.*` in place of RETURNING and `MERGE` upserts.

mod ddl;
pub mod functions;
mod output;
mod paging;

pub use ddl::MssqlDdl;
pub use output::{MergeUpsert, OutputReturning};
pub use paging::OffsetFetch;

use quarry_core::compiler::{
    CallStyle, Capabilities, Dialect, FunctionJson, IdentQuote, PlaceholderStyle, SqlCompiler, StandardCte,
    StandardOrdering, XorStyle,
};

pub const NAME: &str = "mssql";

pub fn dialect() -> Dialect {
    Dialect::ansi(NAME)
        .with_quote(IdentQuote::Bracket)
        .with_placeholders(PlaceholderStyle::AtP)
        .with_xor(XorStyle::Caret)
        .with_calls(CallStyle::Exec)
        .with_capabilities(Capabilities {
            boolean_literals: false,
            ..Capabilities::default()
        })
        .with_pagination(OffsetFetch)
        .with_ctes(StandardCte::without_recursive_keyword())
        .with_ordering(StandardOrdering::emulated_nulls())
        .with_returning(OutputReturning)
        .with_upsert(MergeUpsert)
        .with_json(FunctionJson::new("JSON_VALUE"))
        .with_ddl(MssqlDdl)
        .with_functions(functions::OVERRIDES)
}

#[inline]
pub fn compiler() -> SqlCompiler {
    SqlCompiler::new(dialect())
}

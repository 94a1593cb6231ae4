//! PostgreSQL dialect for quarry
//!
//! Double-quoted identifiers, `$n` placeholders, `RETURNING`, `ON CONFLICT`
//! upserts, `DISTINCT ON`, native `ILIKE` and arrow-operator JSON access.
//!
//! ```ignore
//! let compiled = state.compile(&quarry_postgres::compiler())?;
//! client.query(&compiled.sql, &params(&compiled.params)).await?;
//! ```

pub mod functions;
mod json;

pub use json::ArrowJson;

use quarry_core::compiler::{
    Capabilities, Dialect, OnConflictUpsert, PlaceholderStyle, SqlCompiler,
    StandardTableFunctions, TrailingReturning, XorStyle,
};

/// Dialect name used in error messages and trace events.
pub const NAME: &str = "postgres";

pub fn dialect() -> Dialect {
    Dialect::ansi(NAME)
        .with_placeholders(PlaceholderStyle::Dollar)
        .with_xor(XorStyle::Hash)
        .with_capabilities(Capabilities {
            ilike: true,
            distinct_on: true,
            ..Capabilities::default()
        })
        .with_returning(TrailingReturning)
        .with_upsert(OnConflictUpsert::new())
        .with_json(ArrowJson)
        .with_table_functions(StandardTableFunctions::with_ordinality())
        .with_functions(functions::OVERRIDES)
}

#[inline]
pub fn compiler() -> SqlCompiler {
    SqlCompiler::new(dialect())
}

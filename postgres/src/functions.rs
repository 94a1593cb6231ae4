//! PostgreSQL spellings layered over the baseline function table.

use quarry_core::compiler::{FunctionRenderer, FunctionWriter};
use quarry_core::error::Result;

pub const OVERRIDES: &[(&str, FunctionRenderer)] = &[
    ("JSON_AGG", json_agg),
    ("JSON_ARRAY", json_build_array),
    ("JSON_OBJECT", json_build_object),
    ("NOW", now),
];

/// `JSON_AGG([DISTINCT] x [ORDER BY ...])`.
fn json_agg(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=1)?;
    f.standard("JSON_AGG")
}

fn json_build_array(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.plain()?;
    f.standard("json_build_array")
}

/// Arguments alternate key, value.
fn json_build_object(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.plain()?;
    if f.arg_count() % 2 != 0 {
        return Err(quarry_core::QuarryError::invalid_operand(
            "args",
            "json_build_object takes key/value pairs",
        ));
    }
    f.standard("json_build_object")
}

fn now(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(0..=0)?;
    f.push("NOW()");
    Ok(())
}

//! MySQL spellings layered over the baseline function table.

use quarry_core::compiler::{FunctionRenderer, FunctionWriter};
use quarry_core::error::Result;

pub const OVERRIDES: &[(&str, FunctionRenderer)] = &[
    ("CONCAT", concat),
    ("RANDOM", rand),
    ("STRING_AGG", group_concat),
    ("JSON_AGG", json_arrayagg),
];

/// `CONCAT(a, b, ...)`; `||` is logical OR in MySQL.
fn concat(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=usize::MAX)?;
    f.plain()?;
    f.standard("CONCAT")
}

fn rand(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(0..=0)?;
    f.push("RAND()");
    Ok(())
}

/// `GROUP_CONCAT([DISTINCT] x [ORDER BY ...] SEPARATOR 'sep')`.
fn group_concat(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=1)?;
    f.push("GROUP_CONCAT(");
    f.distinct();
    f.arg(0)?;
    f.order_by()?;
    f.push(" SEPARATOR ");
    f.separator();
    f.push(")");
    Ok(())
}

fn json_arrayagg(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=1)?;
    f.plain()?;
    f.standard("JSON_ARRAYAGG")
}

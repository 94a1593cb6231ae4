//! Scalar and aggregate function rendering.
//!
//! A [`FunctionRegistry`] is a baseline table of ANSI renderers plus a small
//! per-dialect override map. Resolution is a single lookup with fallback:
//! override first, then baseline, else the function is unsupported.
//!
//! ```ignore
//! fn rand(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
//!     f.expect_args(0..=0)?;
//!     f.push("RAND()");
//!     Ok(())
//! }
//!
//! let dialect = Dialect::ansi("custom").with_function("RANDOM", rand);
//! ```

use core::fmt;
use core::ops::RangeInclusive;
use std::sync::OnceLock;

use compact_str::CompactString;
use hashbrown::HashMap;

use super::writer::SqlWriter;
use crate::ast::{FunctionCall, Operand};
use crate::error::{QuarryError, Result};
use crate::value::Value;

/// Renders one function call.
pub type FunctionRenderer = fn(&mut FunctionWriter<'_, '_>) -> Result<()>;

/// Name-keyed renderer table (names are matched case-insensitively).
#[derive(Clone)]
pub struct FunctionRegistry {
    baseline: &'static HashMap<CompactString, FunctionRenderer>,
    overrides: HashMap<CompactString, FunctionRenderer>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut overrides: Vec<&str> = self.overrides.keys().map(CompactString::as_str).collect();
        overrides.sort_unstable();
        f.debug_struct("FunctionRegistry")
            .field("baseline", &self.baseline.len())
            .field("overrides", &overrides)
            .finish()
    }
}

fn normalize(name: &str) -> CompactString {
    let mut key = CompactString::from(name);
    key.make_ascii_uppercase();
    key
}

impl FunctionRegistry {
    /// The baseline table with no overrides.
    pub fn ansi() -> Self {
        static BASELINE: OnceLock<HashMap<CompactString, FunctionRenderer>> = OnceLock::new();
        let baseline = BASELINE.get_or_init(|| {
            BASELINE_RENDERERS
                .iter()
                .map(|(name, renderer)| (CompactString::from(*name), *renderer))
                .collect()
        });
        Self {
            baseline,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, name: &str, renderer: FunctionRenderer) -> Self {
        self.overrides.insert(normalize(name), renderer);
        self
    }

    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = &'a (&'a str, FunctionRenderer)>,
    ) -> Self {
        for (name, renderer) in overrides {
            self.overrides.insert(normalize(name), *renderer);
        }
        self
    }

    /// Override first, then baseline.
    pub fn resolve(&self, name: &str) -> Option<FunctionRenderer> {
        let key = normalize(name);
        self.overrides
            .get(&key)
            .or_else(|| self.baseline.get(&key))
            .copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn is_overridden(&self, name: &str) -> bool {
        self.overrides.contains_key(&normalize(name))
    }
}

// =============================================================================
// FunctionWriter
// =============================================================================

/// What a renderer sees: the call being rendered and the writer to render
/// into. Arguments are compiled on demand, so a renderer that writes an
/// argument twice binds its parameters twice, in order.
pub struct FunctionWriter<'w, 'd> {
    writer: &'w mut SqlWriter<'d>,
    call: &'w FunctionCall,
}

impl<'w, 'd> FunctionWriter<'w, 'd> {
    pub fn new(writer: &'w mut SqlWriter<'d>, call: &'w FunctionCall) -> Self {
        Self { writer, call }
    }

    pub fn call(&self) -> &FunctionCall {
        self.call
    }

    pub fn arg_count(&self) -> usize {
        self.call.args.len()
    }

    pub fn writer(&mut self) -> &mut SqlWriter<'d> {
        self.writer
    }

    pub fn push(&mut self, text: &str) {
        self.writer.push(text);
    }

    /// Fails unless the argument count is within `range`.
    pub fn expect_args(&self, range: RangeInclusive<usize>) -> Result<()> {
        if range.contains(&self.call.args.len()) {
            return Ok(());
        }
        Err(QuarryError::invalid_operand(
            "args",
            format!(
                "{} takes {}..={} arguments, got {}",
                self.call.name,
                range.start(),
                range.end(),
                self.call.args.len()
            ),
        ))
    }

    /// Writes argument `index`.
    pub fn arg(&mut self, index: usize) -> Result<()> {
        let call = self.call;
        let arg = call.args.get(index).ok_or_else(|| {
            QuarryError::invalid_operand(
                "args",
                format!("{} is missing argument {}", call.name, index + 1),
            )
        })?;
        self.writer.operand(arg)
    }

    /// Writes every argument from `start`, separated by `separator`.
    pub fn args_from(&mut self, start: usize, separator: &str) -> Result<()> {
        let call = self.call;
        for (i, arg) in call.args.iter().enumerate().skip(start) {
            if i > start {
                self.writer.push(separator);
            }
            self.writer.operand(arg)?;
        }
        Ok(())
    }

    /// Writes every argument separated by `, `.
    pub fn args(&mut self) -> Result<()> {
        self.args_from(0, ", ")
    }

    /// Writes a text literal argument inline as a bare keyword (`YEAR`).
    pub fn keyword_arg(&mut self, index: usize) -> Result<()> {
        let keyword = self.keyword(index)?;
        self.writer.push(&keyword);
        Ok(())
    }

    /// Reads a text literal argument as an upper-cased keyword.
    pub fn keyword(&self, index: usize) -> Result<String> {
        match self.call.args.get(index) {
            Some(Operand::Literal {
                value: Value::Text(text),
            }) if !text.is_empty() && text.chars().all(|c| c.is_ascii_alphabetic()) => {
                Ok(text.to_ascii_uppercase())
            }
            _ => Err(QuarryError::invalid_operand(
                "args",
                format!(
                    "{} argument {} must be a bare keyword",
                    self.call.name,
                    index + 1
                ),
            )),
        }
    }

    /// `DISTINCT ` when the call asks for it.
    pub fn distinct(&mut self) {
        if self.call.distinct {
            self.writer.push("DISTINCT ");
        }
    }

    /// ` ORDER BY ...` when the call carries an inner ordering.
    pub fn order_by(&mut self) -> Result<()> {
        let call = self.call;
        if call.order_by.is_empty() {
            return Ok(());
        }
        self.writer.push(" ORDER BY ");
        self.writer.order_items(&call.order_by)
    }

    /// The call's separator as an inline string literal (default `,`).
    pub fn separator(&mut self) {
        let separator = self.call.separator.as_deref().unwrap_or(",");
        self.writer.string_literal(separator);
    }

    /// `NAME([DISTINCT ]args[ ORDER BY ...])`.
    pub fn standard(&mut self, name: &str) -> Result<()> {
        self.writer.push(name);
        self.writer.push_char('(');
        self.distinct();
        self.args()?;
        self.order_by()?;
        self.writer.push_char(')');
        Ok(())
    }

    /// Fails when the call carries `DISTINCT`, an inner ORDER BY or a separator
    /// that `name` cannot express.
    pub fn plain(&self) -> Result<()> {
        if self.call.distinct || !self.call.order_by.is_empty() || self.call.separator.is_some() {
            return Err(QuarryError::invalid_operand(
                "args",
                format!(
                    "{} does not accept DISTINCT, ORDER BY or a separator",
                    self.call.name
                ),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Baseline renderers
// =============================================================================

macro_rules! standard_renderer {
    ($fn_name:ident, $sql:literal, $range:expr) => {
        fn $fn_name(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
            f.expect_args($range)?;
            f.standard($sql)
        }
    };
}

standard_renderer!(sum, "SUM", 1..=1);
standard_renderer!(avg, "AVG", 1..=1);
standard_renderer!(min, "MIN", 1..=1);
standard_renderer!(max, "MAX", 1..=1);
standard_renderer!(upper, "UPPER", 1..=1);
standard_renderer!(lower, "LOWER", 1..=1);
standard_renderer!(char_length, "CHAR_LENGTH", 1..=1);
standard_renderer!(trim, "TRIM", 1..=1);
standard_renderer!(replace, "REPLACE", 3..=3);
standard_renderer!(coalesce, "COALESCE", 1..=usize::MAX);
standard_renderer!(nullif, "NULLIF", 2..=2);
standard_renderer!(abs, "ABS", 1..=1);
standard_renderer!(round, "ROUND", 1..=2);
standard_renderer!(ceil, "CEIL", 1..=1);
standard_renderer!(floor, "FLOOR", 1..=1);
standard_renderer!(power, "POWER", 2..=2);
standard_renderer!(random, "RANDOM", 0..=0);
standard_renderer!(greatest, "GREATEST", 1..=usize::MAX);
standard_renderer!(least, "LEAST", 1..=usize::MAX);
standard_renderer!(json_array, "JSON_ARRAY", 0..=usize::MAX);
standard_renderer!(json_object, "JSON_OBJECT", 0..=usize::MAX);

/// `COUNT(*)` for no arguments.
fn count(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(0..=1)?;
    if f.arg_count() == 0 {
        f.push("COUNT(*)");
        return Ok(());
    }
    f.standard("COUNT")
}

/// `SUBSTRING(x FROM start [FOR len])`.
fn substring(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(2..=3)?;
    f.push("SUBSTRING(");
    f.arg(0)?;
    f.push(" FROM ");
    f.arg(1)?;
    if f.arg_count() == 3 {
        f.push(" FOR ");
        f.arg(2)?;
    }
    f.push(")");
    Ok(())
}

/// `(a || b || ...)`.
fn concat(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=usize::MAX)?;
    f.push("(");
    f.args_from(0, " || ")?;
    f.push(")");
    Ok(())
}

fn now(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(0..=0)?;
    f.push("CURRENT_TIMESTAMP");
    Ok(())
}

fn current_date(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(0..=0)?;
    f.push("CURRENT_DATE");
    Ok(())
}

/// `EXTRACT(FIELD FROM x)`.
fn extract(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(2..=2)?;
    f.push("EXTRACT(");
    f.keyword_arg(0)?;
    f.push(" FROM ");
    f.arg(1)?;
    f.push(")");
    Ok(())
}

/// `STRING_AGG(x, 'sep' [ORDER BY ...])`.
fn string_agg(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=1)?;
    f.push("STRING_AGG(");
    f.distinct();
    f.arg(0)?;
    f.push(", ");
    f.separator();
    f.order_by()?;
    f.push(")");
    Ok(())
}

const BASELINE_RENDERERS: &[(&str, FunctionRenderer)] = &[
    ("COUNT", count),
    ("SUM", sum),
    ("AVG", avg),
    ("MIN", min),
    ("MAX", max),
    ("STRING_AGG", string_agg),
    ("UPPER", upper),
    ("LOWER", lower),
    ("LENGTH", char_length),
    ("TRIM", trim),
    ("SUBSTRING", substring),
    ("CONCAT", concat),
    ("REPLACE", replace),
    ("COALESCE", coalesce),
    ("NULLIF", nullif),
    ("GREATEST", greatest),
    ("LEAST", least),
    ("ABS", abs),
    ("ROUND", round),
    ("CEIL", ceil),
    ("FLOOR", floor),
    ("POWER", power),
    ("RANDOM", random),
    ("NOW", now),
    ("CURRENT_DATE", current_date),
    ("EXTRACT", extract),
    ("JSON_ARRAY", json_array),
    ("JSON_OBJECT", json_object),
];

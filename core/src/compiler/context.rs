//! Per-compile accumulator for SQL text and bound parameters.

use core::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// How positional parameters are spelled in the output SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, ...
    Dollar,
    /// `?`
    Question,
    /// `@p1`, `@p2`, ...
    AtP,
}

impl PlaceholderStyle {
    /// Writes the placeholder for the given 1-based index.
    #[inline]
    pub fn write(self, index: usize, buf: &mut String) {
        match self {
            PlaceholderStyle::Dollar => {
                let _ = write!(buf, "${index}");
            }
            PlaceholderStyle::Question => buf.push('?'),
            PlaceholderStyle::AtP => {
                let _ = write!(buf, "@p{index}");
            }
        }
    }
}

/// Accumulator owned by exactly one compile call.
///
/// SQL text and parameters are appended together, so the parameter list is
/// always in placeholder emission order.
#[derive(Debug)]
pub struct CompilerContext {
    sql: String,
    params: Vec<Value>,
    style: PlaceholderStyle,
    inline_literals: bool,
}

impl CompilerContext {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            sql: String::with_capacity(128),
            params: Vec::with_capacity(8),
            style,
            inline_literals: false,
        }
    }

    /// A context that renders literals inline instead of binding them (DDL).
    pub fn inline(style: PlaceholderStyle) -> Self {
        Self {
            inline_literals: true,
            ..Self::new(style)
        }
    }

    #[inline]
    pub fn push_str(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    #[inline]
    pub fn push_char(&mut self, c: char) {
        self.sql.push(c);
    }

    pub fn push_number(&mut self, value: u64) {
        let _ = write!(self.sql, "{value}");
    }

    /// Binds `value` and writes its placeholder.
    pub fn push_param(&mut self, value: Value) {
        self.params.push(value);
        self.style.write(self.params.len(), &mut self.sql);
    }

    pub fn inlines_literals(&self) -> bool {
        self.inline_literals
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_follow_bind_order() {
        let mut ctx = CompilerContext::new(PlaceholderStyle::Dollar);
        ctx.push_param(Value::from(1));
        ctx.push_str(", ");
        ctx.push_param(Value::from("a"));
        let (sql, params) = ctx.finish();
        assert_eq!(sql, "$1, $2");
        assert_eq!(params, vec![Value::from(1), Value::from("a")]);

        let mut ctx = CompilerContext::new(PlaceholderStyle::AtP);
        ctx.push_param(Value::Null);
        assert_eq!(ctx.sql(), "@p1");
    }
}

use quarry_core::ast::JsonPath;
use quarry_core::compiler::{JsonStrategy, SqlWriter};
use quarry_core::error::{QuarryError, Result};

/// `"col"->>'key'` for a single key, `"col"#>>'{a,b}'` for a nested path.
///
/// Both operators yield `text`, so comparisons bind against text parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrowJson;

impl JsonStrategy for ArrowJson {
    fn render(&self, w: &mut SqlWriter<'_>, path: &JsonPath) -> Result<()> {
        let segments: Vec<&str> = path.segments().collect();
        w.qualified(path.column.qualifier(), &path.column.name);
        match segments.as_slice() {
            [] => Err(QuarryError::invalid_operand(
                "path",
                "JSON path must name at least one key",
            )),
            [key] => {
                w.push("->>");
                w.string_literal(key);
                Ok(())
            }
            keys => {
                w.push("#>>");
                w.string_literal(&format!("{{{}}}", keys.join(",")));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::ast::{SelectItem, SelectQuery};
    use quarry_core::expr::{col, eq, json_path};
    use quarry_core::value::Value;

    #[test]
    fn single_key_uses_the_text_arrow() {
        let mut q = SelectQuery::from_table("events");
        q.columns = vec![SelectItem::aliased(
            json_path(col("payload"), "$.kind").unwrap(),
            "kind",
        )];
        q.where_ = Some(eq(json_path(col("payload"), "user.id").unwrap(), "7").unwrap());
        let out = crate::compiler().compile_select(&q).unwrap();
        assert_eq!(
            out.sql,
            "SELECT \"payload\"->>'kind' AS \"kind\" FROM \"events\" \
             WHERE \"payload\"#>>'{user,id}' = $1"
        );
        assert_eq!(out.params, vec![Value::from("7")]);
    }
}

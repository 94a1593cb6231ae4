use quarry_core::ast::JsonPath;
use quarry_core::compiler::{dollar_path, JsonStrategy, SqlWriter};
use quarry_core::error::Result;

/// `` `col`->'$.a.b' ``.
#[derive(Debug, Clone, Copy, Default)]
pub struct DollarPathJson;

impl JsonStrategy for DollarPathJson {
    fn render(&self, w: &mut SqlWriter<'_>, path: &JsonPath) -> Result<()> {
        w.qualified(path.column.qualifier(), &path.column.name);
        w.push("->");
        w.string_literal(&dollar_path(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::ast::{SelectItem, SelectQuery};
    use quarry_core::expr::{col, json_path};

    #[test]
    fn paths_are_dollar_rooted() {
        let mut q = SelectQuery::from_table("events");
        q.columns = vec![SelectItem::aliased(
            json_path(col("events.payload"), "user.id").unwrap(),
            "user_id",
        )];
        assert_eq!(
            crate::compiler().compile_select(&q).unwrap().sql,
            "SELECT `events`.`payload`->'$.user.id' AS `user_id` FROM `events`"
        );
    }

    #[test]
    fn backslashes_in_keys_stay_inside_the_literal() {
        let mut q = SelectQuery::from_table("events");
        q.columns = vec![SelectItem::aliased(
            json_path(col("payload"), "a\\").unwrap(),
            "k",
        )];
        assert_eq!(
            crate::compiler().compile_select(&q).unwrap().sql,
            "SELECT `payload`->'$.a\\\\' AS `k` FROM `events`"
        );
    }
}

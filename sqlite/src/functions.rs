//! SQLite spellings layered over the baseline function table.

use quarry_core::compiler::{FunctionRenderer, FunctionWriter};
use quarry_core::error::{QuarryError, Result};

pub const OVERRIDES: &[(&str, FunctionRenderer)] = &[
    ("LENGTH", length),
    ("SUBSTRING", substr),
    ("EXTRACT", strftime),
    ("GREATEST", scalar_max),
    ("LEAST", scalar_min),
    ("STRING_AGG", group_concat),
    ("JSON_AGG", json_group_array),
    ("JSON_ARRAY", json_array),
    ("JSON_OBJECT", json_object),
];

fn length(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=1)?;
    f.standard("LENGTH")
}

/// `SUBSTR(x, start[, len])`.
fn substr(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(2..=3)?;
    f.plain()?;
    f.standard("SUBSTR")
}

/// `CAST(strftime('%Y', x) AS INTEGER)` for `EXTRACT(YEAR FROM x)`.
fn strftime(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(2..=2)?;
    let field = f.keyword(0)?;
    let format = match field.as_str() {
        "YEAR" => "%Y",
        "MONTH" => "%m",
        "DAY" => "%d",
        "HOUR" => "%H",
        "MINUTE" => "%M",
        "SECOND" => "%S",
        "DOW" => "%w",
        "DOY" => "%j",
        "EPOCH" => "%s",
        other => {
            return Err(QuarryError::unsupported(
                crate::NAME,
                format!("EXTRACT({other})"),
            ));
        }
    };
    f.push("CAST(strftime('");
    f.push(format);
    f.push("', ");
    f.arg(1)?;
    f.push(") AS INTEGER)");
    Ok(())
}

/// Multi-argument `MAX`; a single argument would turn it into the aggregate.
fn scalar_max(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(2..=usize::MAX)?;
    f.plain()?;
    f.standard("MAX")
}

fn scalar_min(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(2..=usize::MAX)?;
    f.plain()?;
    f.standard("MIN")
}

/// `GROUP_CONCAT(x, 'sep' [ORDER BY ...])`, or `GROUP_CONCAT(DISTINCT x)`.
fn group_concat(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=1)?;
    let call = f.call();
    if call.distinct {
        let default_separator = call.separator.as_deref().is_none_or(|sep| sep == ",");
        if !default_separator {
            return Err(QuarryError::invalid_operand(
                "separator",
                "SQLite's DISTINCT GROUP_CONCAT only joins with ','",
            ));
        }
        f.push("GROUP_CONCAT(DISTINCT ");
        f.arg(0)?;
        f.order_by()?;
        f.push(")");
        return Ok(());
    }
    f.push("GROUP_CONCAT(");
    f.arg(0)?;
    f.push(", ");
    f.separator();
    f.order_by()?;
    f.push(")");
    Ok(())
}

fn json_group_array(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=1)?;
    f.standard("json_group_array")
}

fn json_array(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.plain()?;
    f.standard("json_array")
}

fn json_object(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.plain()?;
    f.standard("json_object")
}

#[cfg(test)]
mod tests {
    use quarry_core::ast::{OrderByItem, SelectItem, SelectQuery};
    use quarry_core::expr::{col, extract, greatest, json_agg, length, string_agg, substring};
    use quarry_core::value::Value;

    fn project(expr: quarry_core::ast::Operand) -> (String, Vec<Value>) {
        let mut q = SelectQuery::from_table("posts");
        q.columns = vec![SelectItem::aliased(expr, "v")];
        let out = crate::compiler().compile_select(&q).unwrap();
        (out.sql, out.params)
    }

    #[test]
    fn string_functions() {
        assert_eq!(
            project(length(col("title")).unwrap()).0,
            "SELECT LENGTH(\"title\") AS \"v\" FROM \"posts\""
        );
        let (sql, params) = project(substring(col("title"), 2, Some(3)).unwrap());
        assert_eq!(sql, "SELECT SUBSTR(\"title\", ?, ?) AS \"v\" FROM \"posts\"");
        assert_eq!(params, vec![Value::from(2i64), Value::from(3i64)]);
    }

    #[test]
    fn extract_goes_through_strftime() {
        assert_eq!(
            project(extract("year", col("created_at")).unwrap()).0,
            "SELECT CAST(strftime('%Y', \"created_at\") AS INTEGER) AS \"v\" FROM \"posts\""
        );
        let mut q = SelectQuery::from_table("posts");
        q.columns = vec![SelectItem::new(extract("quarter", col("created_at")).unwrap())];
        assert!(crate::compiler().compile_select(&q).is_err());
    }

    #[test]
    fn aggregates() {
        let agg = string_agg(col("title"), "; ", [OrderByItem::asc(col("id"))]).unwrap();
        assert_eq!(
            project(agg).0,
            "SELECT GROUP_CONCAT(\"title\", '; ' ORDER BY \"id\" ASC) AS \"v\" FROM \"posts\""
        );
        assert_eq!(
            project(json_agg(col("id")).unwrap()).0,
            "SELECT json_group_array(\"id\") AS \"v\" FROM \"posts\""
        );
        assert_eq!(
            project(greatest([col("a"), col("b")]).unwrap()).0,
            "SELECT MAX(\"a\", \"b\") AS \"v\" FROM \"posts\""
        );
    }
}

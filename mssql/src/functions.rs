//! T-SQL spellings layered over the baseline function table.
//!
//! `JSON_AGG` has no T-SQL counterpart and stays unresolved.

use quarry_core::compiler::{FunctionRenderer, FunctionWriter};
use quarry_core::error::{QuarryError, Result};

pub const OVERRIDES: &[(&str, FunctionRenderer)] = &[
    ("LENGTH", len),
    ("CONCAT", concat),
    ("CEIL", ceiling),
    ("RANDOM", rand),
    ("ROUND", round),
    ("NOW", getdate),
    ("CURRENT_DATE", current_date),
    ("EXTRACT", datepart),
    ("SUBSTRING", substring),
    ("STRING_AGG", string_agg),
    ("JSON_OBJECT", json_object),
];

fn len(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=1)?;
    f.standard("LEN")
}

/// `CONCAT(a, b, ...)`; T-SQL wants at least two arguments.
fn concat(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=usize::MAX)?;
    f.plain()?;
    if f.arg_count() == 1 {
        return f.arg(0);
    }
    f.standard("CONCAT")
}

fn ceiling(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=1)?;
    f.standard("CEILING")
}

fn rand(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(0..=0)?;
    f.push("RAND()");
    Ok(())
}

/// `ROUND(x, 0)` when no precision is given.
fn round(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=2)?;
    f.push("ROUND(");
    f.arg(0)?;
    f.push(", ");
    if f.arg_count() == 2 {
        f.arg(1)?;
    } else {
        f.push("0");
    }
    f.push(")");
    Ok(())
}

fn getdate(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(0..=0)?;
    f.push("GETDATE()");
    Ok(())
}

fn current_date(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(0..=0)?;
    f.push("CAST(GETDATE() AS DATE)");
    Ok(())
}

/// `DATEPART(part, x)`.
fn datepart(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(2..=2)?;
    let part = match f.keyword(0)?.as_str() {
        "DOW" => "WEEKDAY".to_owned(),
        "DOY" => "DAYOFYEAR".to_owned(),
        "EPOCH" => {
            f.push("DATEDIFF_BIG(SECOND, '1970-01-01', ");
            f.arg(1)?;
            f.push(")");
            return Ok(());
        }
        other => other.to_owned(),
    };
    f.push("DATEPART(");
    f.push(&part);
    f.push(", ");
    f.arg(1)?;
    f.push(")");
    Ok(())
}

/// `SUBSTRING(x, start, len)`; without a length the rest of the string is
/// taken, which writes `x` twice.
fn substring(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(2..=3)?;
    f.push("SUBSTRING(");
    f.arg(0)?;
    f.push(", ");
    f.arg(1)?;
    f.push(", ");
    if f.arg_count() == 3 {
        f.arg(2)?;
    } else {
        f.push("LEN(");
        f.arg(0)?;
        f.push(")");
    }
    f.push(")");
    Ok(())
}

/// `STRING_AGG(x, 'sep') [WITHIN GROUP (ORDER BY ...)]`.
fn string_agg(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.expect_args(1..=1)?;
    if f.call().distinct {
        return Err(QuarryError::unsupported(crate::NAME, "STRING_AGG(DISTINCT ...)"));
    }
    f.push("STRING_AGG(");
    f.arg(0)?;
    f.push(", ");
    f.separator();
    f.push(")");
    if !f.call().order_by.is_empty() {
        f.push(" WITHIN GROUP (");
        let order_by = f.call().order_by.clone();
        f.writer().push("ORDER BY ");
        f.writer().order_items(&order_by)?;
        f.push(")");
    }
    Ok(())
}

/// `JSON_OBJECT(k: v, ...)` from alternating key/value arguments.
fn json_object(f: &mut FunctionWriter<'_, '_>) -> Result<()> {
    f.plain()?;
    let count = f.arg_count();
    if count % 2 != 0 {
        return Err(QuarryError::invalid_operand(
            "args",
            "JSON_OBJECT takes key/value pairs",
        ));
    }
    f.push("JSON_OBJECT(");
    for pair in 0..count / 2 {
        if pair > 0 {
            f.push(", ");
        }
        f.arg(pair * 2)?;
        f.push(": ");
        f.arg(pair * 2 + 1)?;
    }
    f.push(")");
    Ok(())
}

#[cfg(test)]
mod tests {
    use quarry_core::ast::{OrderByItem, SelectItem, SelectQuery};
    use quarry_core::expr::{
        ceil, col, concat, current_date, extract, json_agg, length, string_agg, substring,
    };
    use quarry_core::value::Value;
    use quarry_core::QuarryError;

    fn project(expr: quarry_core::ast::Operand) -> (String, Vec<Value>) {
        let mut q = SelectQuery::from_table("posts");
        q.columns = vec![SelectItem::aliased(expr, "v")];
        let out = crate::compiler().compile_select(&q).unwrap();
        (out.sql, out.params)
    }

    #[test]
    fn renamed_scalars() {
        assert_eq!(
            project(length(col("title")).unwrap()).0,
            "SELECT LEN([title]) AS [v] FROM [posts]"
        );
        assert_eq!(
            project(ceil(col("score")).unwrap()).0,
            "SELECT CEILING([score]) AS [v] FROM [posts]"
        );
        assert_eq!(
            project(current_date()).0,
            "SELECT CAST(GETDATE() AS DATE) AS [v] FROM [posts]"
        );
        assert_eq!(
            project(extract("month", col("created_at")).unwrap()).0,
            "SELECT DATEPART(MONTH, [created_at]) AS [v] FROM [posts]"
        );
        assert_eq!(
            project(concat([col("a"), col("b")]).unwrap()).0,
            "SELECT CONCAT([a], [b]) AS [v] FROM [posts]"
        );
    }

    #[test]
    fn substring_without_length_binds_its_argument_twice() {
        let (sql, params) = project(substring("abc", 2, None).unwrap());
        assert_eq!(sql, "SELECT SUBSTRING(@p1, @p2, LEN(@p3)) AS [v] FROM [posts]");
        assert_eq!(
            params,
            vec![Value::from("abc"), Value::from(2i64), Value::from("abc")]
        );
    }

    #[test]
    fn string_agg_orders_within_group() {
        let agg = string_agg(col("title"), ", ", [OrderByItem::asc(col("id"))]).unwrap();
        assert_eq!(
            project(agg).0,
            "SELECT STRING_AGG([title], ', ') WITHIN GROUP (ORDER BY [id] ASC) AS [v] FROM [posts]"
        );
    }

    #[test]
    fn json_agg_is_not_available() {
        let mut q = SelectQuery::from_table("posts");
        q.columns = vec![SelectItem::new(json_agg(col("id")).unwrap())];
        match crate::compiler().compile_select(&q).unwrap_err() {
            QuarryError::UnsupportedFunction { dialect, name } => {
                assert_eq!(dialect, "mssql");
                assert_eq!(name, "JSON_AGG");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

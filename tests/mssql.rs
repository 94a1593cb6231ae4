#![cfg(feature = "mssql")]

mod common;

use common::builder;
use quarry::prelude::*;

fn compiler() -> SqlCompiler {
    quarry::mssql::compiler()
}

#[test]
fn unordered_page_gets_a_placeholder_order() {
    let out = builder()
        .select("users")
        .unwrap()
        .columns(["id"])
        .unwrap()
        .include("posts", IncludeOptions::new().columns(["title"]))
        .unwrap()
        .limit(5)
        .compile(&compiler())
        .unwrap();
    assert_eq!(
        out.sql,
        "SELECT [users].[id], [posts].[id] AS [posts__id], [posts].[title] AS [posts__title] \
         FROM [users] LEFT JOIN [posts] AS [posts] ON [posts].[user_id] = [users].[id] \
         ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
    );
}

#[test]
fn upsert_state_becomes_merge() {
    let out = builder()
        .insert("todos")
        .unwrap()
        .values([("id", Value::from(1)), ("name", Value::from("milk"))])
        .unwrap()
        .on_conflict_do_update(["id"], vec![Assignment::new("name", excluded("name"))])
        .unwrap()
        .compile(&compiler())
        .unwrap();
    assert!(out.sql.starts_with("MERGE INTO [todos] AS [target] USING (VALUES (@p1, @p2))"));
    assert!(out.sql.ends_with("VALUES ([source].[id], [source].[name]);"));
}

#[test]
fn delete_outputs_removed_rows() {
    let out = builder()
        .delete("todos")
        .unwrap()
        .r#where(eq(col("done"), 1).unwrap())
        .returning(["id"])
        .unwrap()
        .compile(&compiler())
        .unwrap();
    assert_eq!(
        out.sql,
        "DELETE FROM [todos] OUTPUT DELETED.[id] WHERE [done] = @p1"
    );
}

#[test]
fn json_aggregation_is_reported_by_name() {
    let err = builder()
        .select("posts")
        .unwrap()
        .select_expr(json_agg(col("id")).unwrap(), "ids")
        .unwrap()
        .compile(&compiler())
        .unwrap_err();
    assert_eq!(err.to_string(), "Unsupported function `JSON_AGG` for mssql");
}

#[test]
fn procedures_run_through_exec() {
    let qb = builder();
    let out = compiler()
        .compile_call(&qb.call("dbo.archive_posts", [30]).unwrap())
        .unwrap();
    assert_eq!(out.sql, "EXEC [dbo].[archive_posts] @p1");
    let bare = compiler()
        .compile_call(&qb.call("refresh", Vec::<Value>::new()).unwrap())
        .unwrap();
    assert_eq!(bare.sql, "EXEC [refresh]");
}

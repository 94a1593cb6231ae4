#![cfg(feature = "sqlite")]

mod common;

use common::builder;
use quarry::ast::TableRef;
use quarry::ddl::{CreateIndex, DdlStatement};
use quarry::prelude::*;

fn compiler() -> SqlCompiler {
    quarry::sqlite::compiler()
}

#[test]
fn paging_without_a_limit() {
    let out = builder()
        .select("todos")
        .unwrap()
        .columns(["id"])
        .unwrap()
        .order_by([OrderByItem::asc(col("id"))])
        .offset(10)
        .compile(&compiler())
        .unwrap();
    assert_eq!(
        out.sql,
        "SELECT \"id\" FROM \"todos\" ORDER BY \"id\" ASC LIMIT -1 OFFSET 10"
    );
}

#[test]
fn do_nothing_upsert_on_columns() {
    let out = builder()
        .insert("todos")
        .unwrap()
        .values([("id", Value::from(1)), ("name", Value::from("milk"))])
        .unwrap()
        .on_conflict_do_nothing(["id"])
        .unwrap()
        .returning(["id"])
        .unwrap()
        .compile(&compiler())
        .unwrap();
    assert_eq!(
        out.sql,
        "INSERT INTO \"todos\" (\"id\", \"name\") VALUES (?, ?) \
         ON CONFLICT (\"id\") DO NOTHING RETURNING \"id\""
    );
}

#[test]
fn ddl_documents_compile_from_json() {
    let statement: DdlStatement = serde_json::from_value(serde_json::json!({
        "type": "drop_column",
        "table": { "name": "todos" },
        "column": "done",
    }))
    .unwrap();
    let drop = compiler().compile_ddl(&statement).unwrap();
    assert_eq!(drop.statements, ["ALTER TABLE \"todos\" DROP COLUMN \"done\""]);
    assert_eq!(drop.warnings.len(), 1);
}

#[test]
fn partial_indexes_are_rejected() {
    let err = compiler()
        .compile_ddl(&DdlStatement::CreateIndex(CreateIndex {
            name: "open_todos".into(),
            table: TableRef::new("todos"),
            columns: vec!["name".into()],
            unique: false,
            where_: Some(eq(col("done"), 0).unwrap()),
        }))
        .unwrap_err();
    assert_eq!(err.to_string(), "partial index is not supported by sqlite");
}

#[test]
fn stored_procedures_do_not_exist() {
    let call = builder().call("archive", [1]).unwrap();
    let err = compiler().compile_call(&call).unwrap_err();
    assert_eq!(err.to_string(), "CALL is not supported by sqlite");
}

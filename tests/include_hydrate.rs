//! Includes planned as joins, then hydrated back into nested entities.

mod common;

use common::{builder, row};
use quarry::prelude::*;
use serde_json::json;

fn users_with_posts() -> quarry::SelectState {
    builder()
        .select("users")
        .unwrap()
        .columns(["id", "name"])
        .unwrap()
        .include("posts", IncludeOptions::new().columns(["title"]))
        .unwrap()
}

#[test]
fn fan_out_rows_collapse_into_one_root() {
    let rows = vec![
        row([
            ("id", 1.into()),
            ("name", "A".into()),
            ("posts__id", 10.into()),
            ("posts__title", "X".into()),
        ]),
        row([
            ("id", 1.into()),
            ("name", "A".into()),
            ("posts__id", 11.into()),
            ("posts__title", "Y".into()),
        ]),
    ];
    let users = users_with_posts().hydrate(&rows);
    assert_eq!(users.len(), 1);
    assert_eq!(
        users[0].to_json(),
        json!({
            "id": 1,
            "name": "A",
            "posts": [
                { "id": 10, "title": "X" },
                { "id": 11, "title": "Y" },
            ],
        })
    );
}

#[test]
fn outer_join_misses_leave_empty_slots() {
    let rows = vec![row([
        ("id", 2.into()),
        ("name", "B".into()),
        ("posts__id", Value::Null),
        ("posts__title", Value::Null),
    ])];
    let users = users_with_posts().hydrate(&rows);
    assert_eq!(users.len(), 1);
    assert!(users[0].relation("posts").unwrap().as_many().is_empty());
}

#[test]
fn two_collections_do_not_duplicate_each_other() {
    let state = builder()
        .select("posts")
        .unwrap()
        .columns(["title"])
        .unwrap()
        .include("tags", IncludeOptions::new().pivot_columns(["position"]))
        .unwrap()
        .include("author", IncludeOptions::new().columns(["name"]))
        .unwrap();

    // 1 post x 2 tags, author repeated on each row
    let mut rows = Vec::new();
    for (tag, label, position) in [(7, "rust", 1), (8, "sql", 2)] {
        rows.push(row([
            ("title", "hello".into()),
            ("id", 5.into()),
            ("user_id", 1.into()),
            ("tags_pivot__position", position.into()),
            ("tags__id", tag.into()),
            ("tags__label", label.into()),
            ("author__id", 1.into()),
            ("author__name", "ada".into()),
        ]));
    }
    rows.extend(rows.clone());

    let posts = state.hydrate(&rows);
    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    let tags = post.relation("tags").unwrap().as_many();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[1].get("label"), Some(&Value::from("sql")));
    assert_eq!(
        tags[1].pivot.as_ref().and_then(|pivot| pivot.get("position")),
        Some(&Value::from(2))
    );
    assert_eq!(
        post.relation("author").unwrap().as_one().unwrap().get("name"),
        Some(&Value::from("ada"))
    );
    // pivot data stays out of the serialized tree
    assert_eq!(
        post.to_json()["tags"],
        json!([{ "id": 7, "label": "rust" }, { "id": 8, "label": "sql" }])
    );
}

#[test]
fn merged_pivot_fields_do_not_override_the_child() {
    let state = builder()
        .select("posts")
        .unwrap()
        .include(
            "tags",
            IncludeOptions::new()
                .columns(["label"])
                .pivot_columns(["position"])
                .merge_pivot(),
        )
        .unwrap();
    let rows = vec![row([
        ("id", 5.into()),
        ("tags_pivot__position", 3.into()),
        ("tags__id", 7.into()),
        ("tags__label", "rust".into()),
    ])];
    let posts = state.hydrate(&rows);
    let tag = &posts[0].relation("tags").unwrap().as_many()[0];
    assert_eq!(tag.get("position"), Some(&Value::from(3)));
    assert_eq!(tag.get("label"), Some(&Value::from("rust")));
}

#[test]
fn hydration_is_repeatable() {
    let state = users_with_posts();
    let rows = vec![
        row([
            ("id", 1.into()),
            ("name", "A".into()),
            ("posts__id", 10.into()),
            ("posts__title", "X".into()),
        ]),
        row([
            ("id", 3.into()),
            ("name", "C".into()),
            ("posts__id", 12.into()),
            ("posts__title", "Z".into()),
        ]),
    ];
    let first = state.hydrate(&rows);
    assert_eq!(first, state.hydrate(&rows));
    let ids: Vec<_> = first.iter().map(|user| user.get("id").cloned()).collect();
    assert_eq!(ids, [Some(Value::from(1)), Some(Value::from(3))]);
}

#[test]
fn relation_filters_do_not_widen_the_projection() {
    let state = builder()
        .select("users")
        .unwrap()
        .columns(["id"])
        .unwrap()
        .filter_relation(
            "posts",
            RelationFilter::Some {
                filter: eq(col("posts.published"), true).unwrap(),
            },
        )
        .unwrap();
    let out = state
        .compile(&SqlCompiler::new(quarry::Dialect::ansi("ansi")))
        .unwrap();
    assert_eq!(
        out.sql,
        "SELECT \"id\" FROM \"users\" WHERE EXISTS (SELECT \"posts\".\"user_id\" FROM \"posts\" AS \"posts\" \
         WHERE (\"posts\".\"user_id\" = \"users\".\"id\" AND \"posts\".\"published\" = ?))"
    );
    assert_eq!(out.params, vec![Value::from(true)]);
}

#[test]
fn plans_serialize_for_out_of_process_hydration() {
    let state = users_with_posts();
    let encoded = serde_json::to_value(state.plan()).unwrap();
    assert_eq!(encoded["rootPrimaryKey"], json!("id"));
    assert_eq!(encoded["relations"][0]["aliasPrefix"], json!("posts"));
    assert_eq!(encoded["relations"][0]["type"], json!("hasMany"));
    let decoded: quarry::HydrationPlan = serde_json::from_value(encoded).unwrap();
    assert_eq!(&decoded, state.plan());
}

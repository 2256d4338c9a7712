//! Tests for the tag query engine.

use serde_json::{json, Value};

use super::*;
use crate::record::records_from_value;

fn records(value: Value) -> Vec<Record> {
    records_from_value(&value).unwrap()
}

fn tagged_fixture() -> Vec<Record> {
    records(json!([
        {"key": "one", "tags": {"type": "text", "tests": ["test_1", "test_2"]}, "data": {"text": "a"}},
        {"key": "two", "tags": {"type": "json", "tests": "test_3"}, "data": {"json": {}}},
        {"key": "three", "data": {"text": "untagged"}}
    ]))
}

fn keys(records: &[Record]) -> Vec<&str> {
    records.iter().filter_map(|r| r["key"].as_str()).collect()
}

// ── Validation ──────────────────────────────────────────────

#[test]
fn empty_query_is_missing_operator() {
    let err = Query::from_value(&json!({})).unwrap_err();
    assert_eq!(err.to_string(), "query is missing an operator");
    assert!(matches!(Query::new(vec![]), Err(ForgeError::MissingOperator)));
}

#[test]
fn unknown_operator_is_rejected() {
    let err = Query::from_value(&json!({"StringNotEquals": {"type": "text"}})).unwrap_err();
    assert_eq!(err.to_string(), "unsupported query operator - StringNotEquals");
}

#[test]
fn condition_must_be_mapping() {
    let err = Query::from_value(&json!({"StringEquals": ["type"]})).unwrap_err();
    assert_eq!(
        err.to_string(),
        "the condition for operator StringEquals must be a mapping"
    );
}

#[test]
fn condition_values_must_be_strings() {
    let err = Query::from_value(&json!({"StringLike": {"tests": 1}})).unwrap_err();
    assert!(matches!(err, ForgeError::InvalidConditionValue { ref tag, .. } if tag == "tests"));
}

#[test]
fn deserializes_from_json() {
    let query: Query = serde_json::from_value(json!({"StringEquals": {"type": "text"}})).unwrap();
    assert_eq!(query, Query::string_equals([("type", "text")]));

    let bad: std::result::Result<Query, _> = serde_json::from_value(json!({}));
    assert!(bad.is_err());
}

#[test]
fn serializes_back_to_operator_mapping() {
    let query = Query::string_equals([("type", "text")]).and(Query::string_like([("tests", "test")]));
    let value = serde_json::to_value(&query).unwrap();
    assert_eq!(
        value,
        json!({"StringEquals": {"type": "text"}, "StringLike": {"tests": "test"}})
    );
}

#[test]
fn serializing_conflicting_conditions_fails() {
    let query = Query::string_equals([("type", "a")]).and(Query::string_equals([("type", "b")]));
    let input = records(json!([{"tags": {"type": "a"}}, {"tags": {"type": "b"}}]));
    assert!(query.filter(&input).unwrap().is_empty());

    let err = serde_json::to_value(&query).unwrap_err();
    assert!(err.to_string().contains("conflicting expected values"));

    let err = Value::try_from(&query).unwrap_err();
    assert!(matches!(err, ForgeError::ConflictingCondition { ref tag, .. } if tag == "type"));
}

#[test]
fn same_operator_clauses_merge_when_compatible() {
    let query = Query::string_equals([("type", "text")])
        .and(Query::string_equals([("tests", "test_1"), ("type", "text")]));
    let value = serde_json::to_value(&query).unwrap();
    assert_eq!(value, json!({"StringEquals": {"type": "text", "tests": "test_1"}}));

    let restored: Query = serde_json::from_value(value).unwrap();
    assert_eq!(
        keys(&restored.filter(&tagged_fixture()).unwrap()),
        keys(&query.filter(&tagged_fixture()).unwrap())
    );
}

// ── Matching ────────────────────────────────────────────────

#[test]
fn string_equals_conjunction() {
    let query = Query::from_value(&json!({"StringEquals": {"type": "text", "tests": "test_1"}})).unwrap();
    let out = query.filter(&tagged_fixture()).unwrap();
    assert_eq!(keys(&out), ["one"]);
}

#[test]
fn string_equals_list_tag_matches_any_item() {
    let query = Query::string_equals([("tests", "test_2")]);
    let out = query.filter(&tagged_fixture()).unwrap();
    assert_eq!(keys(&out), ["one"]);
}

#[test]
fn string_equals_is_exact() {
    let query = Query::string_equals([("type", "tex")]);
    assert!(query.filter(&tagged_fixture()).unwrap().is_empty());
}

#[test]
fn string_like_is_substring() {
    let query = Query::string_like([("tests", "test")]);
    let out = query.filter(&tagged_fixture()).unwrap();
    assert_eq!(keys(&out), ["one", "two"]);

    let query = Query::string_like([("tests", "_3")]);
    assert_eq!(keys(&query.filter(&tagged_fixture()).unwrap()), ["two"]);
}

#[test]
fn string_like_has_no_wildcards() {
    let query = Query::string_like([("tests", "test*")]);
    assert!(query.filter(&tagged_fixture()).unwrap().is_empty());
}

#[test]
fn operators_combine_with_and() {
    let query = Query::from_value(&json!({
        "StringLike": {"tests": "test"},
        "StringEquals": {"type": "json"}
    }))
    .unwrap();
    assert_eq!(keys(&query.filter(&tagged_fixture()).unwrap()), ["two"]);
}

#[test]
fn missing_tag_key_excludes_record() {
    let query = Query::string_equals([("owner", "me")]);
    assert!(query.filter(&tagged_fixture()).unwrap().is_empty());
}

#[test]
fn filter_returns_copies_and_leaves_input_alone() {
    let input = tagged_fixture();
    let mut out = Query::string_equals([("type", "text")]).filter(&input).unwrap();
    out[0].insert("key".into(), json!("changed"));
    assert_eq!(input[0]["key"], json!("one"));
}

#[test]
fn no_query_returns_everything() {
    let input = tagged_fixture();
    let out = filter_records(None, &input).unwrap();
    assert_eq!(out, input);
}

// ── Tag type errors ─────────────────────────────────────────

#[test]
fn non_string_tag_value_is_type_error() {
    let input = records(json!([{"tags": {"count": 3}}]));
    let err = Query::string_equals([("count", "3")]).filter(&input).unwrap_err();
    assert_eq!(err.to_string(), "the tag:count must be a string or a list of strings");
}

#[test]
fn non_string_list_item_is_type_error() {
    let input = records(json!([{"tags": {"tests": ["test_1", 2]}}]));
    let err = Query::string_like([("tests", "test")]).filter(&input).unwrap_err();
    assert_eq!(err.to_string(), "the tag:tests contains a non-string item");
}

#[test]
fn tags_must_be_a_mapping() {
    let input = records(json!([{"tags": ["a"]}]));
    let err = Query::string_like([("a", "a")]).filter(&input).unwrap_err();
    assert!(matches!(err, ForgeError::InvalidTags));
}

#[test]
fn records_removed_earlier_are_not_type_checked() {
    let input = records(json!([
        {"tags": {"type": "text", "n": "1"}},
        {"tags": {"type": "json", "n": 1}}
    ]));
    let query = Query::string_equals([("type", "text"), ("n", "1")]);
    assert_eq!(query.filter(&input).unwrap().len(), 1);
}

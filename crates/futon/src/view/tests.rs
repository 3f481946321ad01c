use crate::{
    test_support::FakeTransport,
    view::{ViewParseError, ViewResultParser},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::io::Cursor;

fn body(value: Value) -> Cursor<Vec<u8>> {
    Cursor::new(value.to_string().into_bytes())
}

#[derive(Debug, Deserialize, Eq, PartialEq)]
struct Person {
    name: String,
}

#[test]
fn parses_rows_total_and_boundaries() {
    let result = ViewResultParser::new()
        .parse::<Person, _>(body(json!({
            "total_rows": 12,
            "offset": 3,
            "rows": [
                { "key": "alice", "id": "doc-1", "value": { "name": "alice" } },
                { "key": "bob", "id": "doc-2", "value": { "name": "bob" } },
                { "key": "carol", "id": "doc-3", "value": { "name": "carol" } },
            ],
        })))
        .expect("result should parse");

    assert_eq!(result.len(), 3);
    assert_eq!(result.total_rows(), 12);
    assert_eq!(result.skipped(), 0);

    let first = result.first_boundary().expect("first boundary");
    assert_eq!(first.key(), &json!("alice"));
    assert_eq!(first.doc_id(), Some("doc-1"));

    let last = result.last_boundary().expect("last boundary");
    assert_eq!(last.key(), &json!("carol"));
    assert_eq!(last.doc_id(), Some("doc-3"));

    let names: Vec<&str> = result
        .rows()
        .iter()
        .map(|row| row.value().name.as_str())
        .collect();
    assert_eq!(names, ["alice", "bob", "carol"]);
}

#[test]
fn prefers_the_inline_doc_over_the_row_value() {
    let result = ViewResultParser::new()
        .parse::<Person, _>(body(json!({
            "total_rows": 1,
            "rows": [
                { "key": "a", "id": "doc-1", "value": "doc-1", "doc": { "name": "alice" } },
            ],
        })))
        .expect("result should parse");

    assert_eq!(result.rows()[0].value(), &Person { name: "alice".to_string() });
}

#[test]
fn defaults_total_rows_to_the_kept_row_count() {
    let result = ViewResultParser::new()
        .parse::<Value, _>(body(json!({
            "rows": [
                { "key": null, "value": 41 },
                { "key": null, "value": 1 },
            ],
        })))
        .expect("reduced result should parse");

    assert_eq!(result.total_rows(), 2);
    assert_eq!(result.first_boundary().expect("boundary").doc_id(), None);
}

#[test]
fn rejects_a_body_without_a_rows_array() {
    let err = ViewResultParser::new()
        .parse::<Value, _>(body(json!({ "total_rows": 3 })))
        .expect_err("missing rows must be fatal");

    assert!(matches!(err, ViewParseError::Malformed { .. }));
}

#[test]
fn rejects_trailing_garbage_after_the_envelope() {
    let raw = br#"{"total_rows":0,"rows":[]} trailing"#.to_vec();
    let err = ViewResultParser::new()
        .parse::<Value, _>(Cursor::new(raw))
        .expect_err("trailing garbage must be fatal");

    assert!(matches!(err, ViewParseError::Malformed { .. }));
}

#[test]
fn store_flagged_rows_are_fatal_by_default() {
    let err = ViewResultParser::new()
        .parse::<Value, _>(body(json!({
            "total_rows": 2,
            "rows": [
                { "key": "a", "id": "doc-1", "value": 1 },
                { "key": "b", "error": "not_found" },
            ],
        })))
        .expect_err("flagged row must be fatal");

    assert!(matches!(
        err,
        ViewParseError::RowError { index: 1, ref error } if error == "not_found"
    ));
}

#[test]
fn a_middle_row_that_fails_to_decode_is_skipped_when_configured() {
    let payload = json!({
        "total_rows": 3,
        "rows": [
            { "key": "a", "id": "doc-1", "value": { "name": "alice" } },
            { "key": "b", "id": "doc-2", "value": 7 },
            { "key": "c", "id": "doc-3", "value": { "name": "carol" } },
        ],
    });

    let lenient = ViewResultParser::new()
        .ignore_not_found(true)
        .parse::<Person, _>(body(payload.clone()))
        .expect("lenient parse should succeed");
    assert_eq!(lenient.len(), 2);
    assert_eq!(lenient.skipped(), 1);
    assert_eq!(
        lenient.first_boundary().expect("boundary").doc_id(),
        Some("doc-1")
    );
    assert_eq!(
        lenient.last_boundary().expect("boundary").doc_id(),
        Some("doc-3")
    );

    let err = ViewResultParser::new()
        .parse::<Person, _>(body(payload))
        .expect_err("strict parse must fail");
    assert!(matches!(err, ViewParseError::RowDecode { index: 1, .. }));
}

#[test]
fn skipped_rows_shift_the_boundaries_to_kept_rows() {
    let result = ViewResultParser::new()
        .ignore_not_found(true)
        .parse::<Person, _>(body(json!({
            "total_rows": 3,
            "rows": [
                { "key": "a", "id": "doc-1", "error": "not_found" },
                { "key": "b", "id": "doc-2", "value": { "name": "bob" } },
                { "key": "c", "id": "doc-3", "error": "not_found" },
            ],
        })))
        .expect("lenient parse should succeed");

    assert_eq!(result.len(), 1);
    assert_eq!(result.skipped(), 2);
    assert_eq!(
        result.first_boundary().expect("boundary").doc_id(),
        Some("doc-2")
    );
    assert_eq!(
        result.last_boundary().expect("boundary").doc_id(),
        Some("doc-2")
    );
}

#[test]
fn resolves_document_id_values_through_a_batch_fetch() {
    let transport = FakeTransport::new(Vec::new()).with_docs([
        ("doc-1".to_string(), json!({ "name": "alice" })),
        ("doc-2".to_string(), json!({ "name": "bob" })),
    ]);

    let result = ViewResultParser::new()
        .parse_resolving::<Person, _, _>(
            body(json!({
                "total_rows": 2,
                "rows": [
                    { "key": "a", "id": "doc-1", "value": "doc-1" },
                    { "key": "b", "id": "doc-2", "value": "doc-2" },
                ],
            })),
            &transport,
        )
        .expect("references should resolve");

    let names: Vec<&str> = result
        .rows()
        .iter()
        .map(|row| row.value().name.as_str())
        .collect();
    assert_eq!(names, ["alice", "bob"]);
}

#[test]
fn rejects_reference_rows_whose_value_is_not_an_id() {
    let transport = FakeTransport::new(Vec::new());
    let err = ViewResultParser::new()
        .parse_resolving::<Person, _, _>(
            body(json!({
                "total_rows": 1,
                "rows": [{ "key": "a", "id": "doc-1", "value": 42 }],
            })),
            &transport,
        )
        .expect_err("non-string reference must be rejected");

    assert!(matches!(
        err,
        crate::Error::Parse(ViewParseError::NotAReference { index: 0 })
    ));
}

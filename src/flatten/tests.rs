//! Flattening tests

use super::*;
use crate::crm::MergedRecord;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn record(id: &str, properties: serde_json::Value) -> MergedRecord {
    let mut record = MergedRecord::new(id);
    if let serde_json::Value::Object(map) = properties {
        record.properties = map;
    }
    record
}

#[test_case(json!({"value": "x"}), Cell::Text("x".into()); "wrapped string")]
#[test_case(json!({"value": 5}), Cell::Number(5.into()); "wrapped number")]
#[test_case(json!({"value": null}), Cell::Null; "wrapped null")]
#[test_case(json!("plain"), Cell::Text("plain".into()); "string")]
#[test_case(json!(true), Cell::Bool(true); "bool")]
#[test_case(json!(null), Cell::Null; "null")]
fn test_flatten_scalar_like(raw: serde_json::Value, expected: Cell) {
    assert_eq!(flatten_value(FieldValue::from(raw)), expected);
}

#[test]
fn test_wrapped_complex_value_becomes_json() {
    let cell = flatten_value(FieldValue::from(json!({"value": {"a": 1}})));
    assert_eq!(cell, Cell::Text(r#"{"a":1}"#.to_string()));
}

#[test]
fn test_complex_values_round_trip() {
    for raw in [
        json!({"value": 1, "label": "One"}),
        json!({"other": "x"}),
        json!([1, "two", {"three": 3}]),
        json!({}),
    ] {
        let Cell::Text(text) = flatten_value(FieldValue::from(raw.clone())) else {
            panic!("expected text for {raw}");
        };
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, raw);
    }
}

#[test]
fn test_flatten_record_id_and_fields() {
    let row = flatten_record(&record(
        "101",
        json!({
            "email": "a@example.com",
            "score": {"value": 7},
            "tags": ["x", "y"]
        }),
    ));

    assert_eq!(row.id(), "101");
    assert_eq!(row.get("id"), Some(Cell::Text("101".into())));
    assert_eq!(row.get("email"), Some(Cell::Text("a@example.com".into())));
    assert_eq!(row.get("score"), Some(Cell::Number(7.into())));
    assert_eq!(row.get("tags"), Some(Cell::Text(r#"["x","y"]"#.into())));
    assert_eq!(row.get("missing"), None);
    assert_eq!(
        row.columns().collect::<Vec<_>>(),
        vec!["id", "email", "score", "tags"]
    );
}

#[test]
fn test_property_named_id_does_not_override_identifier() {
    let row = flatten_record(&record("1", json!({"id": "spoofed", "name": "n"})));
    assert_eq!(row.id(), "1");
    assert_eq!(row.get("id"), Some(Cell::Text("1".into())));
    assert_eq!(row.len(), 2);
}

#[test]
fn test_field_order_does_not_matter() {
    let a = flatten_record(&record("1", json!({"a": 1, "b": {"value": 2}})));
    let b = flatten_record(&record("1", json!({"b": {"value": 2}, "a": 1})));
    assert_eq!(a, b);
}

#[test]
fn test_cell_numeric_views() {
    assert_eq!(Cell::Text("42".into()).as_i64(), Some(42));
    assert_eq!(Cell::Text("4.5".into()).as_i64(), None);
    assert_eq!(Cell::Text("4.5".into()).as_f64(), Some(4.5));
    assert_eq!(Cell::Text("NaN".into()).as_f64(), None);
    assert_eq!(Cell::Number(serde_json::Number::from_f64(1.5).unwrap()).as_f64(), Some(1.5));
    assert_eq!(Cell::Bool(true).as_i64(), None);
    assert_eq!(Cell::Text("1500.00".into()).as_f64(), Some(1500.0));
    assert_eq!(Cell::Text("-2.5e3".into()).as_f64(), Some(-2500.0));
    assert!(Cell::Text(String::new()).is_blank());
    assert!(Cell::Null.is_blank());
    assert_eq!(Cell::Null.to_text(), None);
    assert_eq!(Cell::Bool(false).to_text(), Some("false".into()));
}

#[test_case("+15551234567"; "leading plus")]
#[test_case("02134"; "leading zero")]
#[test_case("007.5"; "leading zero decimal")]
#[test_case("1."; "bare point")]
#[test_case(".5"; "no integer part")]
#[test_case("12345678901234567890"; "beyond i64")]
#[test_case("0.12345678901234567"; "beyond f64 digits")]
#[test_case("1_000"; "separator")]
fn test_lossy_numeric_text_stays_text(text: &str) {
    let cell = Cell::Text(text.to_string());
    assert_eq!(cell.as_i64(), None);
    assert_eq!(cell.as_f64(), None);
}

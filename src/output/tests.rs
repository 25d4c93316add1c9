//! Tests for output module

use super::*;
use crate::flatten::{Cell, FlatRow};
use crate::schema::{infer_schema, Column, ColumnType, TableSchema};
use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn sample_rows() -> Vec<FlatRow> {
    let mut first = FlatRow::new("1");
    first.insert("amount", Cell::Text("10".into()));
    first.insert("name", Cell::Text("Acme, Inc.".into()));
    first.insert("ratio", Cell::Text("0.5".into()));

    let mut second = FlatRow::new("2");
    second.insert("amount", Cell::Null);
    second.insert("ratio", Cell::Number(2.into()));

    vec![first, second]
}

// ============================================================================
// CSV
// ============================================================================

#[test]
fn test_write_csv_header_and_rows() {
    let dir = tempdir().unwrap();
    let rows = sample_rows();
    let schema = infer_schema(&rows);

    let path = write_csv(dir.path(), "companies", &rows, &schema).unwrap();
    assert_eq!(path, dir.path().join("companies.csv"));

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "id,amount,name,ratio",
            "1,10,\"Acme, Inc.\",0.5",
            "2,,,2",
        ]
    );
}

#[test]
fn test_write_csv_creates_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("out").join("nested");
    let rows = sample_rows();

    let path = write_csv(&nested, "deals", &rows, &infer_schema(&rows)).unwrap();
    assert!(path.exists());

    let mut reader = csv::Reader::from_path(&path).unwrap();
    assert_eq!(reader.records().count(), 2);
}

#[test]
fn test_write_csv_round_trips_json_text() {
    let dir = tempdir().unwrap();
    let mut row = FlatRow::new("7");
    row.insert("meta", Cell::Text(r#"{"a":"x,y","b":[1,2]}"#.into()));
    let rows = vec![row];

    let path = write_csv(dir.path(), "notes", &rows, &infer_schema(&rows)).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let record = reader.records().next().unwrap().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&record[1]).unwrap();
    assert_eq!(parsed, serde_json::json!({"a": "x,y", "b": [1, 2]}));
}

// ============================================================================
// RecordBatch
// ============================================================================

#[test]
fn test_rows_to_batch_types_and_nulls() {
    let rows = sample_rows();
    let schema = infer_schema(&rows);
    let batch = rows_to_batch(&rows, &schema).unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 4);

    let arrow_schema = batch.schema();
    assert_eq!(arrow_schema.field(0).name(), "id");
    assert_eq!(arrow_schema.field(0).data_type(), &DataType::Int64);
    assert_eq!(arrow_schema.field(1).data_type(), &DataType::Int64);
    assert_eq!(arrow_schema.field(2).data_type(), &DataType::Utf8);
    assert_eq!(arrow_schema.field(3).data_type(), &DataType::Float64);
    assert!(!arrow_schema.field(2).is_nullable());

    let amount = batch.column(1).as_any().downcast_ref::<Int64Array>().unwrap();
    assert_eq!(amount.value(0), 10);
    assert!(amount.is_null(1));

    let name = batch.column(2).as_any().downcast_ref::<StringArray>().unwrap();
    assert_eq!(name.value(0), "Acme, Inc.");
    assert_eq!(name.value(1), "");
    assert_eq!(name.null_count(), 0);

    let ratio = batch.column(3).as_any().downcast_ref::<Float64Array>().unwrap();
    assert_eq!(ratio.value(0), 0.5);
    assert_eq!(ratio.value(1), 2.0);
}

#[test]
fn test_rows_to_batch_empty_schema() {
    let batch = rows_to_batch(&[], &TableSchema::new()).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 0);
}

#[test]
fn test_arrow_schema_nullability() {
    let mut schema = TableSchema::new();
    schema.push(Column::new("id", ColumnType::String));
    schema.push(Column::new("n", ColumnType::Int64));

    let arrow = arrow_schema(&schema);
    assert!(!arrow.field(0).is_nullable());
    assert!(arrow.field(1).is_nullable());
    assert_eq!(arrow_type(ColumnType::Float64), DataType::Float64);
}

#[test]
fn test_phone_and_zip_text_loads_verbatim() {
    let mut row = FlatRow::new("1");
    row.insert("phone", Cell::Text("+15551234567".into()));
    row.insert("zip", Cell::Text("02134".into()));
    let rows = vec![row];

    let schema = infer_schema(&rows);
    assert_eq!(schema.type_of("phone"), Some(ColumnType::String));
    assert_eq!(schema.type_of("zip"), Some(ColumnType::String));

    let batch = rows_to_batch(&rows, &schema).unwrap();
    let phone = batch
        .column_by_name("phone")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    let zip = batch
        .column_by_name("zip")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(phone.value(0), "+15551234567");
    assert_eq!(zip.value(0), "02134");
}

#[test]
fn test_arrow_field_names_are_sanitized() {
    let mut row = FlatRow::new("1");
    row.insert("deal`stage", Cell::Text("won".into()));
    let mut schema = TableSchema::new();
    schema.push(Column::new("id", ColumnType::String));
    schema.push(Column::new("deal`stage", ColumnType::String));

    assert_eq!(arrow_schema(&schema).field(1).name(), "dealstage");

    let batch = rows_to_batch(&[row], &schema).unwrap();
    let stage = batch
        .column_by_name("dealstage")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(stage.value(0), "won");
}

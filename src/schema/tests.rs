//! Schema inference tests

use super::*;
use crate::flatten::{Cell, FlatRow};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn text(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Cell::Text((*v).to_string())).collect()
}

fn row(id: &str, fields: &[(&str, Cell)]) -> FlatRow {
    let mut row = FlatRow::new(id);
    for (name, cell) in fields {
        row.insert(*name, cell.clone());
    }
    row
}

#[test_case(&["1", "2", "3"], ColumnType::Int64; "integers")]
#[test_case(&["1", "2.5"], ColumnType::Float64; "mixed numeric")]
#[test_case(&["1", "abc"], ColumnType::String; "mixed text")]
#[test_case(&["-9223372036854775808"], ColumnType::Int64; "i64 min")]
#[test_case(&["9223372036854775808"], ColumnType::String; "beyond i64")]
#[test_case(&["+15551234567", "+442071234567"], ColumnType::String; "phone numbers")]
#[test_case(&["02134", "10001"], ColumnType::String; "zip codes")]
#[test_case(&["1500.00", "20"], ColumnType::Float64; "trailing zeros")]
#[test_case(&["1e3"], ColumnType::Float64; "exponent")]
#[test_case(&["inf"], ColumnType::String; "infinite")]
#[test_case(&[" 1"], ColumnType::String; "padded")]
#[test_case(&["", "4"], ColumnType::Int64; "empty is null")]
#[test_case(&[""], ColumnType::String; "all empty")]
#[test_case(&[], ColumnType::String; "no values")]
fn test_infer_text_column(values: &[&str], expected: ColumnType) {
    assert_eq!(infer_column_type(&text(values)), expected);
}

#[test]
fn test_infer_native_cells() {
    let cells = vec![Cell::Number(3.into()), Cell::Null, Cell::Text("4".into())];
    assert_eq!(infer_column_type(&cells), ColumnType::Int64);

    let floats = vec![
        Cell::Number(serde_json::Number::from_f64(0.5).unwrap()),
        Cell::Number(1.into()),
    ];
    assert_eq!(infer_column_type(&floats), ColumnType::Float64);

    assert_eq!(infer_column_type(&[Cell::Bool(true)]), ColumnType::String);
    assert_eq!(infer_column_type(&[Cell::Null, Cell::Null]), ColumnType::String);
}

#[test]
fn test_schema_order_and_types() {
    let rows = vec![
        row("1", &[("zeta", Cell::Text("a".into())), ("amount", Cell::Text("10".into()))]),
        row("2", &[("amount", Cell::Text("2.5".into())), ("empty", Cell::Null)]),
    ];

    let schema = infer_schema(&rows);
    assert_eq!(
        schema.columns,
        vec![
            Column::new("id", ColumnType::Int64),
            Column::new("amount", ColumnType::Float64),
            Column::new("empty", ColumnType::String),
            Column::new("zeta", ColumnType::String),
        ]
    );
    assert_eq!(schema.type_of("amount"), Some(ColumnType::Float64));
    assert_eq!(schema.type_of("missing"), None);
}

#[test]
fn test_schema_is_deterministic() {
    let rows = vec![
        row("a", &[("x", Cell::Text("1".into()))]),
        row("b", &[("y", Cell::Bool(false)), ("x", Cell::Text("2".into()))]),
    ];
    let first = infer_schema(&rows);
    let second = infer_schema(&rows);
    assert_eq!(first, second);
    assert_eq!(first.names().collect::<Vec<_>>(), vec!["id", "x", "y"]);
}

#[test]
fn test_empty_rows_give_empty_schema() {
    let schema = infer_schema(&[]);
    assert!(schema.is_empty());
    assert_eq!(SchemaInferrer::new().row_count(), 0);
}

#[test]
fn test_merge_with() {
    assert_eq!(ColumnType::Int64.merge_with(ColumnType::Float64), ColumnType::Float64);
    assert_eq!(ColumnType::Float64.merge_with(ColumnType::Int64), ColumnType::Float64);
    assert_eq!(ColumnType::Int64.merge_with(ColumnType::String), ColumnType::String);
    assert_eq!(ColumnType::Int64.merge_with(ColumnType::Int64), ColumnType::Int64);
    assert!(ColumnType::Float64.is_numeric());
    assert!(!ColumnType::String.is_numeric());
}

//! Flat rows to Arrow RecordBatch conversion

use crate::error::{Error, Result};
use crate::flatten::FlatRow;
use crate::schema::{ColumnType, TableSchema};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Arrow data type for a column type
pub fn arrow_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Int64 => DataType::Int64,
        ColumnType::Float64 => DataType::Float64,
        ColumnType::String => DataType::Utf8,
    }
}

/// Arrow schema for a table schema
///
/// Field names are the sanitized column identifiers used in destination DDL.
/// Numeric columns are nullable; string columns are not, since their nulls
/// are loaded as empty strings.
pub fn arrow_schema(schema: &TableSchema) -> Schema {
    let fields: Vec<Field> = schema
        .columns
        .iter()
        .map(|column| {
            Field::new(
                column.identifier(),
                arrow_type(column.column_type),
                column.column_type.is_numeric(),
            )
        })
        .collect();
    Schema::new(fields)
}

/// Convert rows into a single RecordBatch laid out by `schema`
pub fn rows_to_batch(rows: &[FlatRow], schema: &TableSchema) -> Result<RecordBatch> {
    let arrow_schema = Arc::new(arrow_schema(schema));
    if schema.is_empty() {
        return Ok(RecordBatch::new_empty(arrow_schema));
    }

    let columns: Vec<ArrayRef> = schema
        .columns
        .iter()
        .map(|column| build_array(rows, &column.name, column.column_type))
        .collect();

    RecordBatch::try_new(arrow_schema, columns)
        .map_err(|e| Error::output(format!("Failed to create RecordBatch: {e}")))
}

fn build_array(rows: &[FlatRow], name: &str, column_type: ColumnType) -> ArrayRef {
    match column_type {
        ColumnType::Int64 => {
            let arr: Int64Array = rows
                .iter()
                .map(|row| row.get(name).and_then(|cell| cell.as_i64()))
                .collect();
            Arc::new(arr)
        }
        ColumnType::Float64 => {
            let arr: Float64Array = rows
                .iter()
                .map(|row| row.get(name).and_then(|cell| cell.as_f64()))
                .collect();
            Arc::new(arr)
        }
        ColumnType::String => {
            let arr: StringArray = rows
                .iter()
                .map(|row| Some(row.get(name).and_then(|cell| cell.to_text()).unwrap_or_default()))
                .collect();
            Arc::new(arr)
        }
    }
}

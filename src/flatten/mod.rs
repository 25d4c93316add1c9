//! Record flattening
//!
//! Turns merged records into flat rows. Each field is handled on its own:
//!
//! - `{"value": X}` with exactly one key unwraps to `X`
//! - any other mapping, and any sequence, becomes compact JSON text
//! - scalars are kept as they are

mod types;

pub use types::{Cell, FieldValue, FlatRow, ID_COLUMN};

use crate::crm::MergedRecord;
use crate::types::JsonValue;

/// Key of the single-value envelope
const VALUE_KEY: &str = "value";

/// Flatten one field value into a cell
pub fn flatten_value(value: FieldValue) -> Cell {
    match value {
        FieldValue::Scalar(scalar) => Cell::from_json(scalar),
        FieldValue::Mapping(mut map) if map.len() == 1 && map.contains_key(VALUE_KEY) => {
            Cell::from_json(map.remove(VALUE_KEY).unwrap_or(JsonValue::Null))
        }
        FieldValue::Mapping(map) => Cell::Text(JsonValue::Object(map).to_string()),
        FieldValue::Sequence(items) => Cell::Text(JsonValue::Array(items).to_string()),
    }
}

/// Flatten a merged record into a row
pub fn flatten_record(record: &MergedRecord) -> FlatRow {
    let mut row = FlatRow::new(record.id.clone());
    for (key, value) in &record.properties {
        row.insert(key.clone(), flatten_value(FieldValue::from(value.clone())));
    }
    row
}

/// Flatten all records, preserving order
pub fn flatten_records(records: &[MergedRecord]) -> Vec<FlatRow> {
    records.iter().map(flatten_record).collect()
}

#[cfg(test)]
mod tests;

//! Schema inference module
//!
//! Derives destination column types from flattened rows.
//!
//! # Features
//!
//! - **Type Inference**: integer, float or string per column
//! - **Text Parsing**: numeric text counts as numeric
//! - **Deterministic Order**: `id` first, remaining columns sorted

mod inference;
mod types;

pub use inference::{infer_cell_type, infer_column_type, infer_schema, SchemaInferrer};
pub use types::{sanitize_identifier, Column, ColumnType, TableSchema};

#[cfg(test)]
mod tests;

//! Output module
//!
//! Handles CSV artifacts and Arrow RecordBatch creation.
//!
//! # Overview
//!
//! - [`write_csv`] writes the per-object CSV file
//! - [`rows_to_batch`] lays flat rows out as a columnar batch for loading

mod batch;
mod writer;

pub use self::batch::{arrow_schema, arrow_type, rows_to_batch};
pub use self::writer::{csv_path, write_csv};

#[cfg(test)]
mod tests;

//! CSV artifact writer
//!
//! One UTF-8 file per object type, written before any destination load.

use crate::error::{Error, Result};
use crate::flatten::FlatRow;
use crate::schema::TableSchema;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path of the CSV artifact for an object type
pub fn csv_path(dir: &Path, object: &str) -> PathBuf {
    dir.join(format!("{object}.csv"))
}

/// Write rows to `<dir>/<object>.csv`, creating `dir` if needed
///
/// Columns follow the schema order; missing and null cells are empty fields.
/// Returns the path written.
pub fn write_csv(dir: &Path, object: &str, rows: &[FlatRow], schema: &TableSchema) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| {
        Error::output(format!("Failed to create output directory {}: {e}", dir.display()))
    })?;

    let path = csv_path(dir, object);
    let mut writer = csv::Writer::from_path(&path)?;

    if !schema.is_empty() {
        writer.write_record(schema.names())?;
    }

    for row in rows {
        let record: Vec<String> = schema
            .names()
            .map(|name| row.get(name).and_then(|cell| cell.to_text()).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    debug!(path = %path.display(), rows = rows.len(), "CSV written");

    Ok(path)
}

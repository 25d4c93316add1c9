//! Identifier cross-matching over extracted CSV files
//!
//! For every CSV in a directory that has an `id` column (matched
//! case-insensitively), its non-empty id values are compared against every
//! column of every other CSV. A column sharing at least one value is reported
//! as a relationship together with the number of distinct shared values.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File the results are written to, inside the scanned directory
pub const RELATIONSHIPS_FILE: &str = "relationships_found.csv";

/// Distinct non-empty values of every column of one CSV file
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub file: String,
    pub headers: Vec<String>,
    pub values: Vec<HashSet<String>>,
}

impl CsvTable {
    /// Read a CSV file
    pub fn read(path: &Path) -> Result<Self> {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::output(format!("Not a file: {}", path.display())))?;

        let mut reader = csv::Reader::from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut values = vec![HashSet::new(); headers.len()];

        for record in reader.records() {
            let record = record?;
            for (column, value) in record.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                if let Some(set) = values.get_mut(column) {
                    set.insert(value.to_string());
                }
            }
        }

        Ok(Self {
            file,
            headers,
            values,
        })
    }

    /// Index and name of the first column named `id`, ignoring case
    pub fn id_column(&self) -> Option<(usize, &str)> {
        self.headers
            .iter()
            .enumerate()
            .find(|(_, name)| name.eq_ignore_ascii_case("id"))
            .map(|(index, name)| (index, name.as_str()))
    }
}

/// One discovered relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "File 1")]
    pub file: String,
    #[serde(rename = "File 1 ID Column")]
    pub id_column: String,
    #[serde(rename = "File 2")]
    pub other_file: String,
    #[serde(rename = "File 2 Column")]
    pub other_column: String,
    #[serde(rename = "Match Count")]
    pub match_count: usize,
}

/// Compare every table's id values against every column of the others
pub fn find_relationships(tables: &[CsvTable]) -> Vec<Relationship> {
    let mut found = Vec::new();

    for table in tables {
        let Some((id_index, id_name)) = table.id_column() else {
            debug!(file = %table.file, "No id column");
            continue;
        };
        let ids = &table.values[id_index];

        for other in tables.iter().filter(|t| t.file != table.file) {
            for (column, values) in other.headers.iter().zip(&other.values) {
                let match_count = ids.intersection(values).count();
                if match_count > 0 {
                    found.push(Relationship {
                        file: table.file.clone(),
                        id_column: id_name.to_string(),
                        other_file: other.file.clone(),
                        other_column: column.clone(),
                        match_count,
                    });
                }
            }
        }
    }

    found
}

/// Result of scanning a directory
#[derive(Debug, Clone, Default)]
pub struct RelationshipScan {
    pub relationships: Vec<Relationship>,
    pub files_scanned: usize,
    pub files_skipped: usize,
    /// Where results were written; `None` when nothing matched
    pub output: Option<PathBuf>,
}

/// Read every CSV in `dir` once, in name order
///
/// Unreadable files are skipped with a warning. The results file itself is
/// never read as input.
pub fn load_tables(dir: &Path) -> Result<(Vec<CsvTable>, usize)> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| Error::output(format!("Failed to read directory {}: {e}", dir.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
                && path.file_name().is_some_and(|name| name != RELATIONSHIPS_FILE)
        })
        .collect();
    paths.sort();

    let mut tables = Vec::with_capacity(paths.len());
    let mut skipped = 0;
    for path in paths {
        match CsvTable::read(&path) {
            Ok(table) => tables.push(table),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping file due to read error");
                skipped += 1;
            }
        }
    }

    Ok((tables, skipped))
}

/// Write relationships to `<dir>/relationships_found.csv`
pub fn write_relationships(dir: &Path, relationships: &[Relationship]) -> Result<PathBuf> {
    let path = dir.join(RELATIONSHIPS_FILE);
    let mut writer = csv::Writer::from_path(&path)?;
    for relationship in relationships {
        writer.serialize(relationship)?;
    }
    writer.flush()?;
    Ok(path)
}

/// Scan a directory, find relationships and write them when any exist
pub fn discover(dir: &Path) -> Result<RelationshipScan> {
    let (tables, files_skipped) = load_tables(dir)?;
    let relationships = find_relationships(&tables);

    let output = if relationships.is_empty() {
        info!(dir = %dir.display(), "No relationships found");
        None
    } else {
        let path = write_relationships(dir, &relationships)?;
        info!(
            path = %path.display(),
            count = relationships.len(),
            "Relationships found"
        );
        Some(path)
    };

    Ok(RelationshipScan {
        relationships,
        files_scanned: tables.len(),
        files_skipped,
        output,
    })
}

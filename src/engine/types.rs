//! Engine types
//!
//! Per-object outcomes and the run summary.

use std::fmt;
use std::path::PathBuf;

/// How one object type's pipeline ended
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectOutcome {
    /// Records fetched, CSV written and table loaded
    Loaded {
        records: usize,
        csv_path: PathBuf,
        rows_inserted: u64,
    },
    /// Records fetched and CSV written; loading was disabled
    Extracted { records: usize, csv_path: PathBuf },
    /// Nothing to do for this object type
    Skipped { reason: String },
    /// The pipeline failed; other object types are unaffected
    Failed { error: String },
}

impl ObjectOutcome {
    /// Create a skipped outcome
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Create a failed outcome
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    /// Records fetched, zero unless the pipeline got as far as writing a CSV
    pub fn records(&self) -> usize {
        match self {
            Self::Loaded { records, .. } | Self::Extracted { records, .. } => *records,
            _ => 0,
        }
    }

    /// Check if this is a loaded outcome
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    /// Check if this is an extracted outcome
    pub fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }

    /// Check if this is a skipped outcome
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Check if this is a failed outcome
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for ObjectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded {
                records,
                csv_path,
                rows_inserted,
            } => write!(
                f,
                "loaded {rows_inserted} rows ({records} records, saved {})",
                csv_path.display()
            ),
            Self::Extracted { records, csv_path } => {
                write!(f, "extracted {records} records (saved {})", csv_path.display())
            }
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
            Self::Failed { error } => write!(f, "failed: {error}"),
        }
    }
}

/// Outcome of one object type with timing
#[derive(Debug, Clone)]
pub struct ObjectReport {
    pub object: String,
    pub outcome: ObjectOutcome,
    pub duration_ms: u64,
}

/// Statistics from a whole run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Reports in completion order
    pub reports: Vec<ObjectReport>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    /// Report for an object type
    pub fn get(&self, object: &str) -> Option<&ObjectReport> {
        self.reports.iter().find(|r| r.object == object)
    }

    /// Number of loaded object types
    pub fn loaded(&self) -> usize {
        self.count(ObjectOutcome::is_loaded)
    }

    /// Number of extracted-only object types
    pub fn extracted(&self) -> usize {
        self.count(ObjectOutcome::is_extracted)
    }

    /// Number of skipped object types
    pub fn skipped(&self) -> usize {
        self.count(ObjectOutcome::is_skipped)
    }

    /// Number of failed object types
    pub fn failed(&self) -> usize {
        self.count(ObjectOutcome::is_failed)
    }

    /// Records fetched across all object types
    pub fn total_records(&self) -> usize {
        self.reports.iter().map(|r| r.outcome.records()).sum()
    }

    /// One-line summary printed at the end of a run
    pub fn summary_line(&self) -> String {
        format!(
            "All objects processed: {} loaded, {} extracted, {} skipped, {} failed ({} records in {:.1}s)",
            self.loaded(),
            self.extracted(),
            self.skipped(),
            self.failed(),
            self.total_records(),
            self.duration_ms as f64 / 1000.0
        )
    }

    fn count(&self, predicate: fn(&ObjectOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

//! Accumulates partial per-chunk records into full records

use super::types::{record_id, MergedRecord};
use crate::types::JsonValue;
use std::collections::HashMap;

/// Outcome of merging one raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First time this identifier was seen
    Inserted,
    /// Fields added to an existing record
    Updated,
    /// Record had no usable identifier
    Dropped,
}

/// Merges partial records by identifier, keeping first-seen order
///
/// A field returned by more than one chunk for the same record keeps the
/// value from the chunk processed last.
#[derive(Debug, Default)]
pub struct RecordMerger {
    index: HashMap<String, usize>,
    records: Vec<MergedRecord>,
    dropped: usize,
}

impl RecordMerger {
    /// Create an empty merger
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one raw API record (`{id, properties: {...}}`)
    pub fn merge(&mut self, raw: &JsonValue) -> MergeOutcome {
        let Some(id) = record_id(raw) else {
            self.dropped += 1;
            return MergeOutcome::Dropped;
        };

        let (slot, outcome) = match self.index.get(&id) {
            Some(&slot) => (slot, MergeOutcome::Updated),
            None => {
                let slot = self.records.len();
                self.index.insert(id.clone(), slot);
                self.records.push(MergedRecord::new(id));
                (slot, MergeOutcome::Inserted)
            }
        };

        if let Some(JsonValue::Object(properties)) = raw.get("properties") {
            let target = &mut self.records[slot].properties;
            for (key, value) in properties {
                target.insert(key.clone(), value.clone());
            }
        }

        outcome
    }

    /// Number of distinct records seen
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no records were merged
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records dropped for lack of an identifier
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Finish merging and hand out the records
    pub fn into_records(self) -> Vec<MergedRecord> {
        self.records
    }
}

//! Pagination types
//!
//! Defines the state tracked while walking one paginated query.

use serde_json::Value;
use std::collections::HashSet;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available, request the next one with this cursor
    Continue {
        /// Opaque cursor for the next request
        cursor: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a cursor
    pub fn with_cursor(cursor: impl Into<String>) -> Self {
        Self::Continue {
            cursor: cursor.into(),
        }
    }
}

/// Tracks pagination state for one query
///
/// A fresh state is used for every property chunk: cursors from one chunk's
/// query are meaningless for another's.
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages processed so far
    pub page: u32,
    /// Cursor for the next request, if any
    pub cursor: Option<String>,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
    /// Every cursor handed out so far
    seen_cursors: HashSet<String>,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete and drop the cursor
    pub fn mark_done(&mut self) {
        self.done = true;
        self.cursor = None;
    }

    /// Increment page number
    pub fn next_page(&mut self) {
        self.page += 1;
    }

    /// Add to total fetched
    pub fn add_fetched(&mut self, count: u64) {
        self.total_fetched += count;
    }

    /// Record a cursor, returning `false` if it was already handed out
    pub fn set_cursor(&mut self, cursor: String) -> bool {
        let fresh = self.seen_cursors.insert(cursor.clone());
        self.cursor = Some(cursor);
        fresh
    }
}

/// Extract a value from a dotted path (`paging.next.after` or `$.paging.next.after`)
pub fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// Extract a path and render it as a string (strings verbatim, numbers as text)
pub fn extract_string(value: &Value, path: &str) -> Option<String> {
    match extract_path(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

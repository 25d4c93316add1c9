//! Cursor pagination
//!
//! The CRM API returns `paging.next.after` while more pages exist and omits
//! it on the last page.

use super::types::{extract_string, NextPage, PaginationState};
use serde_json::Value;
use tracing::warn;

/// Default JSON path of the continuation cursor
pub const DEFAULT_CURSOR_PATH: &str = "paging.next.after";

/// Default query parameter carrying the cursor
pub const DEFAULT_CURSOR_PARAM: &str = "after";

/// Cursor-based pagination
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Query parameter name for cursor
    pub cursor_param: String,
    /// Path to extract cursor from response
    pub cursor_path: String,
}

impl Default for CursorPaginator {
    fn default() -> Self {
        Self::new(DEFAULT_CURSOR_PARAM, DEFAULT_CURSOR_PATH)
    }
}

impl CursorPaginator {
    /// Create a new cursor paginator
    pub fn new(cursor_param: impl Into<String>, cursor_path: impl Into<String>) -> Self {
        Self {
            cursor_param: cursor_param.into(),
            cursor_path: cursor_path.into(),
        }
    }

    /// Query parameters for the next request of this query
    pub fn params(&self, state: &PaginationState) -> Vec<(String, String)> {
        state
            .cursor
            .as_ref()
            .map(|cursor| vec![(self.cursor_param.clone(), cursor.clone())])
            .unwrap_or_default()
    }

    /// Process a response and determine if there's a next page
    ///
    /// Ends the query when the cursor is absent or empty, or when the API
    /// hands back a cursor it already returned.
    pub fn process_response(
        &self,
        body: &Value,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.next_page();
        state.add_fetched(records_count as u64);

        let Some(cursor) = extract_string(body, &self.cursor_path) else {
            state.mark_done();
            return NextPage::Done;
        };

        if cursor.is_empty() {
            state.mark_done();
            return NextPage::Done;
        }

        if !state.set_cursor(cursor.clone()) {
            warn!(
                cursor = %cursor,
                page = state.page,
                "Pagination cursor repeated, stopping"
            );
            state.mark_done();
            return NextPage::Done;
        }

        NextPage::with_cursor(cursor)
    }
}

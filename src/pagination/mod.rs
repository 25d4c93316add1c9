//! Pagination module
//!
//! # Overview
//!
//! Cursor pagination for the CRM object endpoints. Each paginated query gets
//! its own [`PaginationState`]; the [`CursorPaginator`] extracts the next
//! cursor from a response and decides when the query is complete.

mod cursor;
mod types;

pub use cursor::{CursorPaginator, DEFAULT_CURSOR_PARAM, DEFAULT_CURSOR_PATH};
pub use types::{extract_path, extract_string, NextPage, PaginationState};

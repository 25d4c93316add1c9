// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # CRM Loader
//!
//! Extracts CRM objects over a paginated REST API, flattens them into rows,
//! infers a column schema, writes one CSV file per object type and loads the
//! rows into an analytical store.
//!
//! ## Features
//!
//! - **Chunked Extraction**: Properties requested in bounded chunks, records
//!   merged by identifier across chunks
//! - **Resilient Transport**: Retries with backoff and a client-side rate limit
//! - **Schema Inference**: Int64, Float64 or String per column
//! - **Destinations**: ClickHouse over HTTP, embedded DuckDB
//! - **Isolation**: Object types run concurrently; one failure never stops the others
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crm_loader::config::AppConfig;
//! use crm_loader::destination::factory_for;
//! use crm_loader::engine::{Orchestrator, Pipeline};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> crm_loader::Result<()> {
//!     let config = AppConfig::load(None)?;
//!     config.require_token()?;
//!
//!     let factory = factory_for(&config.destination)?;
//!     let objects = config.objects.clone();
//!     let workers = config.max_workers;
//!
//!     let pipeline = Pipeline::new(Arc::new(config), Some(factory));
//!     let summary = Orchestrator::new(pipeline, workers).run(objects).await;
//!     println!("{}", summary.summary_line());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                Orchestrator (bounded, isolated)                   │
//! └───────────────────────────────────────────────────────────────────┘
//!                                  │ one Pipeline per object type
//! ┌──────────┬────────────┬────────┴──────┬────────────┬──────────────┐
//! │   CRM    │ Pagination │   Flatten     │   Schema   │ Destination  │
//! ├──────────┼────────────┼───────────────┼────────────┼──────────────┤
//! │ Props    │ Cursor     │ Merge by id   │ Int64      │ ClickHouse   │
//! │ Chunks   │ Repeat stop│ Cells         │ Float64    │ DuckDB       │
//! │ Schemas  │            │               │ String     │ CSV output   │
//! └──────────┴────────────┴───────────────┴────────────┴──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Run configuration
pub mod config;

/// HTTP client with retry and rate limiting
pub mod http;

/// Cursor pagination
pub mod pagination;

/// CRM API models, property catalog and chunked fetcher
pub mod crm;

/// Record flattening
pub mod flatten;

/// Column type inference
pub mod schema;

/// CSV and Arrow output
pub mod output;

/// Destination stores
pub mod destination;

/// Pipelines and orchestration
pub mod engine;

/// Identifier cross-matching between CSV files
pub mod relationships;

/// Sample data generator
pub mod sample;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::AppConfig;
pub use engine::{ObjectOutcome, Orchestrator, Pipeline, RunSummary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

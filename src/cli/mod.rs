//! CLI module
//!
//! Command-line interface for syncing CRM objects.
//!
//! # Commands
//!
//! - `sync` - Extract every object type, write CSV files and load them
//! - `properties` - List property names and labels of an object type
//! - `schemas` - List custom object schemas
//! - `check` - Test destination connectivity
//! - `objects` - List configured object types
//! - `relationships` - Cross-match identifier columns between CSV files
//! - `sample` - Generate sample CSV files

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;

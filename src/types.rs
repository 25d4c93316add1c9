//! Common types used throughout the CRM loader
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Object Types
// ============================================================================

/// A configured CRM object type and the endpoint its records are read from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectType {
    /// Object name, also used as the CSV file stem and destination table name
    pub name: String,
    /// Endpoint path relative to the API base URL (e.g. `crm/v3/objects/contacts`)
    pub endpoint: String,
}

impl ObjectType {
    /// Create a new object type
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Object type with the standard `crm/v3/objects/<name>` endpoint
    pub fn standard(name: impl Into<String>) -> Self {
        let name = name.into();
        let endpoint = format!("crm/v3/objects/{name}");
        Self { name, endpoint }
    }

    /// Endpoint listing this object's property definitions
    pub fn properties_endpoint(&self) -> String {
        format!("crm/v3/properties/{}", self.name)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ============================================================================
// Backoff Types
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Destination Kind
// ============================================================================

/// Which analytical store rows are loaded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DestinationKind {
    /// ClickHouse over its HTTP interface
    #[default]
    Clickhouse,
    /// Embedded DuckDB database file
    Duckdb,
}

impl std::str::FromStr for DestinationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clickhouse" => Ok(Self::Clickhouse),
            "duckdb" => Ok(Self::Duckdb),
            other => Err(format!("unknown destination '{other}'")),
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

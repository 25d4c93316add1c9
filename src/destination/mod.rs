//! Destination stores
//!
//! A [`DestinationFactory`] hands every pipeline its own [`Destination`]
//! handle; handles are never shared between pipelines.
//!
//! - [`ClickHouseFactory`]: ClickHouse over HTTP
//! - [`DuckDbFactory`]: embedded DuckDB, file or in-memory

mod clickhouse;
mod ddl;
mod embedded;

pub use clickhouse::{encode_arrow_stream, ClickHouseDestination, ClickHouseFactory};
pub use ddl::{Dialect, PLACEHOLDER_COLUMN};
pub use embedded::{batch_rows, DuckDbDestination, DuckDbFactory};

use crate::config::DestinationConfig;
use crate::error::Result;
use crate::schema::TableSchema;
use crate::types::DestinationKind;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use std::sync::Arc;

/// A private connection to the analytical store
#[async_trait]
pub trait Destination: Send {
    /// Short name for logs
    fn kind(&self) -> &'static str;

    /// Round-trip `SELECT 1`
    async fn ping(&mut self) -> Result<()>;

    /// Drop any existing table and create it fresh for `schema`
    async fn recreate_table(&mut self, table: &str, schema: &TableSchema) -> Result<()>;

    /// Bulk-insert a batch in one call, returning rows written
    async fn insert_batch(&mut self, table: &str, batch: &RecordBatch) -> Result<u64>;

    /// Release the connection; later calls fail
    async fn close(&mut self) -> Result<()>;
}

/// Opens destination handles
#[async_trait]
pub trait DestinationFactory: Send + Sync {
    /// Open a new handle owned by the caller
    async fn connect(&self) -> Result<Box<dyn Destination>>;
}

/// Build the factory for the configured destination kind
pub fn factory_for(config: &DestinationConfig) -> Result<Arc<dyn DestinationFactory>> {
    let factory: Arc<dyn DestinationFactory> = match config.kind {
        DestinationKind::Clickhouse => Arc::new(ClickHouseFactory::new(config.clone())),
        DestinationKind::Duckdb => Arc::new(DuckDbFactory::open(config.duckdb_path.as_deref())?),
    };
    Ok(factory)
}

#[cfg(test)]
mod tests;

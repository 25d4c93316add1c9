//! ClickHouse over its HTTP interface
//!
//! Statements are POSTed as the request body; inserts send the statement in
//! the `query` parameter and an Arrow IPC stream as the body.

use super::ddl::Dialect;
use super::{Destination, DestinationFactory};
use crate::config::DestinationConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::schema::TableSchema;
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Timeout for a single ClickHouse statement
const STATEMENT_TIMEOUT: Duration = Duration::from_secs(300);

/// One private ClickHouse session
#[derive(Debug)]
pub struct ClickHouseDestination {
    client: Option<HttpClient>,
    database: String,
}

impl ClickHouseDestination {
    /// Open a session against the configured server
    pub fn connect(config: &DestinationConfig) -> Result<Self> {
        let http = HttpClientConfig::builder()
            .base_url(config.clickhouse_url())
            .timeout(STATEMENT_TIMEOUT)
            .max_retries(0)
            .no_rate_limit()
            .header("X-ClickHouse-User", config.user.as_str())
            .header("X-ClickHouse-Key", config.password.as_str())
            .build();

        Ok(Self {
            client: Some(HttpClient::with_config(http)?),
            database: config.database.clone(),
        })
    }

    fn client(&self) -> Result<&HttpClient> {
        self.client
            .as_ref()
            .ok_or_else(|| Error::destination("ClickHouse session already closed"))
    }

    /// Run one statement and return the response text
    async fn execute(&self, sql: &str) -> Result<String> {
        debug!(sql = %sql, "ClickHouse statement");
        let response = self
            .client()?
            .post_with_config(
                "/",
                RequestConfig::new()
                    .query("database", self.database.as_str())
                    .text(sql),
            )
            .await?;
        Ok(response.text().await?)
    }
}

/// Serialize a batch as an Arrow IPC stream
pub fn encode_arrow_stream(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut writer = StreamWriter::try_new(Vec::new(), batch.schema().as_ref())?;
    writer.write(batch)?;
    writer.finish()?;
    Ok(writer.into_inner()?)
}

#[async_trait]
impl Destination for ClickHouseDestination {
    fn kind(&self) -> &'static str {
        "clickhouse"
    }

    async fn ping(&mut self) -> Result<()> {
        let body = self.execute("SELECT 1").await?;
        if body.trim() == "1" {
            Ok(())
        } else {
            Err(Error::destination(format!(
                "Unexpected ping response: {}",
                body.trim()
            )))
        }
    }

    async fn recreate_table(&mut self, table: &str, schema: &TableSchema) -> Result<()> {
        let dialect = Dialect::ClickHouse;
        self.execute(&dialect.drop_table(table)).await?;
        self.execute(&dialect.create_table(table, schema)).await?;
        debug!(table = %table, columns = schema.len(), "ClickHouse table recreated");
        Ok(())
    }

    async fn insert_batch(&mut self, table: &str, batch: &RecordBatch) -> Result<u64> {
        if batch.num_rows() == 0 {
            return Ok(0);
        }

        let body = encode_arrow_stream(batch)?;
        let statement = format!(
            "INSERT INTO {} FORMAT ArrowStream",
            Dialect::ClickHouse.quote(table)
        );

        self.client()?
            .post_with_config(
                "/",
                RequestConfig::new()
                    .query("database", self.database.as_str())
                    .query("query", statement)
                    .header("Content-Type", "application/octet-stream")
                    .bytes(body)
                    .retries(0),
            )
            .await?;

        info!(table = %table, rows = batch.num_rows(), "Inserted into ClickHouse");
        Ok(batch.num_rows() as u64)
    }

    async fn close(&mut self) -> Result<()> {
        self.client.take();
        Ok(())
    }
}

/// Opens a fresh ClickHouse session per pipeline
#[derive(Debug, Clone)]
pub struct ClickHouseFactory {
    config: DestinationConfig,
}

impl ClickHouseFactory {
    /// Create a factory for the configured server
    pub fn new(config: DestinationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DestinationFactory for ClickHouseFactory {
    async fn connect(&self) -> Result<Box<dyn Destination>> {
        Ok(Box::new(ClickHouseDestination::connect(&self.config)?))
    }
}

//! Per-object pipeline: properties, chunked fetch, flatten, CSV, load

use super::types::ObjectOutcome;
use crate::config::AppConfig;
use crate::crm::{ChunkedFetcher, PropertyCatalog};
use crate::destination::{Destination, DestinationFactory};
use crate::error::Result;
use crate::flatten::flatten_records;
use crate::http::{HttpClient, HttpClientConfig};
use crate::output::{rows_to_batch, write_csv};
use crate::schema::infer_schema;
use crate::types::ObjectType;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Transport and destination handle owned by one pipeline run
struct PipelineResources {
    client: HttpClient,
    destination: Option<Box<dyn Destination>>,
}

impl PipelineResources {
    async fn acquire(
        config: &AppConfig,
        destinations: Option<&Arc<dyn DestinationFactory>>,
    ) -> Result<Self> {
        let token = config.require_token()?;
        let client = HttpClient::with_config(HttpClientConfig::from_settings(
            &config.source.base_url,
            token,
            &config.http,
        ))?;

        let destination = match destinations {
            Some(factory) => Some(factory.connect().await?),
            None => None,
        };

        Ok(Self {
            client,
            destination,
        })
    }

    /// Close the destination and drop the transport
    async fn release(self, object: &ObjectType) {
        if let Some(mut destination) = self.destination {
            if let Err(e) = destination.close().await {
                warn!(object = %object, error = %e, "Failed to close destination");
            }
        }
        drop(self.client);
    }
}

/// Runs the full pipeline for one object type at a time
pub struct Pipeline {
    config: Arc<AppConfig>,
    destinations: Option<Arc<dyn DestinationFactory>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("loads", &self.destinations.is_some())
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline; `None` for `destinations` stops after the CSV
    pub fn new(config: Arc<AppConfig>, destinations: Option<Arc<dyn DestinationFactory>>) -> Self {
        Self {
            config,
            destinations,
        }
    }

    /// Run the pipeline for `object`
    ///
    /// Never returns an error: every failure is logged and reported as
    /// [`ObjectOutcome::Failed`]. Resources acquired at the start are
    /// released on every exit path.
    pub async fn run(&self, object: &ObjectType) -> ObjectOutcome {
        info!(object = %object, "Start processing");

        let outcome = match PipelineResources::acquire(&self.config, self.destinations.as_ref()).await {
            Ok(mut resources) => {
                let result = self.execute(object, &mut resources).await;
                resources.release(object).await;
                result.unwrap_or_else(|e| {
                    error!(object = %object, error = %e, "Error processing object");
                    ObjectOutcome::failed(e.to_string())
                })
            }
            Err(e) => {
                error!(object = %object, error = %e, "Failed to acquire pipeline resources");
                ObjectOutcome::failed(e.to_string())
            }
        };

        info!(object = %object, outcome = %outcome, "Finished processing");
        outcome
    }

    async fn execute(
        &self,
        object: &ObjectType,
        resources: &mut PipelineResources,
    ) -> Result<ObjectOutcome> {
        let properties = PropertyCatalog::new(&resources.client)
            .fetch_names(object)
            .await?;
        if properties.is_empty() {
            warn!(object = %object, "No properties available or access denied, skipping object");
            return Ok(ObjectOutcome::skipped("no properties available or access denied"));
        }

        let report = ChunkedFetcher::new(&resources.client, self.config.fetch.clone())
            .fetch(object, &properties)
            .await?;
        if let Some(status) = report.denied {
            return Ok(ObjectOutcome::skipped(format!(
                "access denied fetching data ({status})"
            )));
        }
        if report.records.is_empty() {
            warn!(object = %object, "No records found");
            return Ok(ObjectOutcome::skipped("no records found"));
        }
        if report.dropped > 0 {
            warn!(object = %object, dropped = report.dropped, "Dropped records without identifier");
        }

        let records = report.records.len();
        let rows = flatten_records(&report.records);
        let schema = infer_schema(&rows);

        let csv_path = write_csv(&self.config.output_dir, &object.name, &rows, &schema)?;
        info!(object = %object, path = %csv_path.display(), rows = rows.len(), "Saved");

        let Some(destination) = resources.destination.as_mut() else {
            return Ok(ObjectOutcome::Extracted { records, csv_path });
        };

        let batch = rows_to_batch(&rows, &schema)?;
        destination.recreate_table(&object.name, &schema).await?;
        let rows_inserted = destination.insert_batch(&object.name, &batch).await?;
        info!(
            object = %object,
            destination = destination.kind(),
            rows = rows_inserted,
            "Loaded into table"
        );

        Ok(ObjectOutcome::Loaded {
            records,
            csv_path,
            rows_inserted,
        })
    }
}

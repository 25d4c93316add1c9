//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::AppConfig;
use crate::crm::{list_schemas, PropertyCatalog};
use crate::destination::factory_for;
use crate::engine::{ObjectOutcome, Orchestrator, Pipeline, RunSummary};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::relationships;
use crate::sample;
use crate::types::ObjectType;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Sync {
                objects,
                output_dir,
                skip_load,
            } => {
                self.sync(config, objects.as_deref(), output_dir.clone(), *skip_load)
                    .await
                    .map(|_| ())
            }
            Commands::Properties { object } => self.properties(&config, object).await,
            Commands::Schemas => self.schemas(&config).await,
            Commands::Check => self.check(&config).await,
            Commands::Objects => {
                self.objects(&config);
                Ok(())
            }
            Commands::Relationships { dir } => {
                let dir = dir.as_deref().unwrap_or(config.output_dir.as_path());
                self.relationships(dir)
            }
            Commands::Sample { dir, rows, objects } => {
                self.sample(&config, dir, *rows, objects.as_deref()).await
            }
        }
    }

    /// Load configuration and apply global flags
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.cli.config.as_deref())?;
        if let Some(kind) = self.cli.destination {
            config.destination.kind = kind;
        }
        Ok(config)
    }

    /// API client for the one-shot listing commands
    fn api_client(config: &AppConfig) -> Result<HttpClient> {
        let token = config.require_token()?;
        HttpClient::with_config(HttpClientConfig::from_settings(
            &config.source.base_url,
            token,
            &config.http,
        ))
    }

    /// Run the full pipeline for the selected object types
    ///
    /// Per-object failures are reported in the summary and never turn into
    /// an error; only configuration problems do.
    pub async fn sync(
        &self,
        mut config: AppConfig,
        objects: Option<&str>,
        output_dir: Option<PathBuf>,
        skip_load: bool,
    ) -> Result<RunSummary> {
        config.require_token()?;
        if let Some(dir) = output_dir {
            config.output_dir = dir;
        }
        let selected = config.select_objects(objects)?;

        let destinations = if skip_load {
            info!("Loading disabled, writing CSV files only");
            None
        } else {
            Some(factory_for(&config.destination)?)
        };

        let max_workers = config.max_workers;
        let pipeline = Pipeline::new(Arc::new(config), destinations);
        let summary = Orchestrator::new(pipeline, max_workers).run(selected).await;

        for report in &summary.reports {
            self.output_message(&outcome_message(
                &report.object,
                &report.outcome,
                report.duration_ms,
            ));
        }

        let line = summary.summary_line();
        info!("{line}");
        self.output_message(&json!({
            "type": "SUMMARY",
            "summary": {
                "loaded": summary.loaded(),
                "extracted": summary.extracted(),
                "skipped": summary.skipped(),
                "failed": summary.failed(),
                "records": summary.total_records(),
                "duration_ms": summary.duration_ms,
                "message": line,
            }
        }));

        Ok(summary)
    }

    /// List property names and labels
    async fn properties(&self, config: &AppConfig, name: &str) -> Result<()> {
        let client = Self::api_client(config)?;
        let object = config
            .objects
            .iter()
            .find(|object| object.name == name)
            .cloned()
            .unwrap_or_else(|| ObjectType::standard(name));

        let properties = PropertyCatalog::new(&client).list(&object).await?;
        info!(object = %object, count = properties.len(), "Properties listed");

        for property in &properties {
            self.output_message(&json!({
                "type": "PROPERTY",
                "property": {
                    "object": object.name,
                    "name": property.name,
                    "label": property.label,
                    "type": property.property_type,
                }
            }));
        }
        Ok(())
    }

    /// List custom object schemas
    async fn schemas(&self, config: &AppConfig) -> Result<()> {
        let client = Self::api_client(config)?;
        let schemas = list_schemas(&client).await?;

        if schemas.is_empty() {
            info!("No custom object schemas found");
        }
        for schema in &schemas {
            self.output_message(&json!({
                "type": "SCHEMA",
                "schema": {
                    "name": schema.name,
                    "objectTypeId": schema.object_type_id,
                    "properties": schema.property_count(),
                }
            }));
        }
        Ok(())
    }

    /// Check destination connectivity
    async fn check(&self, config: &AppConfig) -> Result<()> {
        let factory = factory_for(&config.destination)?;

        let result = async {
            let mut destination = factory.connect().await?;
            let pinged = destination.ping().await;
            if let Err(e) = destination.close().await {
                warn!(error = %e, "Failed to close destination after check");
            }
            pinged
        }
        .await;

        match result {
            Ok(()) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": "Connection successful"
                    }
                }));
                Ok(())
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": format!("Connection failed: {e}")
                    }
                }));
                Err(e)
            }
        }
    }

    /// List configured object types
    fn objects(&self, config: &AppConfig) {
        for object in &config.objects {
            self.output_message(&json!({
                "type": "OBJECT",
                "object": {
                    "name": object.name,
                    "endpoint": object.endpoint,
                }
            }));
        }
    }

    /// Cross-match identifier columns in a directory of CSV files
    fn relationships(&self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Err(Error::config(format!(
                "Directory not found: {}",
                dir.display()
            )));
        }

        let scan = relationships::discover(dir)?;
        for relationship in &scan.relationships {
            self.output_message(&json!({
                "type": "RELATIONSHIP",
                "relationship": relationship,
            }));
        }

        match &scan.output {
            Some(path) => info!(
                "Found {} relationships across {} files, saved to {}",
                scan.relationships.len(),
                scan.files_scanned,
                path.display()
            ),
            None => info!(
                "No relationships found across {} files",
                scan.files_scanned
            ),
        }
        Ok(())
    }

    /// Generate sample CSV files
    async fn sample(
        &self,
        config: &AppConfig,
        dir: &Path,
        rows: usize,
        objects: Option<&str>,
    ) -> Result<()> {
        let selected = config.select_objects(objects)?;
        let paths = sample::generate_all(dir, &selected, rows).await?;

        self.output_message(&json!({
            "type": "SAMPLE",
            "sample": {
                "dir": dir.display().to_string(),
                "files": paths.len(),
                "rows": rows,
            }
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Build the status message for one object's outcome
fn outcome_message(object: &str, outcome: &ObjectOutcome, duration_ms: u64) -> Value {
    let (status, detail) = match outcome {
        ObjectOutcome::Loaded {
            records,
            csv_path,
            rows_inserted,
        } => (
            "LOADED",
            json!({
                "records": records,
                "csv": csv_path.display().to_string(),
                "rows_inserted": rows_inserted,
            }),
        ),
        ObjectOutcome::Extracted { records, csv_path } => (
            "EXTRACTED",
            json!({
                "records": records,
                "csv": csv_path.display().to_string(),
            }),
        ),
        ObjectOutcome::Skipped { reason } => ("SKIPPED", json!({ "reason": reason })),
        ObjectOutcome::Failed { error } => ("FAILED", json!({ "error": error })),
    };

    json!({
        "type": "OBJECT_STATUS",
        "objectStatus": {
            "object": object,
            "status": status,
            "duration_ms": duration_ms,
            "detail": detail,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_outcome_message_loaded() {
        let outcome = ObjectOutcome::Loaded {
            records: 130,
            csv_path: PathBuf::from("out/contacts.csv"),
            rows_inserted: 130,
        };
        let msg = outcome_message("contacts", &outcome, 42);
        assert_eq!(
            msg,
            json!({
                "type": "OBJECT_STATUS",
                "objectStatus": {
                    "object": "contacts",
                    "status": "LOADED",
                    "duration_ms": 42,
                    "detail": {
                        "records": 130,
                        "csv": "out/contacts.csv",
                        "rows_inserted": 130,
                    }
                }
            })
        );
    }

    #[test]
    fn test_outcome_message_skipped() {
        let msg = outcome_message("carts", &ObjectOutcome::skipped("no records found"), 1);
        assert_eq!(msg["objectStatus"]["status"], "SKIPPED");
        assert_eq!(msg["objectStatus"]["detail"]["reason"], "no records found");
    }
}

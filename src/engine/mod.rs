//! Execution engine module
//!
//! Runs one [`Pipeline`] per object type on a bounded pool of workers.
//!
//! # Overview
//!
//! - [`Pipeline`] - properties, chunked fetch, flatten, CSV and load for one object type
//! - [`Orchestrator`] - runs pipelines concurrently with per-object isolation
//! - [`RunSummary`] - outcomes of a whole run

mod pipeline;
mod types;

pub use pipeline::Pipeline;
pub use types::{ObjectOutcome, ObjectReport, RunSummary};

use crate::types::ObjectType;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Runs pipelines for many object types concurrently
///
/// At most `max_workers` pipelines run at once. Each runs in its own task, so
/// an error or a panic in one object type is reported as that object's
/// failure and never cancels the others.
#[derive(Debug)]
pub struct Orchestrator {
    pipeline: Arc<Pipeline>,
    max_workers: usize,
}

impl Orchestrator {
    /// Create an orchestrator
    pub fn new(pipeline: Pipeline, max_workers: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            max_workers: max_workers.max(1),
        }
    }

    /// Run every object type and wait for all of them
    pub async fn run(&self, objects: Vec<ObjectType>) -> RunSummary {
        let start = Instant::now();
        let total = objects.len();

        info!(
            "Processing {} object types (concurrency={})",
            total, self.max_workers
        );

        let reports: Vec<ObjectReport> = stream::iter(objects)
            .map(|object| {
                let pipeline = Arc::clone(&self.pipeline);
                async move {
                    let started = Instant::now();
                    let name = object.name.clone();

                    let outcome = match tokio::spawn(async move { pipeline.run(&object).await }).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            error!(object = %name, error = %e, "Unhandled error in pipeline task");
                            ObjectOutcome::failed(format!("pipeline task failed: {e}"))
                        }
                    };

                    ObjectReport {
                        object: name,
                        outcome,
                        duration_ms: started.elapsed().as_millis() as u64,
                    }
                }
            })
            .buffer_unordered(self.max_workers)
            .collect()
            .await;

        RunSummary {
            reports,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

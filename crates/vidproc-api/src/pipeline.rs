//! Pipeline orchestration.
//!
//! One run per trigger: fetch the raw object into scratch, transcode it,
//! publish the result, then delete both scratch files. Cleanup happens on
//! every post-validation exit path, success or failure, so scratch space
//! never leaks.

use std::sync::Arc;

use tracing::{info, warn};

use vidproc_media::TranscodeEngine;
use vidproc_storage::{ObjectGateway, ScratchDirs};

use crate::error::{ApiError, ApiResult};
use crate::singleflight::KeyedLocks;
use crate::trigger::FileArrivalEvent;

/// Derive the processed object name from the raw one. Deterministic, so a
/// redelivered trigger overwrites its earlier output instead of forking.
pub fn processed_name(raw_name: &str) -> String {
    format!("processed-{}", raw_name)
}

/// Orchestrates the download, transcode, publish, cleanup sequence.
pub struct Pipeline<G, T> {
    gateway: Arc<G>,
    engine: Arc<T>,
    scratch: ScratchDirs,
    locks: KeyedLocks,
}

impl<G, T> Pipeline<G, T>
where
    G: ObjectGateway,
    T: TranscodeEngine,
{
    pub fn new(gateway: Arc<G>, engine: Arc<T>, scratch: ScratchDirs) -> Self {
        Self {
            gateway,
            engine,
            scratch,
            locks: KeyedLocks::new(),
        }
    }

    /// Run the full pipeline for one validated trigger.
    ///
    /// Holds the per-name lock for the whole run so a concurrent redelivery
    /// of the same object name waits instead of clobbering scratch files.
    pub async fn run(&self, event: &FileArrivalEvent) -> ApiResult<()> {
        let input_name = event.name.as_str();
        let output_name = processed_name(input_name);

        let _guard = self.locks.acquire(input_name).await;
        info!(file = input_name, "Starting pipeline run");

        let result = self.execute(input_name, &output_name).await;

        // Best-effort cleanup on every path; never overrides the run result.
        self.cleanup(input_name, &output_name).await;

        match &result {
            Ok(()) => info!(file = input_name, "Pipeline run finished"),
            Err(e) => warn!(file = input_name, error = %e, "Pipeline run failed"),
        }
        result
    }

    async fn execute(&self, input_name: &str, output_name: &str) -> ApiResult<()> {
        let raw_path = self.scratch.raw_path(input_name);
        let processed_path = self.scratch.processed_path(output_name);

        self.gateway
            .fetch(input_name, &raw_path)
            .await
            .map_err(ApiError::Fetch)?;

        self.engine.transcode(&raw_path, &processed_path).await?;

        self.gateway
            .publish(&processed_path, output_name)
            .await
            .map_err(ApiError::Publish)?;

        Ok(())
    }

    /// Delete both scratch files; the two deletes proceed independently and
    /// a failure is logged, not propagated.
    async fn cleanup(&self, input_name: &str, output_name: &str) {
        if let Err(e) = self.scratch.delete_raw(input_name).await {
            warn!(file = input_name, error = %e, "Failed to delete raw scratch file");
        }
        if let Err(e) = self.scratch.delete_processed(output_name).await {
            warn!(file = output_name, error = %e, "Failed to delete processed scratch file");
        }
    }
}

//! Application state.

use std::sync::Arc;

use vidproc_media::FfmpegTranscoder;
use vidproc_storage::{ObjectStoreClient, ScratchDirs};

use crate::config::ApiConfig;
use crate::pipeline::Pipeline;

/// The production pipeline wiring.
pub type VideoPipeline = Pipeline<ObjectStoreClient, FfmpegTranscoder>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<VideoPipeline>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Builds the long-lived object store client once and injects it into
    /// the pipeline; scratch directories are created here so every later
    /// run finds them present.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let storage = ObjectStoreClient::from_env()?;

        let scratch = ScratchDirs::new(&config.work_dir);
        scratch.ensure().await?;

        let engine = FfmpegTranscoder::new(Some(config.transcode_timeout_secs));

        let pipeline = Pipeline::new(Arc::new(storage), Arc::new(engine), scratch);

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
        })
    }
}

//! The fixed downscale transform applied to every raw video.

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Target output height in pixels.
pub const TARGET_HEIGHT: u32 = 360;

/// Scale filter with a fixed height and auto width.
///
/// `-2` lets ffmpeg derive the width from the source aspect ratio, rounded
/// to an even value as required by most encoders.
pub fn scale_filter(height: u32) -> String {
    format!("scale=-2:{}", height)
}

/// A transcode run that terminates with exactly one of success or failure.
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Transcode `input` into `output`, suspending the caller until the
    /// engine reports a terminal event.
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()>;
}

/// FFmpeg-backed transcode engine applying the fixed 360p downscale.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    runner: FfmpegRunner,
}

impl FfmpegTranscoder {
    /// Create a transcoder, optionally bounded by a caller-side timeout.
    pub fn new(timeout_secs: Option<u64>) -> Self {
        let runner = match timeout_secs {
            Some(secs) => FfmpegRunner::new().with_timeout(secs),
            None => FfmpegRunner::new(),
        };
        Self { runner }
    }
}

#[async_trait]
impl TranscodeEngine for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let cmd = FfmpegCommand::new(input, output).video_filter(scale_filter(TARGET_HEIGHT));

        self.runner.run(&cmd).await?;

        info!(
            "Transcoded {} to {} at {}p",
            input.display(),
            output.display(),
            TARGET_HEIGHT
        );
        Ok(())
    }
}

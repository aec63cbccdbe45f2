//! FFmpeg CLI wrapper for the fixed downscale transform.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - A runner with stderr capture and timeout-with-kill
//! - The `TranscodeEngine` trait and its ffmpeg-backed implementation

pub mod command;
pub mod error;
pub mod transcode;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use transcode::{scale_filter, FfmpegTranscoder, TranscodeEngine, TARGET_HEIGHT};

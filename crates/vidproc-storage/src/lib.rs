//! Object store gateway and local scratch management.
//!
//! This crate provides:
//! - An S3-compatible client addressing the raw and processed video buckets
//! - The `ObjectGateway` trait the pipeline orchestrator depends on
//! - Scratch directory management with delete-if-exists cleanup semantics

pub mod client;
pub mod error;
pub mod scratch;

pub use client::{ObjectGateway, ObjectStoreClient, ObjectStoreConfig};
pub use error::{StorageError, StorageResult};
pub use scratch::ScratchDirs;

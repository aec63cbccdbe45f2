//! Local scratch directories for in-flight pipeline runs.
//!
//! Raw downloads land in one directory, transcoded output in the other.
//! Files here are disposable; the buckets remain the source of truth.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::StorageResult;

const RAW_DIR: &str = "raw-videos";
const PROCESSED_DIR: &str = "processed-videos";

/// The two local scratch directories, derived from a single work dir.
#[derive(Debug, Clone)]
pub struct ScratchDirs {
    raw: PathBuf,
    processed: PathBuf,
}

impl ScratchDirs {
    /// Create scratch paths under `work_dir`. Call [`ensure`](Self::ensure)
    /// before use.
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        let work_dir = work_dir.as_ref();
        Self {
            raw: work_dir.join(RAW_DIR),
            processed: work_dir.join(PROCESSED_DIR),
        }
    }

    /// Idempotently create both directories, including missing parents.
    pub async fn ensure(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.raw).await?;
        fs::create_dir_all(&self.processed).await?;
        Ok(())
    }

    /// Path a fetched raw video is written to.
    pub fn raw_path(&self, name: &str) -> PathBuf {
        self.raw.join(name)
    }

    /// Path the transcoder writes processed output to.
    pub fn processed_path(&self, name: &str) -> PathBuf {
        self.processed.join(name)
    }

    /// Delete a raw scratch file if it exists.
    pub async fn delete_raw(&self, name: &str) -> StorageResult<()> {
        remove_if_exists(&self.raw_path(name)).await
    }

    /// Delete a processed scratch file if it exists.
    pub async fn delete_processed(&self, name: &str) -> StorageResult<()> {
        remove_if_exists(&self.processed_path(name)).await
    }
}

/// Remove a file, treating "already gone" as success.
async fn remove_if_exists(path: &Path) -> StorageResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!("Deleted {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Not found, skipping delete: {}", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ensure_creates_both_directories() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchDirs::new(dir.path().join("work"));

        scratch.ensure().await.unwrap();

        assert!(dir.path().join("work").join(RAW_DIR).is_dir());
        assert!(dir.path().join("work").join(PROCESSED_DIR).is_dir());
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchDirs::new(dir.path());

        scratch.ensure().await.unwrap();
        scratch.ensure().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_existing_file() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchDirs::new(dir.path());
        scratch.ensure().await.unwrap();

        fs::write(scratch.raw_path("clip.mp4"), b"raw bytes")
            .await
            .unwrap();

        scratch.delete_raw("clip.mp4").await.unwrap();
        assert!(!scratch.raw_path("clip.mp4").exists());
    }

    #[tokio::test]
    async fn test_delete_missing_file_resolves_without_error() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchDirs::new(dir.path());
        scratch.ensure().await.unwrap();

        scratch.delete_raw("never-existed.mp4").await.unwrap();
        scratch.delete_processed("never-existed.mp4").await.unwrap();
    }

    #[test]
    fn test_paths_stay_inside_their_directories() {
        let scratch = ScratchDirs::new("/tmp/vidproc");
        assert_eq!(
            scratch.raw_path("clip.mp4"),
            PathBuf::from("/tmp/vidproc/raw-videos/clip.mp4")
        );
        assert_eq!(
            scratch.processed_path("processed-clip.mp4"),
            PathBuf::from("/tmp/vidproc/processed-videos/processed-clip.mp4")
        );
    }
}

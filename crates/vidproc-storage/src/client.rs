//! S3-compatible object store client for the raw and processed buckets.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Configuration for the object store client.
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket holding incoming raw videos
    pub raw_bucket: String,
    /// Bucket holding transcoded, publicly retrievable videos
    pub processed_bucket: String,
    /// Region ("auto" works for most S3-compatible stores)
    pub region: String,
}

impl ObjectStoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("STORAGE_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("STORAGE_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("STORAGE_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("STORAGE_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("STORAGE_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("STORAGE_SECRET_ACCESS_KEY not set"))?,
            raw_bucket: std::env::var("RAW_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("RAW_BUCKET_NAME not set"))?,
            processed_bucket: std::env::var("PROCESSED_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("PROCESSED_BUCKET_NAME not set"))?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// Gateway to the remote raw and processed object buckets.
///
/// The orchestrator depends on this seam rather than on the concrete S3
/// client so runs can be exercised against in-memory fakes.
#[async_trait]
pub trait ObjectGateway: Send + Sync {
    /// Fetch the named raw object into `dest`, blocking the run until the
    /// transfer completes.
    async fn fetch(&self, key: &str, dest: &Path) -> StorageResult<()>;

    /// Upload `src` as the named processed object, then mark it publicly
    /// retrievable as a second sequential step.
    async fn publish(&self, src: &Path, key: &str) -> StorageResult<()>;
}

/// S3-compatible storage client addressing the two video buckets.
#[derive(Clone)]
pub struct ObjectStoreClient {
    client: Client,
    raw_bucket: String,
    processed_bucket: String,
}

impl ObjectStoreClient {
    /// Create a new client from configuration.
    pub fn new(config: ObjectStoreConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "vidproc",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            raw_bucket: config.raw_bucket,
            processed_bucket: config.processed_bucket,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(ObjectStoreConfig::from_env()?))
    }
}

#[async_trait]
impl ObjectGateway for ObjectStoreClient {
    async fn fetch(&self, key: &str, dest: &Path) -> StorageResult<()> {
        debug!("Downloading {} to {}", key, dest.display());

        let response = self
            .client
            .get_object()
            .bucket(&self.raw_bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("NoSuchKey") {
                    StorageError::not_found(key)
                } else {
                    StorageError::download_failed(e.to_string())
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::download_failed(e.to_string()))?
            .into_bytes();

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::download_failed(format!("Failed to create directory: {}", e))
            })?;
        }

        tokio::fs::write(dest, bytes)
            .await
            .map_err(|e| StorageError::download_failed(format!("Failed to write file: {}", e)))?;

        info!("Downloaded {} to {}", key, dest.display());
        Ok(())
    }

    async fn publish(&self, src: &Path, key: &str) -> StorageResult<()> {
        debug!("Uploading {} to {}", src.display(), key);

        let body = ByteStream::from_path(src)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.processed_bucket)
            .key(key)
            .body(body)
            .content_type(content_type_for(key))
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        // Upload success does not imply visibility; set the ACL as its own step.
        self.client
            .put_object_acl()
            .bucket(&self.processed_bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::VisibilityFailed(e.to_string()))?;

        info!("Published {} as public object {}", src.display(), key);
        Ok(())
    }
}

/// Guess a content type from the object key's extension.
fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use vidproc_media::MediaError;
use vidproc_storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Uniform rejection for any malformed or incomplete trigger payload.
    /// Decode specifics are logged, never exposed to the caller.
    #[error("Bad request: missing or invalid filename")]
    Validation,

    #[error("Failed to fetch raw video: {0}")]
    Fetch(#[source] StorageError),

    #[error("Failed to publish processed video: {0}")]
    Publish(#[source] StorageError),

    #[error("Transcode failed: {0}")]
    Transcode(#[from] MediaError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation => StatusCode::BAD_REQUEST,
            ApiError::Fetch(_) | ApiError::Publish(_) | ApiError::Transcode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let body = if status.is_server_error() {
            error!(error = %self, "Pipeline run failed");
            if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                "Internal Server Error: video processing failed.".to_string()
            } else {
                self.to_string()
            }
        } else {
            self.to_string()
        };

        (status, body).into_response()
    }
}

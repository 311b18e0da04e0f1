//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coffer_engine::{DeleteError, DownloadError, UploadError};
use coffer_store::StoreError;
use serde::Serialize;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    #[error("delete error: {0}")]
    Delete(#[from] DeleteError),

    #[error("core error: {0}")]
    Core(#[from] coffer_core::Error),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal_error",
            Self::Multipart(_) => "bad_request",
            Self::Store(e) => match e {
                StoreError::NotFound(_) => "not_found",
                StoreError::DuplicateChunk { .. } | StoreError::InvalidTransition { .. } => {
                    "conflict"
                }
                _ => "store_error",
            },
            Self::Upload(e) => match e {
                UploadError::Invalid(_) => "bad_request",
                _ => "upload_error",
            },
            Self::Download(e) => match e {
                DownloadError::NotFound(_) => "not_found",
                DownloadError::Incomplete(_) => "conflict",
                DownloadError::CorruptData { .. } => "corrupt_data",
                _ => "download_error",
            },
            Self::Delete(e) => match e {
                DeleteError::NotFound(_) => "not_found",
                _ => "delete_error",
            },
            Self::Core(_) => "bad_request",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Multipart(_) => StatusCode::BAD_REQUEST,
            Self::Store(e) => match e {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::DuplicateChunk { .. } | StoreError::InvalidTransition { .. } => {
                    StatusCode::CONFLICT
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Upload(e) => match e {
                UploadError::Invalid(_) => StatusCode::BAD_REQUEST,
                UploadError::ChunkWriteFailed {
                    source: StoreError::DuplicateChunk { .. },
                    ..
                } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Download(e) => match e {
                DownloadError::NotFound(_) => StatusCode::NOT_FOUND,
                DownloadError::Incomplete(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Delete(e) => match e {
                DeleteError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Core(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

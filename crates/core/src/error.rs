//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid file ID: {0}")]
    InvalidFileId(String),

    #[error("invalid file status: {0}")]
    InvalidStatus(String),

    #[error("invalid chunk size: {size} (must be between {min} and {max})")]
    InvalidChunkSize { size: u64, min: u64, max: u64 },

    #[error("invalid filename: {0}")]
    InvalidFilename(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

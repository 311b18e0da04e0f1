//! Store error types.

use coffer_core::FileId;
use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate chunk: file {file_id} sequence {seq} already written")]
    DuplicateChunk { file_id: FileId, seq: u64 },

    #[error("chunk gap: file {file_id} is missing sequence {missing}")]
    GapDetected { file_id: FileId, missing: u64 },

    #[error("invalid status transition for file {file_id}: {from} -> {to}")]
    InvalidTransition {
        file_id: FileId,
        from: String,
        to: String,
    },

    #[error("corrupt record: {0}")]
    CorruptRecord(#[from] coffer_core::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Whether this error means the target simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

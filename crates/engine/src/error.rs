//! Engine error types.
//!
//! Store errors propagate through unchanged, wrapped with the operation and
//! file id they occurred under, never swallowed. The engine performs no
//! retries of its own; a transient database failure surfaces to the caller,
//! which may retry the whole operation (safe for uploads because chunk
//! writes are idempotent).

use coffer_core::FileId;
use coffer_store::StoreError;
use thiserror::Error;

/// Upload failures.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid upload: {0}")]
    Invalid(#[from] coffer_core::Error),

    #[error("failed to create file record: {0}")]
    CreateFailed(#[source] StoreError),

    #[error("chunk write failed for file {file_id} at sequence {seq}: {source}")]
    ChunkWriteFailed {
        file_id: FileId,
        seq: u64,
        #[source]
        source: StoreError,
    },

    #[error("upload source failed for file {file_id}: {source}")]
    Source {
        file_id: FileId,
        #[source]
        source: std::io::Error,
    },

    #[error("commit failed for file {file_id}: {source}")]
    CommitFailed {
        file_id: FileId,
        #[source]
        source: StoreError,
    },
}

/// Download failures.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("file not found: {0}")]
    NotFound(FileId),

    #[error("file {0} is not complete")]
    Incomplete(FileId),

    #[error("corrupt chunk data for file {file_id}: {source}")]
    CorruptData {
        file_id: FileId,
        #[source]
        source: StoreError,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl DownloadError {
    /// Classify a store error raised while reading chunks for `file_id`.
    ///
    /// Reassembly inconsistencies (a gap, or a chunk that vanished between
    /// the index scan and the payload fetch) are corruption; everything
    /// else is a plain store failure.
    pub fn from_chunk_error(file_id: FileId, source: StoreError) -> Self {
        match source {
            StoreError::GapDetected { .. } | StoreError::NotFound(_) => {
                Self::CorruptData { file_id, source }
            }
            other => Self::Store(other),
        }
    }
}

/// Delete failures.
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("file not found: {0}")]
    NotFound(FileId),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

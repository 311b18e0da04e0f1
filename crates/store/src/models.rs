//! Database rows mapping to the store schema.

use crate::error::StoreResult;
use coffer_core::{FileId, FileRecord, FileStatus};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// File metadata row.
#[derive(Debug, Clone, FromRow)]
pub struct FileRow {
    pub file_id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub length: i64,
    pub chunk_size: i64,
    pub chunk_count: i64,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
}

impl FileRow {
    /// Convert into the domain record.
    pub fn into_record(self) -> StoreResult<FileRecord> {
        Ok(FileRecord {
            id: FileId::from_uuid(self.file_id),
            filename: self.filename,
            content_type: self.content_type,
            length: self.length as u64,
            chunk_size: self.chunk_size as u64,
            chunk_count: self.chunk_count as u64,
            status: FileStatus::parse(&self.status)?,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

/// Chunk row. The payload is stored inline in the substrate.
#[derive(Debug, Clone, FromRow)]
pub struct ChunkRow {
    pub file_id: Uuid,
    pub seq: i64,
    pub data: Vec<u8>,
}

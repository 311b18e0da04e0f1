//! File metadata contract.

use crate::error::StoreResult;
use async_trait::async_trait;
use coffer_core::{FileId, FileRecord};
use time::OffsetDateTime;

/// Keyset cursor for paged listing: position of the last record seen.
///
/// Listing order is creation time ascending, ties broken by file id, so the
/// cursor is the `(created_at, file_id)` pair of the previous page's final
/// row.
#[derive(Clone, Copy, Debug)]
pub struct FileCursor {
    pub created_at: OffsetDateTime,
    pub file_id: FileId,
}

impl FileCursor {
    /// Cursor pointing just past the given record.
    pub fn after(record: &FileRecord) -> Self {
        Self {
            created_at: record.created_at,
            file_id: record.id,
        }
    }
}

/// Persists and retrieves file-level metadata records keyed by file id.
#[async_trait]
pub trait FileIndex: Send + Sync {
    /// Allocate an id and create a record in `Pending` state.
    async fn create_record(
        &self,
        filename: &str,
        content_type: &str,
        chunk_size: u64,
    ) -> StoreResult<FileRecord>;

    /// Transition a `Pending` record to `Complete`, recording its final
    /// length and chunk count. Fails with `NotFound` if the id is absent
    /// and `InvalidTransition` if the record is not `Pending`.
    async fn mark_complete(&self, id: FileId, length: u64, chunk_count: u64) -> StoreResult<()>;

    /// Fetch a record. Fails with `NotFound` if absent.
    async fn get_record(&self, id: FileId) -> StoreResult<FileRecord>;

    /// Fetch one page of records (all statuses) in creation-time order.
    async fn list_records(
        &self,
        after: Option<FileCursor>,
        limit: u32,
    ) -> StoreResult<Vec<FileRecord>>;

    /// Fetch `Pending` records created before `older_than`, oldest first.
    ///
    /// Aborted uploads stay `Pending` forever; this is the hook an external
    /// reaper uses to find them. The store itself never cleans them up.
    async fn list_stale_pending(
        &self,
        older_than: OffsetDateTime,
        limit: u32,
    ) -> StoreResult<Vec<FileRecord>>;

    /// Atomically read a record, transition it to `Deleting`, and remove
    /// it. Returns the record as it was, for the caller to drive chunk
    /// deletion. Fails with `NotFound` if already removed.
    async fn mark_deleting_and_remove(&self, id: FileId) -> StoreResult<FileRecord>;
}

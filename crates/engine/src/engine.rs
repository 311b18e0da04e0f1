//! The blob engine: streaming chunked upload and download with a commit
//! protocol.

use crate::error::{DeleteError, DownloadError, UploadError};
use crate::stream::{self, ChunkWindows};
use bytes::Bytes;
use coffer_core::{FileId, FileRecord, FileStatus};
use coffer_store::{BlobStore, ChunkStore, FileCursor, FileIndex, StoreError};
use futures::{Stream, StreamExt, TryStreamExt, pin_mut};
use std::pin::Pin;
use std::sync::Arc;
use time::OffsetDateTime;

/// A lazy stream of file bytes. Chunks are fetched one at a time as the
/// consumer advances.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DownloadError>> + Send>>;

/// A lazy, restartable stream of file records.
pub type FileStream = Pin<Box<dyn Stream<Item = Result<FileRecord, StoreError>> + Send>>;

/// Records fetched per page while listing.
const LIST_PAGE_SIZE: u32 = 256;

/// Orchestrates the file index and chunk store.
///
/// Safe for many concurrent callers on distinct file ids; no global lock.
/// Concurrent operations on the same id are not serialized here - the
/// substrate's per-statement atomicity is the only guarantee in that case.
pub struct BlobEngine {
    store: Arc<dyn BlobStore>,
    default_chunk_size: u64,
}

impl BlobEngine {
    /// Create an engine over the given store.
    pub fn new(store: Arc<dyn BlobStore>, default_chunk_size: u64) -> coffer_core::Result<Self> {
        coffer_core::validate_chunk_size(default_chunk_size)?;
        Ok(Self {
            store,
            default_chunk_size,
        })
    }

    /// Upload a whole file from a byte stream, using the default chunk size.
    pub async fn upload<S>(
        &self,
        filename: &str,
        content_type: &str,
        source: S,
    ) -> Result<FileRecord, UploadError>
    where
        S: Stream<Item = Result<Bytes, std::io::Error>> + Send,
    {
        self.upload_with_chunk_size(filename, content_type, self.default_chunk_size, source)
            .await
    }

    /// Upload a whole file from a byte stream with an explicit chunk size.
    ///
    /// The record is created `Pending`, chunks are written in increasing
    /// sequence order, and the record commits to `Complete` only after the
    /// source is exhausted and every chunk is durable. Any failure along
    /// the way aborts the upload and leaves the record `Pending` - there is
    /// no rollback of already-written chunks. An empty source is a valid
    /// zero-chunk, zero-length file.
    pub async fn upload_with_chunk_size<S>(
        &self,
        filename: &str,
        content_type: &str,
        chunk_size: u64,
        source: S,
    ) -> Result<FileRecord, UploadError>
    where
        S: Stream<Item = Result<Bytes, std::io::Error>> + Send,
    {
        if filename.is_empty() {
            return Err(coffer_core::Error::InvalidFilename("must not be empty".to_string()).into());
        }
        coffer_core::validate_chunk_size(chunk_size)?;

        let mut record = self
            .store
            .create_record(filename, content_type, chunk_size)
            .await
            .map_err(UploadError::CreateFailed)?;
        let file_id = record.id;

        tracing::debug!(%file_id, filename, chunk_size, "upload started");

        let mut windows = ChunkWindows::new(chunk_size);
        let mut seq: u64 = 0;
        let mut total_bytes: u64 = 0;

        pin_mut!(source);
        while let Some(item) = source.next().await {
            let data = item.map_err(|source| UploadError::Source { file_id, source })?;
            for window in windows.push(data) {
                total_bytes += window.len() as u64;
                self.store
                    .write_chunk(file_id, seq, window)
                    .await
                    .map_err(|source| UploadError::ChunkWriteFailed {
                        file_id,
                        seq,
                        source,
                    })?;
                seq += 1;
            }
        }

        if let Some(tail) = windows.finish() {
            total_bytes += tail.len() as u64;
            self.store
                .write_chunk(file_id, seq, tail)
                .await
                .map_err(|source| UploadError::ChunkWriteFailed {
                    file_id,
                    seq,
                    source,
                })?;
            seq += 1;
        }

        self.store
            .mark_complete(file_id, total_bytes, seq)
            .await
            .map_err(|source| UploadError::CommitFailed { file_id, source })?;

        tracing::info!(%file_id, bytes = total_bytes, chunks = seq, "upload committed");

        record.length = total_bytes;
        record.chunk_count = seq;
        record.status = FileStatus::Complete;
        record.completed_at = Some(OffsetDateTime::now_utc());
        Ok(record)
    }

    /// Look up a file and open its contents as a lazy byte stream.
    ///
    /// Only `Complete` files are readable; a `Pending` record means the
    /// upload has not committed and readers must not observe it. The chunk
    /// index is cross-checked against the record before any bytes are
    /// handed out, so a gap fails the call rather than truncating the
    /// stream; a chunk that vanishes mid-stream still fails the stream
    /// itself, and bytes already delivered cannot be retracted.
    pub async fn download(&self, id: FileId) -> Result<(FileRecord, ByteStream), DownloadError> {
        let record = match self.store.get_record(id).await {
            Ok(record) => record,
            Err(e) if e.is_not_found() => return Err(DownloadError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };

        if !record.status.is_complete() {
            return Err(DownloadError::Incomplete(id));
        }

        let stored = self.store.count_chunks(id).await?;
        if stored != record.chunk_count {
            return Err(DownloadError::CorruptData {
                file_id: id,
                source: StoreError::GapDetected {
                    file_id: id,
                    missing: stored.min(record.chunk_count),
                },
            });
        }

        let chunks = self
            .store
            .read_chunks_in_order(id)
            .await
            .map_err(|e| DownloadError::from_chunk_error(id, e))?;

        Ok((record, stream::into_byte_stream(id, chunks)))
    }

    /// List all `Complete` files as a lazy, restartable stream in
    /// creation-time order. `Pending` and `Deleting` records are invisible.
    pub fn list_files(&self) -> FileStream {
        let store = self.store.clone();

        let pages = futures::stream::try_unfold(
            Some(None::<FileCursor>),
            move |state: Option<Option<FileCursor>>| {
                let store = store.clone();
                async move {
                    let Some(after) = state else {
                        return Ok::<_, StoreError>(None);
                    };
                    let page = store.list_records(after, LIST_PAGE_SIZE).await?;
                    let next = match page.last() {
                        Some(last) if page.len() as u32 == LIST_PAGE_SIZE => {
                            Some(Some(FileCursor::after(last)))
                        }
                        _ => None,
                    };
                    Ok(Some((page, next)))
                }
            },
        );

        Box::pin(
            pages
                .map_ok(|page| {
                    futures::stream::iter(
                        page.into_iter()
                            .filter(|record| record.status.is_complete())
                            .map(Ok),
                    )
                })
                .try_flatten(),
        )
    }

    /// Delete a file: the record is removed first, then its chunks.
    ///
    /// Removing the record first guarantees no reader can observe a record
    /// pointing at partially-deleted chunks. The cost is that a chunk-sweep
    /// failure after the record is gone orphans the chunks; that case is
    /// logged distinctly and still reported as success, because from the
    /// caller's perspective the file is gone either way.
    pub async fn delete(&self, id: FileId) -> Result<(), DeleteError> {
        let record = match self.store.mark_deleting_and_remove(id).await {
            Ok(record) => record,
            Err(e) if e.is_not_found() => return Err(DeleteError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };

        match self.store.delete_all_chunks(id).await {
            Ok(removed) => {
                tracing::debug!(%id, removed, filename = %record.filename, "file deleted");
                Ok(())
            }
            Err(e) => {
                // The record is already gone; these chunks are unreachable
                // and wait for an external sweep.
                tracing::error!(
                    file_id = %id,
                    error = %e,
                    "file record removed but chunk sweep failed; chunks orphaned"
                );
                Ok(())
            }
        }
    }

    /// Expose aborted uploads (`Pending` records older than `older_than`)
    /// for an external reaper. The engine itself never cleans them up.
    pub async fn list_stale_uploads(
        &self,
        older_than: OffsetDateTime,
        limit: u32,
    ) -> Result<Vec<FileRecord>, StoreError> {
        self.store.list_stale_pending(older_than, limit).await
    }
}

//! Chunk persistence contract.

use crate::error::StoreResult;
use async_trait::async_trait;
use bytes::Bytes;
use coffer_core::FileId;
use futures::Stream;
use std::pin::Pin;

/// A lazy, finite stream of `(sequence, data)` pairs in ascending sequence
/// order. Chunks are fetched one at a time as the consumer advances.
pub type ChunkStream = Pin<Box<dyn Stream<Item = StoreResult<(u64, Bytes)>> + Send>>;

/// Persists and retrieves fixed-size binary chunks keyed by
/// `(file_id, sequence)`.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Persist one chunk. Write-once: if the key already exists with
    /// byte-identical data the write is treated as a successful retry;
    /// divergent data fails with `DuplicateChunk`.
    async fn write_chunk(&self, file_id: FileId, seq: u64, data: Bytes) -> StoreResult<()>;

    /// Read a single chunk. Fails with `NotFound` if absent.
    async fn read_chunk(&self, file_id: FileId, seq: u64) -> StoreResult<Bytes>;

    /// Stream all chunks for a file in ascending sequence order.
    ///
    /// Fails with `GapDetected` if any sequence in `[0, max_seen]` is
    /// missing; the check runs against the sequence index before any
    /// payload is fetched, and again per chunk while streaming (a chunk
    /// can vanish under a concurrent delete).
    async fn read_chunks_in_order(&self, file_id: FileId) -> StoreResult<ChunkStream>;

    /// Number of chunks currently stored for a file.
    async fn count_chunks(&self, file_id: FileId) -> StoreResult<u64>;

    /// Remove every chunk for a file. Returns the number removed;
    /// removing zero chunks is a success (idempotent).
    async fn delete_all_chunks(&self, file_id: FileId) -> StoreResult<u64>;
}

//! Stream adapter: inbound bytes to chunk-size windows, stored chunks back
//! to an outbound byte stream.

use crate::engine::ByteStream;
use crate::error::DownloadError;
use bytes::{Bytes, BytesMut};
use coffer_core::FileId;
use coffer_store::ChunkStream;
use futures::StreamExt;

/// Re-frames an arbitrary incoming byte stream into exactly-`chunk_size`
/// windows. The last window (from [`ChunkWindows::finish`]) may be shorter.
///
/// Each upload owns its windower; the buffer is never shared between calls.
pub struct ChunkWindows {
    chunk_size: usize,
    buf: BytesMut,
}

impl ChunkWindows {
    /// Create a windower for the given chunk size.
    pub fn new(chunk_size: u64) -> Self {
        Self {
            chunk_size: chunk_size as usize,
            buf: BytesMut::new(),
        }
    }

    /// Feed bytes in; pull out every full window now available.
    pub fn push(&mut self, data: Bytes) -> Vec<Bytes> {
        self.buf.extend_from_slice(&data);
        let mut windows = Vec::new();
        while self.buf.len() >= self.chunk_size {
            windows.push(self.buf.split_to(self.chunk_size).freeze());
        }
        windows
    }

    /// Drain the remaining partial window, if any. Call once, after the
    /// source is exhausted.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.buf.is_empty() {
            None
        } else {
            Some(self.buf.split().freeze())
        }
    }
}

/// Concatenate an ordered chunk stream into one logical byte stream.
///
/// Consumption stays lazy: each chunk is fetched only as the consumer
/// advances. Reassembly inconsistencies surface as
/// [`DownloadError::CorruptData`] mid-stream.
pub fn into_byte_stream(file_id: FileId, chunks: ChunkStream) -> ByteStream {
    Box::pin(chunks.map(move |item| match item {
        Ok((_seq, data)) => Ok(data),
        Err(e) => Err(DownloadError::from_chunk_error(file_id, e)),
    }))
}

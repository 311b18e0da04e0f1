//! Repository trait definitions.

pub mod chunks;
pub mod files;

pub use chunks::{ChunkStore, ChunkStream};
pub use files::{FileCursor, FileIndex};

use crate::error::StoreResult;
use async_trait::async_trait;

/// Combined store trait: everything the engine needs from persistence.
#[async_trait]
pub trait BlobStore: FileIndex + ChunkStore + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> StoreResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> StoreResult<()>;
}

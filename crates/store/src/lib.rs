//! Persistence layer: file metadata and chunk storage over SQLite.
//!
//! The SQLite database plays the role of the durable document substrate:
//! every statement issued here is a single atomic write, read, or ordered
//! scan. The [`FileIndex`] and [`ChunkStore`] traits are the only surface
//! the engine sees; [`SqliteStore`] implements both.

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use repos::{BlobStore, ChunkStore, ChunkStream, FileCursor, FileIndex};
pub use store::SqliteStore;

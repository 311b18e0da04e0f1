//! Blob engine: orchestrates the file index and chunk store into whole-file
//! upload, download, listing, and deletion, and owns the consistency
//! contract between the two.

pub mod engine;
pub mod error;
pub mod stream;

pub use engine::{BlobEngine, ByteStream, FileStream};
pub use error::{DeleteError, DownloadError, UploadError};
pub use stream::ChunkWindows;

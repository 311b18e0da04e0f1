//! Core domain types shared across the coffer crates.
//!
//! This crate defines the canonical data model used everywhere else:
//! - File identifiers and the file status machine
//! - File records and chunk-size math
//! - Configuration types
//! - The core error type

pub mod chunk;
pub mod config;
pub mod error;
pub mod file;

pub use chunk::{chunk_count, validate_chunk_size};
pub use error::{Error, Result};
pub use file::{FileId, FileRecord, FileStatus};

/// Default chunk size: 255 KiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 255 * 1024;

/// Maximum chunk size: 16 MiB.
pub const MAX_CHUNK_SIZE: u64 = 16 * 1024 * 1024;

/// Minimum chunk size: 1 KiB.
pub const MIN_CHUNK_SIZE: u64 = 1024;

//! HTTP handlers.

pub mod files;
pub mod health;

pub use files::{delete_file, download_file, list_files, upload_file};
pub use health::health_check;

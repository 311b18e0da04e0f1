//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Public base URL used to derive download links
    /// (e.g., "https://files.example.com"). Falls back to the bind address.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Default chunk size in bytes for new uploads.
    #[serde(default = "default_chunk_size")]
    pub default_chunk_size: u64,
    /// Maximum chunk size in bytes.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: u64,
    /// Maximum accepted upload body size in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_chunk_size() -> u64 {
    crate::DEFAULT_CHUNK_SIZE
}

fn default_max_chunk_size() -> u64 {
    crate::MAX_CHUNK_SIZE
}

fn default_max_upload_size() -> usize {
    1024 * 1024 * 1024 // 1 GiB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_base_url: None,
            default_chunk_size: default_chunk_size(),
            max_chunk_size: default_max_chunk_size(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

impl ServerConfig {
    /// Validate the configuration.
    ///
    /// Returns warnings for legal-but-suspicious settings, or an error
    /// message for settings the server cannot run with.
    pub fn validate(&self) -> Result<Vec<String>, String> {
        let mut warnings = Vec::new();

        if crate::validate_chunk_size(self.default_chunk_size).is_err() {
            return Err(format!(
                "default_chunk_size {} out of bounds [{}, {}]",
                self.default_chunk_size,
                crate::MIN_CHUNK_SIZE,
                crate::MAX_CHUNK_SIZE
            ));
        }
        if self.default_chunk_size > self.max_chunk_size {
            return Err(format!(
                "default_chunk_size {} exceeds max_chunk_size {}",
                self.default_chunk_size, self.max_chunk_size
            ));
        }
        if (self.max_upload_size as u64) < self.default_chunk_size {
            warnings.push(format!(
                "max_upload_size {} is smaller than one chunk ({}); every upload will fit in a single partial chunk",
                self.max_upload_size, self.default_chunk_size
            ));
        }

        Ok(warnings)
    }

    /// Base URL for derived download links.
    pub fn base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.bind),
        }
    }
}

/// Store backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// SQLite-backed store.
    Sqlite {
        /// Path to the database file.
        path: PathBuf,
        /// Advisory query timeout in seconds.
        query_timeout_secs: Option<u64>,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/coffer.db"),
            query_timeout_secs: None,
        }
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistence settings.
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Create a configuration with test-friendly defaults.
    pub fn for_testing() -> Self {
        Self::default()
    }
}

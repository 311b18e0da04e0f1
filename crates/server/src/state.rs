//! Application state shared across handlers.

use coffer_core::FileId;
use coffer_core::config::AppConfig;
use coffer_engine::BlobEngine;
use coffer_store::BlobStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Persistence layer.
    pub store: Arc<dyn BlobStore>,
    /// Blob engine.
    pub engine: Arc<BlobEngine>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Validates the configuration and logs warnings for suspicious
    /// settings.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn new(config: AppConfig, store: Arc<dyn BlobStore>) -> Self {
        match config.server.validate() {
            Ok(warnings) => {
                for warning in warnings {
                    tracing::warn!("Configuration warning: {}", warning);
                }
            }
            Err(error) => {
                panic!("Invalid server configuration: {}", error);
            }
        }

        let engine = match BlobEngine::new(store.clone(), config.server.default_chunk_size) {
            Ok(engine) => Arc::new(engine),
            Err(error) => panic!("Invalid chunk size configuration: {}", error),
        };

        Self {
            config: Arc::new(config),
            store,
            engine,
        }
    }

    /// Derive the public download URL for a file.
    pub fn file_url(&self, id: FileId) -> String {
        format!("{}/files/{}", self.config.server.base_url(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffer_core::config::ServerConfig;
    use coffer_store::SqliteStore;
    use tempfile::tempdir;

    async fn build_state(config: AppConfig) -> (tempfile::TempDir, AppState) {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("coffer.db");
        let store: Arc<dyn BlobStore> = Arc::new(SqliteStore::new(&db_path, None).await.unwrap());
        (temp, AppState::new(config, store))
    }

    #[tokio::test]
    async fn file_url_uses_bind_address_by_default() {
        let (_temp, state) = build_state(AppConfig::for_testing()).await;
        let id = FileId::new();
        assert_eq!(state.file_url(id), format!("http://127.0.0.1:5000/files/{id}"));
    }

    #[tokio::test]
    async fn file_url_prefers_public_base_url() {
        let mut config = AppConfig::for_testing();
        config.server = ServerConfig {
            public_base_url: Some("https://files.example.com/".to_string()),
            ..Default::default()
        };

        let (_temp, state) = build_state(config).await;
        let id = FileId::new();
        assert_eq!(
            state.file_url(id),
            format!("https://files.example.com/files/{id}")
        );
    }

    #[tokio::test]
    #[should_panic(expected = "Invalid server configuration")]
    async fn invalid_config_panics() {
        let mut config = AppConfig::for_testing();
        config.server.default_chunk_size = 1; // Below the minimum
        build_state(config).await;
    }
}

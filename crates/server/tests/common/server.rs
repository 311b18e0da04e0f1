//! Server test utilities.

use coffer_core::config::{AppConfig, StoreConfig};
use coffer_engine::BlobEngine;
use coffer_server::{AppState, create_router};
use coffer_store::{BlobStore, SqliteStore};
use std::sync::Arc;
use tempfile::TempDir;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("coffer.db");

        let store: Arc<dyn BlobStore> = Arc::new(
            SqliteStore::new(&db_path, None)
                .await
                .expect("Failed to create store"),
        );

        let mut config = AppConfig::for_testing();
        config.store = StoreConfig::Sqlite {
            path: db_path,
            query_timeout_secs: None,
        };
        modifier(&mut config);

        let state = AppState::new(config, store);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying store.
    pub fn store(&self) -> Arc<dyn BlobStore> {
        self.state.store.clone()
    }

    /// Get access to the engine.
    pub fn engine(&self) -> Arc<BlobEngine> {
        self.state.engine.clone()
    }
}

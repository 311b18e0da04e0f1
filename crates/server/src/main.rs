//! Coffer server binary.

use anyhow::{Context, Result};
use clap::Parser;
use coffer_core::config::{AppConfig, StoreConfig};
use coffer_server::{AppState, create_router};
use coffer_store::{BlobStore, SqliteStore};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Coffer - A chunked blob store with an HTTP gateway
#[derive(Parser, Debug)]
#[command(name = "cofferd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "COFFER_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Startup banner
    tracing::info!("Coffer v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration. Both the file and the environment are optional;
    // every field has a default.
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();

    if config_path.exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}, using defaults", args.config);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("COFFER_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Initialize the store (runs migrations)
    let store: Arc<dyn BlobStore> = match &config.store {
        StoreConfig::Sqlite {
            path,
            query_timeout_secs,
        } => Arc::new(
            SqliteStore::new(path, *query_timeout_secs)
                .await
                .context("failed to initialize store")?,
        ),
    };
    tracing::info!("Store initialized");

    // Verify store connectivity before accepting requests, so the server
    // never reports healthy while its database is unusable.
    store
        .health_check()
        .await
        .context("store health check failed")?;
    tracing::info!("Store connectivity verified");

    // Create application state and router
    let state = AppState::new(config.clone(), store);
    let app = create_router(state);

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

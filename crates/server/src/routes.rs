//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let max_upload_size = state.config.server.max_upload_size;

    Router::new()
        .route("/upload", post(handlers::upload_file))
        .route("/files", get(handlers::list_files))
        .route(
            "/files/{file_id}",
            get(handlers::download_file).delete(handlers::delete_file),
        )
        // Health check (intentionally unauthenticated for load balancers/probes)
        .route("/health", get(handlers::health_check))
        // Middleware layers are applied in reverse order (outermost first):
        // TraceLayer -> CORS -> body limit -> handler.
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

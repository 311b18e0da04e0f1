//! Health check handler.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use coffer_store::BlobStore;
use serde_json::{Value, json};

/// GET /health - Liveness probe; verifies store connectivity.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.store.health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}

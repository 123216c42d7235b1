//! Fix cache handlers

use crate::handlers::AppState;
use crate::services::FixCacheStats;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Response to an operator reset
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    pub cleared: usize,
}

/// GET /v1/fix-cache
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<FixCacheStats> {
    Json(state.agent.cache_stats())
}

/// DELETE /v1/fix-cache
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<ClearCacheResponse> {
    let cleared = state.agent.clear_cache();
    info!("Operator cleared the fix cache ({} entries)", cleared);
    Json(ClearCacheResponse { cleared })
}

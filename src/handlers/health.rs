//! Health check handlers
//!
//! Provides application health status check endpoints

use crate::handlers::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const SERVICE_NAME: &str = "aiapiagent";

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
    /// Version information
    pub version: String,
    /// Timestamp
    pub timestamp: String,
    /// Details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

/// Check result
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDetails {
    /// Reasoning model used for fix planning
    pub reasoning_model: String,
    /// Operations known to the endpoint catalog
    pub catalog_endpoints: usize,
    /// Entries in the fix cache
    pub cached_fixes: usize,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Memory usage (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<MemoryUsage>,
}

/// Memory usage information
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryUsage {
    /// Used memory in bytes
    pub used_bytes: u64,
    /// Total memory in bytes
    pub total_bytes: u64,
    /// Usage percentage
    pub usage_percent: f64,
}

fn details(state: &AppState) -> HealthDetails {
    let stats = state.agent.cache_stats();
    HealthDetails {
        reasoning_model: stats.model,
        catalog_endpoints: state.agent.catalog().endpoint_count(),
        cached_fixes: stats.cache.total_entries,
        uptime_seconds: get_uptime_seconds(),
        memory_usage: get_memory_usage(),
    }
}

fn response(status: &str, details: HealthDetails) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details: Some(details),
    }
}

/// Basic health check
///
/// Returns basic service status information
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Executing health check");
    Json(response("healthy", details(&state)))
}

/// Readiness check
///
/// GET /health/ready
/// Ready once the catalog knows at least one operation
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    debug!("Executing readiness check");

    let details = details(&state);
    if details.catalog_endpoints == 0 {
        return Err((StatusCode::SERVICE_UNAVAILABLE, Json(response("not_ready", details))));
    }

    Ok(Json(response("ready", details)))
}

/// Liveness check
///
/// GET /health/live
/// Does not check external dependencies
pub async fn liveness_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Executing liveness check");
    Json(response("alive", details(&state)))
}

/// Seconds since the first health check
fn get_uptime_seconds() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs()
}

/// Resident and virtual memory of this process, Linux only
fn get_memory_usage() -> Option<MemoryUsage> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;

    let field_bytes = |name: &str| -> Option<u64> {
        status
            .lines()
            .find(|line| line.starts_with(name))?
            .split_whitespace()
            .nth(1)?
            .parse::<u64>()
            .ok()
            .map(|kb| kb * 1024)
    };

    let used = field_bytes("VmRSS:")?;
    let total = field_bytes("VmSize:")?;
    let usage_percent = if total > 0 {
        (used as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    Some(MemoryUsage {
        used_bytes: used,
        total_bytes: total,
        usage_percent,
    })
}

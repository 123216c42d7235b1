//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod cache;
pub mod health;
pub mod operations;
pub mod rules;

use crate::config::Settings;
use crate::middleware::{auth::operator_auth_middleware, logging::request_logging_middleware};
use crate::services::OperationAgent;
use crate::utils::error::AppError;
use axum::{
    http::Uri,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Largest accepted request body
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub agent: Arc<OperationAgent>,
}

/// Create application router
pub fn create_router(settings: Settings, agent: Arc<OperationAgent>) -> Router {
    let cors_enabled = settings.security.cors_enabled;

    // Create application state
    let app_state = Arc::new(AppState { settings, agent });

    // Create routes
    let mut router = Router::new()
        .route("/v1/operations", post(operations::handle_operation))
        .route("/v1/fix-cache", get(cache::cache_stats).delete(cache::clear_cache))
        .route("/v1/validation-rules", get(rules::validation_rules))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(app_state.clone(), operator_auth_middleware))
        .layer(middleware::from_fn(request_logging_middleware))
        .with_state(app_state);

    // Create middleware stack
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES));
    router = router.layer(middleware_stack);

    if cors_enabled {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

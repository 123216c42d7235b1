//! Authentication middleware
//!
//! Guards operator endpoints with the configured operator key

use crate::config::SecurityConfig;
use crate::handlers::AppState;
use crate::utils::error::{helpers, AppError};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Operator authentication middleware
///
/// Only destructive operator routes are checked. When no operator key is
/// configured they stay open.
pub async fn operator_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !is_operator_route(request.method(), request.uri().path()) {
        return Ok(next.run(request).await);
    }

    debug!("Executing operator authentication");
    verify_operator_key(&state.settings.security, &headers)?;
    Ok(next.run(request).await)
}

/// Routes that need the operator key
pub fn is_operator_route(method: &Method, path: &str) -> bool {
    method == Method::DELETE && path.starts_with("/v1/fix-cache")
}

/// Check the operator key header against the configured key
pub fn verify_operator_key(security: &SecurityConfig, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = security.operator_api_key.as_deref() else {
        return Ok(());
    };

    let provided = headers
        .get(security.operator_key_header.as_str())
        .and_then(|h| h.to_str().ok())
        .map(str::trim);

    match provided {
        Some(key) if key == expected => {
            debug!("Operator authentication successful");
            Ok(())
        }
        Some(_) => {
            warn!("Invalid operator key");
            Err(helpers::auth_error("Invalid operator key"))
        }
        None => {
            warn!("Missing operator key header: {}", security.operator_key_header);
            Err(helpers::auth_error(format!(
                "Missing {} header",
                security.operator_key_header
            )))
        }
    }
}

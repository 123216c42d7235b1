//! Operation handler
//!
//! POST /v1/operations: run one natural-language operation against the target API

use crate::handlers::AppState;
use crate::models::operation::{OperationOutcome, OperationRequest};
use crate::services::StaticCredentials;
use crate::utils::error::{helpers, AppResult};
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    response::Json,
};
use std::sync::Arc;
use tracing::debug;

/// Longest accepted query
const MAX_QUERY_CHARS: usize = 2000;

/// Handle an operation request
///
/// The outcome is returned with 200 whether or not the operation succeeded;
/// only malformed requests are rejected.
pub async fn handle_operation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<OperationRequest>,
) -> AppResult<Json<OperationOutcome>> {
    if request.query.trim().is_empty() {
        return Err(helpers::validation_error("Query cannot be empty"));
    }
    if request.query.chars().count() > MAX_QUERY_CHARS {
        return Err(helpers::validation_error(format!(
            "Query cannot exceed {} characters",
            MAX_QUERY_CHARS
        )));
    }

    let token = request.token.clone().or_else(|| bearer_from_headers(&headers));
    debug!("Handling operation (token provided: {})", token.is_some());

    let credentials = StaticCredentials::new(token);
    let outcome = state.agent.handle_user_operation(&request.query, &credentials).await;

    Ok(Json(outcome))
}

/// Token from an `Authorization: Bearer ...` header
fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

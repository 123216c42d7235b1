//! Validation rules handler
//!
//! GET /v1/validation-rules?entity=categories[&endpoint=/api/categories]

use crate::handlers::AppState;
use crate::models::intent::Entity;
use crate::utils::error::{helpers, AppResult};
use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct ValidationRulesQuery {
    pub entity: Entity,
    /// Defaults to the entity's collection path
    pub endpoint: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationRulesResponse {
    pub entity: Entity,
    pub endpoint: String,
    pub rules: String,
}

/// Describe the validation rules for an entity
pub async fn validation_rules(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ValidationRulesQuery>,
) -> AppResult<Json<ValidationRulesResponse>> {
    let endpoint = match query.endpoint.filter(|e| !e.trim().is_empty()) {
        Some(endpoint) if endpoint.starts_with('/') => endpoint,
        Some(_) => return Err(helpers::validation_error("Endpoint must start with '/'")),
        None => query
            .entity
            .collection_path()
            .ok_or_else(|| helpers::validation_error("A known entity is required"))?,
    };

    debug!("Fetching validation rules for {} at {}", query.entity, endpoint);
    let rules = state.agent.validation_rules(&endpoint, query.entity).await;

    Ok(Json(ValidationRulesResponse {
        entity: query.entity,
        endpoint,
        rules,
    }))
}

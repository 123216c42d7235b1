//! Request builder
//!
//! Turns an `Intent` into a `RequestSpec`, validating required fields and
//! credentials before anything touches the network.

use crate::models::catalog::{path_params, EndpointCandidate, HttpMethod};
use crate::models::intent::{AccessLevel, Action, Entity, Intent};
use crate::models::request::RequestSpec;
use crate::services::credentials::CredentialProvider;
use crate::utils::error::BuildError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Fields a create needs when no catalog operation says otherwise
fn required_fields_for(entity: Entity) -> &'static [&'static str] {
    match entity {
        Entity::Categories | Entity::Products => &["name", "slug"],
        Entity::Orders | Entity::Customers | Entity::Unknown => &[],
    }
}

/// Operation chosen for an intent before parameters are applied
struct Operation {
    method: HttpMethod,
    path_template: String,
    required: Vec<String>,
    auth_required: bool,
}

impl Operation {
    fn from_candidate(intent: &Intent, candidate: &EndpointCandidate) -> Self {
        let required = if intent.action.writes_fields() {
            candidate.required_params.clone()
        } else {
            Vec::new()
        };

        Self {
            method: candidate.method,
            path_template: candidate.path_template.clone(),
            required,
            auth_required: candidate.auth_required,
        }
    }

    /// REST convention on `/api/{entity}`
    fn from_convention(intent: &Intent) -> Result<Self, BuildError> {
        let collection = intent.entity.collection_path().ok_or(BuildError::UnresolvedIntent)?;
        let method = intent.action.http_method().ok_or(BuildError::UnresolvedIntent)?;

        let item = format!("{}/{{id}}", collection);
        let path_template = match intent.action {
            Action::Create => collection,
            Action::Retrieve if intent.parameters.contains_key("id") => item,
            Action::Retrieve => collection,
            Action::Update | Action::Delete => item,
            Action::Unknown => return Err(BuildError::UnresolvedIntent),
        };

        let required = if intent.action == Action::Create {
            required_fields_for(intent.entity).iter().map(|f| f.to_string()).collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            method,
            path_template,
            required,
            auth_required: false,
        })
    }

    /// Declared fields followed by path placeholders, without duplicates
    fn all_required(&self) -> Vec<String> {
        let mut fields = self.required.clone();
        for param in path_params(&self.path_template) {
            if !fields.contains(&param) {
                fields.push(param);
            }
        }
        fields
    }
}

/// Builds request specs from intents
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder;

impl RequestBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the request for an intent
    ///
    /// Missing fields are reported first, then missing credentials. Neither
    /// check performs any I/O.
    pub fn build(&self, intent: &Intent, credentials: &dyn CredentialProvider) -> Result<RequestSpec, BuildError> {
        let operation = match &intent.endpoint {
            Some(candidate) => Operation::from_candidate(intent, candidate),
            None => Operation::from_convention(intent)?,
        };

        let missing: Vec<String> = operation
            .all_required()
            .into_iter()
            .filter(|field| !has_value(&intent.parameters, field))
            .collect();
        if !missing.is_empty() {
            debug!("Missing required fields for {} {}: {:?}", intent.action, intent.entity, missing);
            return Err(BuildError::MissingFields { required: missing });
        }

        let unsafe_field = path_params(&operation.path_template).into_iter().find(|field| {
            let value = intent.parameters.get(field).map(query_value).unwrap_or_default();
            !is_safe_segment(&value)
        });
        if let Some(field) = unsafe_field {
            debug!("Rejected path value for {}", field);
            return Err(BuildError::InvalidPathValue { field });
        }

        let auth_required = intent.access_level == AccessLevel::Admin || operation.auth_required;
        let bearer_token = credentials.get_bearer_token();
        if auth_required && bearer_token.is_none() {
            return Err(BuildError::AuthRequired {
                action: intent.action,
                entity: intent.entity,
            });
        }

        let mut remaining = intent.parameters.clone();
        let path = fill_path(&operation.path_template, &mut remaining);

        let (query, body) = if operation.method.carries_body() {
            (BTreeMap::new(), Some(remaining))
        } else {
            (to_query(&remaining), None)
        };

        let spec = RequestSpec {
            method: operation.method,
            path,
            query,
            body,
            auth_required,
            bearer_token,
        };

        debug!("🔧 Built request {}", spec.label());
        Ok(spec)
    }

    /// Merge a fix into a previously built request
    ///
    /// Only the fields named in `fixed_data` change; method, path and auth flag
    /// are carried over. Credentials are looked up again.
    pub fn rebuild_with_fix(
        &self,
        original: &RequestSpec,
        fixed_data: &Map<String, Value>,
        credentials: &dyn CredentialProvider,
    ) -> Result<RequestSpec, BuildError> {
        let bearer_token = credentials.get_bearer_token();
        if original.auth_required && bearer_token.is_none() {
            return Err(BuildError::AuthRequired {
                action: Action::from_method(original.method),
                entity: Entity::from_path(&original.path),
            });
        }

        let mut rebuilt = original.clone();
        rebuilt.bearer_token = bearer_token;

        if original.method.carries_body() {
            let mut body = original.body.clone().unwrap_or_default();
            for (key, value) in fixed_data {
                body.insert(key.clone(), value.clone());
            }
            rebuilt.body = Some(body);
        } else {
            for (key, value) in fixed_data {
                rebuilt.query.insert(key.clone(), query_value(value));
            }
        }

        debug!("🔁 Rebuilt request {} with fixed fields {:?}", rebuilt.label(), fixed_data.keys().collect::<Vec<_>>());
        Ok(rebuilt)
    }
}

fn has_value(parameters: &Map<String, Value>, field: &str) -> bool {
    match parameters.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// A path value must stay inside its own segment
fn is_safe_segment(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.chars().any(|c| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_control())
}

/// Substitute placeholders, consuming the parameters used
fn fill_path(template: &str, parameters: &mut Map<String, Value>) -> String {
    let mut path = template.to_string();
    for name in path_params(template) {
        if let Some(value) = parameters.remove(&name) {
            path = path.replace(&format!("{{{}}}", name), &query_value(&value));
        }
    }
    path
}

fn to_query(parameters: &Map<String, Value>) -> BTreeMap<String, String> {
    parameters
        .iter()
        .map(|(key, value)| (key.clone(), query_value(value)))
        .collect()
}

/// Strings verbatim, everything else as JSON text
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! Intent data models
//!
//! Structured interpretation of a natural-language request

use crate::models::catalog::{EndpointCandidate, HttpMethod};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// What the user wants to do with the target entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Retrieve,
    Update,
    Delete,
    Unknown,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Retrieve => "retrieve",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Unknown => "unknown",
        }
    }

    /// Access level required to perform this action
    pub fn access_level(&self) -> AccessLevel {
        match self {
            Action::Create | Action::Update | Action::Delete => AccessLevel::Admin,
            Action::Retrieve | Action::Unknown => AccessLevel::Public,
        }
    }

    /// HTTP method conventionally used for this action
    pub fn http_method(&self) -> Option<HttpMethod> {
        match self {
            Action::Create => Some(HttpMethod::Post),
            Action::Retrieve => Some(HttpMethod::Get),
            Action::Update => Some(HttpMethod::Patch),
            Action::Delete => Some(HttpMethod::Delete),
            Action::Unknown => None,
        }
    }

    /// Whether a catalog operation with `method` can serve this action
    pub fn accepts_method(&self, method: HttpMethod) -> bool {
        match self {
            Action::Create => method == HttpMethod::Post,
            Action::Retrieve => method == HttpMethod::Get,
            Action::Update => matches!(method, HttpMethod::Patch | HttpMethod::Put),
            Action::Delete => method == HttpMethod::Delete,
            Action::Unknown => false,
        }
    }

    /// Whether required-field validation applies to this action
    pub fn writes_fields(&self) -> bool {
        matches!(self, Action::Create | Action::Update)
    }

    /// Action a bare HTTP method stands for
    pub fn from_method(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Post => Action::Create,
            HttpMethod::Get => Action::Retrieve,
            HttpMethod::Put | HttpMethod::Patch => Action::Update,
            HttpMethod::Delete => Action::Delete,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource type the request is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Categories,
    Products,
    Orders,
    Customers,
    Unknown,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Categories => "categories",
            Entity::Products => "products",
            Entity::Orders => "orders",
            Entity::Customers => "customers",
            Entity::Unknown => "unknown",
        }
    }

    /// Collection path on the target API
    pub fn collection_path(&self) -> Option<String> {
        match self {
            Entity::Unknown => None,
            entity => Some(format!("/api/{}", entity.as_str())),
        }
    }

    /// Whether a path template refers to this entity (singular or plural)
    pub fn matches_path(&self, path: &str) -> bool {
        let stem = match self {
            Entity::Categories => "categor",
            Entity::Products => "product",
            Entity::Orders => "order",
            Entity::Customers => "customer",
            Entity::Unknown => return false,
        };
        path.to_lowercase().contains(stem)
    }

    /// First entity, in priority order, that a path refers to
    pub fn from_path(path: &str) -> Self {
        [Entity::Categories, Entity::Products, Entity::Orders, Entity::Customers]
            .into_iter()
            .find(|entity| entity.matches_path(path))
            .unwrap_or(Entity::Unknown)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access level an operation requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Public,
    Admin,
}

/// Resolved intent
///
/// Created once per query and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intent {
    pub action: Action,
    pub entity: Entity,
    /// Parameters extracted from the query text
    pub parameters: Map<String, Value>,
    pub access_level: AccessLevel,
    /// Match confidence in [0, 1]
    pub confidence: f64,
    /// Catalog operation agreeing with the resolved action, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointCandidate>,
}

impl Intent {
    /// Intent for a query nothing could be matched in
    pub fn unknown() -> Self {
        Self {
            action: Action::Unknown,
            entity: Entity::Unknown,
            parameters: Map::new(),
            access_level: AccessLevel::Public,
            confidence: 0.0,
            endpoint: None,
        }
    }

    /// Compact record for the caller's conversation history
    pub fn summary(&self) -> IntentSummary {
        IntentSummary {
            action: self.action,
            entity: self.entity,
            confidence: self.confidence,
        }
    }
}

/// The parts of an intent that outlive the turn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentSummary {
    pub action: Action,
    pub entity: Entity,
    pub confidence: f64,
}

//! Intent resolver
//!
//! Keyword heuristic that turns a free-text query into an `Intent`. No model is
//! invoked here: the vocabulary tables below are the single source of truth.
//!
//! Known limitation: parameter and id extraction is best effort. A query naming
//! several resource types resolves to the first entity in priority order, and the
//! first id-looking word is taken as the id.

use crate::models::catalog::EndpointCandidate;
use crate::models::intent::{Action, Entity, Intent};
use serde_json::{Map, Value};
use tracing::debug;

/// Bumped whenever a keyword list changes
pub const VOCABULARY_VERSION: u32 = 1;

/// Keywords that select an action
pub struct ActionRule {
    pub action: Action,
    pub keywords: &'static [&'static str],
}

/// Keywords that select an entity
pub struct EntityRule {
    pub entity: Entity,
    pub keywords: &'static [&'static str],
}

/// Action vocabulary in priority order: the first rule with a matching token wins
pub const ACTION_VOCABULARY: &[ActionRule] = &[
    ActionRule {
        action: Action::Create,
        keywords: &["create", "add", "створи", "додай", "додати"],
    },
    ActionRule {
        action: Action::Retrieve,
        keywords: &["get", "show", "list", "find", "fetch", "покажи", "знайди", "отримай"],
    },
    ActionRule {
        action: Action::Update,
        keywords: &["update", "change", "edit", "modify", "онови", "зміни"],
    },
    ActionRule {
        action: Action::Delete,
        keywords: &["delete", "remove", "видали"],
    },
];

/// Entity vocabulary in priority order: the first rule with a matching token wins
pub const ENTITY_VOCABULARY: &[EntityRule] = &[
    EntityRule {
        entity: Entity::Categories,
        keywords: &["category", "categories", "категорія", "категорію", "категорії"],
    },
    EntityRule {
        entity: Entity::Products,
        keywords: &["product", "products", "товар", "товари"],
    },
    EntityRule {
        entity: Entity::Orders,
        keywords: &["order", "orders", "замовлення"],
    },
    EntityRule {
        entity: Entity::Customers,
        keywords: &["customer", "customers", "клієнт", "клієнти"],
    },
];

const NAME_MARKERS: &[&str] = &["name", "назва"];
const DESCRIPTION_MARKERS: &[&str] = &["description", "опис"];
const INACTIVE_MARKERS: &[&str] = &["inactive", "неактивна"];
const ACTIVE_MARKERS: &[&str] = &["active", "активна"];

pub const CONFIDENCE_FULL_MATCH: f64 = 0.8;
pub const CONFIDENCE_PARTIAL_MATCH: f64 = 0.5;

/// Keyword-based intent resolver
#[derive(Debug, Clone, Default)]
pub struct IntentResolver;

impl IntentResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a query, optionally guided by the catalog's top candidate
    ///
    /// Never fails: unmatched parts stay `Unknown` and lower the confidence.
    pub fn resolve(&self, query: &str, catalog_hint: Option<&EndpointCandidate>) -> Intent {
        let tokens = tokenize(query);

        let action = match_action(&tokens);
        let entity = match_entity(&tokens);

        if action == Action::Unknown && entity == Entity::Unknown {
            debug!("No action or entity matched");
            return Intent::unknown();
        }

        let confidence = if action != Action::Unknown && entity != Entity::Unknown {
            CONFIDENCE_FULL_MATCH
        } else {
            CONFIDENCE_PARTIAL_MATCH
        };

        let endpoint = catalog_hint
            .filter(|candidate| action.accepts_method(candidate.method))
            .filter(|candidate| entity == Entity::Unknown || entity.matches_path(&candidate.path_template))
            .cloned();

        let parameters = extract_parameters(query, &tokens, action);

        debug!(
            "Resolved intent: action={}, entity={}, confidence={}, params={:?}, endpoint={:?}",
            action,
            entity,
            confidence,
            parameters.keys().collect::<Vec<_>>(),
            endpoint.as_ref().map(|e| format!("{} {}", e.method, e.path_template)),
        );

        Intent {
            action,
            entity,
            parameters,
            access_level: action.access_level(),
            confidence,
            endpoint,
        }
    }
}

/// Lowercased tokens split on every non-alphanumeric character
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn has_any(tokens: &[String], keywords: &[&str]) -> bool {
    tokens.iter().any(|token| keywords.contains(&token.as_str()))
}

fn match_action(tokens: &[String]) -> Action {
    ACTION_VOCABULARY
        .iter()
        .find(|rule| has_any(tokens, rule.keywords))
        .map(|rule| rule.action)
        .unwrap_or(Action::Unknown)
}

fn match_entity(tokens: &[String]) -> Entity {
    ENTITY_VOCABULARY
        .iter()
        .find(|rule| has_any(tokens, rule.keywords))
        .map(|rule| rule.entity)
        .unwrap_or(Entity::Unknown)
}

/// Strip surrounding punctuation and quotes from a word
fn clean_word(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '_')
}

/// Numbers and booleans keep their JSON type, everything else is a string
fn parse_scalar(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

pub(crate) fn looks_like_id(word: &str) -> bool {
    let is_uuid_like = word.chars().count() > 10 && word.contains('-');
    let is_numeric = !word.is_empty() && word.chars().all(|c| c.is_ascii_digit());
    is_uuid_like || is_numeric
}

fn extract_parameters(query: &str, tokens: &[String], action: Action) -> Map<String, Value> {
    let words: Vec<&str> = query.split_whitespace().collect();
    let mut params = Map::new();
    let mut consumed = vec![false; words.len()];

    // Explicit key=value / key:value pairs
    for (i, word) in words.iter().enumerate() {
        let Some((key, value)) = word.split_once('=').or_else(|| word.split_once(':')) else {
            continue;
        };
        let key = clean_word(key);
        let value = value.trim_matches(|c: char| c == '"' || c == '\'' || c == ',');
        if key.is_empty() || value.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
            continue;
        }
        params.insert(key.to_string(), parse_scalar(value));
        consumed[i] = true;
    }

    // "name Foo" / "description Bar": the word after the marker is the value
    for (field, markers) in [("name", NAME_MARKERS), ("description", DESCRIPTION_MARKERS)] {
        if params.contains_key(field) {
            continue;
        }
        let position = words
            .iter()
            .position(|word| markers.contains(&clean_word(word).to_lowercase().as_str()));
        if let Some(i) = position {
            if let Some(next) = words.get(i + 1) {
                let value = clean_word(next);
                if !value.is_empty() {
                    params.insert(field.to_string(), Value::String(value.to_string()));
                    consumed[i] = true;
                    consumed[i + 1] = true;
                }
            }
        }
    }

    if !params.contains_key("id") {
        let id = words
            .iter()
            .enumerate()
            .filter(|(i, _)| !consumed[*i])
            .map(|(_, word)| clean_word(word))
            .find(|word| looks_like_id(word));
        if let Some(id) = id {
            params.insert("id".to_string(), Value::String(id.to_string()));
        }
    }

    if !params.contains_key("isActive") {
        if has_any(tokens, INACTIVE_MARKERS) {
            params.insert("isActive".to_string(), Value::Bool(false));
        } else if has_any(tokens, ACTIVE_MARKERS) {
            params.insert("isActive".to_string(), Value::Bool(true));
        }
    }

    if action == Action::Create && !params.contains_key("slug") {
        if let Some(slug) = params.get("name").and_then(Value::as_str).map(slugify) {
            params.insert("slug".to_string(), Value::String(slug));
        }
    }

    params
}

/// URL-friendly form of a name
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

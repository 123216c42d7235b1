//! AI fix planner
//!
//! Asks the reasoning service for a corrected payload when a call failed for a
//! retry-eligible reason. Answers are memoized in the shared fix cache and
//! validated strictly before use: anything malformed degrades to no fix.

use crate::models::fix::{ApiError, ErrorCategory, FixSuggestion};
use crate::models::intent::Entity;
use crate::models::request::RequestSpec;
use crate::providers::ReasoningService;
use crate::services::classifier::{classify, fallback_explanation, fallback_suggestions, is_retry_eligible};
use crate::utils::fix_cache::{CacheStats, FixCache, FixSignature};
use crate::utils::logging::truncate_content;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str = "You are an expert in REST APIs and data validation. \
Analyze the failed API call and propose a concrete correction of the request payload. \
Answer with a single JSON object and nothing else. The object must have exactly these fields: \
\"fixed_data\" (object with only the corrected fields and their new values), \
\"explanation\" (short explanation for the user), \
\"confidence\" (number between 0.0 and 1.0), \
\"suggestions\" (array of short advice strings).";

const RULES_SYSTEM_PROMPT: &str = "You are an expert in API validation and e-commerce systems. \
Explain validation rules clearly and concisely for an API user.";

/// Why a reasoning answer was rejected
#[derive(Error, Debug)]
pub enum FixParseError {
    #[error("No JSON object found in response")]
    NoJson,

    #[error("Response does not match the fix schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("Confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),

    #[error("Explanation is empty")]
    EmptyExplanation,
}

/// Exact shape the reasoning service must answer with
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFix {
    fixed_data: Map<String, Value>,
    explanation: String,
    confidence: f64,
    suggestions: Vec<String>,
}

/// Cache statistics together with the model that produced the entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixCacheStats {
    #[serde(flatten)]
    pub cache: CacheStats,
    pub model: String,
}

/// Plans fixes for failed calls
pub struct FixPlanner {
    reasoning: Arc<dyn ReasoningService>,
    cache: Arc<FixCache>,
}

impl FixPlanner {
    pub fn new(reasoning: Arc<dyn ReasoningService>, cache: Arc<FixCache>) -> Self {
        Self { reasoning, cache }
    }

    /// Propose a fix, or `None` when no usable fix exists
    ///
    /// Ineligible categories and cache hits cost no reasoning call; a miss costs
    /// exactly one.
    pub async fn plan_fix(&self, error: &ApiError, original: &RequestSpec) -> Option<FixSuggestion> {
        let category = classify(error);
        if !is_retry_eligible(category) {
            debug!("No fix planned for {} error", category);
            return None;
        }

        let signature = FixSignature::new(error.status_code, &error.message);
        if let Some(cached) = self.cache.get(&signature) {
            info!("📋 Using cached fix for: {}", truncate_content(&error.message, 80));
            return Some(cached);
        }

        info!("🔍 Analyzing API error: {}", truncate_content(&error.message, 80));

        let user_prompt = build_user_prompt(error, original);
        let response = match self.reasoning.complete(SYSTEM_PROMPT, &user_prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Reasoning service failed, no fix available: {}", e);
                return None;
            }
        };

        match parse_fix_response(&response) {
            Ok(fix) => {
                debug!("Fix planned with confidence {}", fix.confidence);
                Some(self.cache.insert(signature, fix))
            }
            Err(e) => {
                warn!("Discarding reasoning answer: {}", e);
                None
            }
        }
    }

    /// Describe the validation rules of an operation in plain language
    ///
    /// One reasoning call, never cached. Falls back to a short notice when the
    /// reasoning service fails.
    pub async fn validation_rules(&self, endpoint: &str, entity: Entity) -> String {
        let prompt = format!(
            "Describe the validation rules for {} at the API endpoint {}.\n\n\
             Give a clear explanation with examples:\n\
             - Required fields\n\
             - Data formats\n\
             - Constraints\n\
             - Examples of valid values",
            entity, endpoint
        );

        match self.reasoning.complete(RULES_SYSTEM_PROMPT, &prompt).await {
            Ok(rules) if !rules.trim().is_empty() => rules.trim().to_string(),
            Ok(_) => {
                warn!("Reasoning service returned no validation rules for {}", entity);
                rules_unavailable(entity, "empty answer")
            }
            Err(e) => {
                warn!("Failed to get validation rules for {}: {}", entity, e);
                rules_unavailable(entity, &e.to_string())
            }
        }
    }

    pub fn cache_stats(&self) -> FixCacheStats {
        FixCacheStats {
            cache: self.cache.stats(),
            model: self.reasoning.model().to_string(),
        }
    }

    /// Operator reset; returns the number of dropped entries
    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }
}

fn rules_unavailable(entity: Entity, reason: &str) -> String {
    format!("Could not get validation rules for {}: {}", entity, reason)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn build_user_prompt(error: &ApiError, original: &RequestSpec) -> String {
    let request_body = match original.body_value() {
        Value::Null => "none".to_string(),
        body => pretty(&body),
    };
    let query = if original.query.is_empty() {
        "none".to_string()
    } else {
        serde_json::to_string_pretty(&original.query).unwrap_or_else(|_| format!("{:?}", original.query))
    };
    let response_body = error
        .response_data
        .as_ref()
        .map(pretty)
        .unwrap_or_else(|| "none".to_string());

    format!(
        "Analyze this API error and propose a fix.\n\n\
         Error: {}\n\
         Status code: {}\n\
         Endpoint: {} {}\n\
         Request data: {}\n\
         Query parameters: {}\n\
         Response: {}\n\n\
         Answer in this JSON format:\n\
         {{\"fixed_data\": {{\"field\": \"corrected value\"}}, \"explanation\": \"...\", \"confidence\": 0.8, \"suggestions\": [\"advice 1\", \"advice 2\"]}}",
        error.message, error.status_code, error.method, error.endpoint, request_body, query, response_body
    )
}

/// Locate the JSON object in a model answer
///
/// Handles ```json fences and prose around the object. Without a fence the
/// first complete object wins, so braces in trailing prose are ignored.
pub fn extract_json(text: &str) -> Option<&str> {
    for fence in ["```json", "```JSON"] {
        if let Some(start) = text.find(fence) {
            let content = &text[start + fence.len()..];
            if let Some(end) = content.find("```") {
                return Some(content[..end].trim());
            }
        }
    }

    text.match_indices('{').find_map(|(start, _)| {
        let candidate = &text[start..];
        let mut values = serde_json::Deserializer::from_str(candidate).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Object(_))) => Some(&candidate[..values.byte_offset()]),
            _ => None,
        }
    })
}

/// Strictly validate a reasoning answer
pub fn parse_fix_response(text: &str) -> Result<FixSuggestion, FixParseError> {
    let json = extract_json(text).ok_or(FixParseError::NoJson)?;
    let raw: RawFix = serde_json::from_str(json)?;

    if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
        return Err(FixParseError::InvalidConfidence(raw.confidence));
    }
    if raw.explanation.trim().is_empty() {
        return Err(FixParseError::EmptyExplanation);
    }

    Ok(FixSuggestion {
        fixed_data: raw.fixed_data,
        explanation: raw.explanation.trim().to_string(),
        confidence: raw.confidence,
        suggestions: raw.suggestions,
    })
}

/// Human-readable failure report
///
/// Uses the fix's explanation when there is one, the canned explanation for
/// the category otherwise.
pub fn get_user_friendly_message(error: &ApiError, fix: Option<&FixSuggestion>, category: ErrorCategory) -> String {
    let mut parts = Vec::new();

    parts.push("🚨 API error".to_string());
    parts.push(format!("Endpoint: {} {}", error.method, error.endpoint));
    if error.status_code == 0 {
        parts.push("Status code: none (no response)".to_string());
    } else {
        parts.push(format!("Status code: {}", error.status_code));
    }
    parts.push(String::new());

    parts.push("What happened:".to_string());
    match fix {
        Some(fix) => parts.push(fix.explanation.clone()),
        None => {
            parts.push(fallback_explanation(category).to_string());
            parts.push(format!("API message: {}", error.message));
        }
    }
    parts.push(String::new());

    if let Some(fix) = fix.filter(|fix| !fix.fixed_data.is_empty()) {
        parts.push("Fixed data:".to_string());
        for (key, value) in &fix.fixed_data {
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            parts.push(format!("• {}: `{}`", key, shown));
        }
        parts.push(String::new());
    }

    let suggestions = match fix {
        Some(fix) => fix.suggestions.clone(),
        None => fallback_suggestions(category),
    };
    if !suggestions.is_empty() {
        parts.push("Suggestions:".to_string());
        for (i, suggestion) in suggestions.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, suggestion));
        }
        parts.push(String::new());
    }

    if let Some(fix) = fix {
        parts.push(format!(
            "Fix confidence: {} ({:.1}%)",
            fix.confidence_label(),
            fix.confidence * 100.0
        ));
    }

    parts.join("\n").trim_end().to_string()
}

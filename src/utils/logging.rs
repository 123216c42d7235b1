//! Logging utilities
//!
//! Shared helpers that keep payloads short in log output

use crate::models::request::RequestSpec;
use serde_json::Value;

/// Set to true to include full request and response bodies in debug logs
pub const VERBOSE_REQUEST_LOGGING: bool = false;

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len).collect();
        format!("{}... ({} chars truncated)", kept, s.chars().count() - max_len)
    } else {
        s.to_string()
    }
}

/// Copy of a JSON value with long strings and arrays shortened
pub fn summarize_value(value: &Value) -> Value {
    if VERBOSE_REQUEST_LOGGING {
        return value.clone();
    }

    match value {
        Value::String(s) => Value::String(truncate_content(s, 100)),
        Value::Array(items) if items.len() > 5 => {
            let mut kept: Vec<Value> = items.iter().take(5).map(summarize_value).collect();
            kept.push(Value::String(format!("...and {} more items", items.len() - 5)));
            Value::Array(kept)
        }
        Value::Array(items) => Value::Array(items.iter().map(summarize_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), summarize_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Log summary of a request spec; the bearer token is never included
pub fn create_request_log_summary(spec: &RequestSpec) -> Value {
    serde_json::json!({
        "method": spec.method.as_str(),
        "path": spec.path,
        "query": spec.query,
        "body": summarize_value(&spec.body_value()),
        "auth_required": spec.auth_required,
        "has_token": spec.bearer_token.is_some(),
    })
}

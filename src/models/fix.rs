//! Failure and fix data models

use crate::models::request::{ExecutionResult, RequestSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Cause of a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Authentication,
    Validation,
    NotFound,
    Server,
    Network,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Validation => "validation",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Server => "server",
            ErrorCategory::Network => "network",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized failure record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    /// HTTP status, 0 for transport failures
    pub status_code: u16,
    pub endpoint: String,
    pub method: String,
    pub input_data: Option<Value>,
    pub response_data: Option<Value>,
}

impl ApiError {
    /// Build from a failed execution; `None` for successes
    pub fn from_result(result: &ExecutionResult) -> Option<Self> {
        match result {
            ExecutionResult::Success { .. } => None,
            ExecutionResult::Failure { status, body, request, .. } => {
                Some(Self::from_failure(*status, body, request))
            }
        }
    }

    pub fn from_failure(status: u16, body: &Value, request: &RequestSpec) -> Self {
        Self {
            message: extract_error_message(status, body),
            status_code: status,
            endpoint: request.path.clone(),
            method: request.method.to_string(),
            input_data: request.body.clone().map(Value::Object),
            response_data: match body {
                Value::Null => None,
                other => Some(other.clone()),
            },
        }
    }
}

/// Pull a human-readable message out of an error body
///
/// Order: `message` (string or list of strings), `error`, raw text, `HTTP <status>`.
fn extract_error_message(status: u16, body: &Value) -> String {
    let from_field = |field: &str| -> Option<String> {
        match body.get(field)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Array(items) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("; "))
                }
            }
            _ => None,
        }
    };

    from_field("message")
        .or_else(|| from_field("error"))
        .or_else(|| match body {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// Corrected payload proposed for a failed call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixSuggestion {
    pub fixed_data: Map<String, Value>,
    pub explanation: String,
    /// In [0, 1], never rounded
    pub confidence: f64,
    pub suggestions: Vec<String>,
}

impl FixSuggestion {
    /// Confidence label shown to users
    pub fn confidence_label(&self) -> &'static str {
        if self.confidence > 0.7 {
            "High"
        } else if self.confidence > 0.4 {
            "Medium"
        } else {
            "Low"
        }
    }

    /// Instructions for retrying by hand when the fix is not applied automatically
    pub fn retry_plan(&self) -> RetryPlan {
        RetryPlan {
            retry_data: self.fixed_data.clone(),
            instructions: format!("Try again with the corrected data: {}", self.explanation),
            confidence: self.confidence,
            suggestions: self.suggestions.clone(),
        }
    }
}

/// Manual retry instructions surfaced alongside a fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPlan {
    pub retry_data: Map<String, Value>,
    pub instructions: String,
    pub confidence: f64,
    pub suggestions: Vec<String>,
}

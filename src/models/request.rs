//! Request and execution data models
//!
//! A `RequestSpec` is built once per attempt; an `ExecutionResult` is produced once per HTTP call

use crate::models::catalog::HttpMethod;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Bearer token that never shows up in logs or serialized output
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Fully specified HTTP call, relative to the target API base URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub method: HttpMethod,
    /// Path with all placeholders filled in
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Map<String, Value>>,
    pub auth_required: bool,
    #[serde(skip)]
    pub bearer_token: Option<BearerToken>,
}

impl RequestSpec {
    /// Body fields as a JSON value, `null` when there is no body
    pub fn body_value(&self) -> Value {
        self.body.clone().map(Value::Object).unwrap_or(Value::Null)
    }

    /// `METHOD /path` label for logs and messages
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Outcome of exactly one HTTP call
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecutionResult {
    Success {
        status: u16,
        body: Value,
        headers: BTreeMap<String, String>,
    },
    /// Non-2xx response, or a transport failure with `status == 0`
    Failure {
        status: u16,
        body: Value,
        headers: BTreeMap<String, String>,
        request: RequestSpec,
    },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn status(&self) -> u16 {
        match self {
            ExecutionResult::Success { status, .. } | ExecutionResult::Failure { status, .. } => *status,
        }
    }

    pub fn body(&self) -> &Value {
        match self {
            ExecutionResult::Success { body, .. } | ExecutionResult::Failure { body, .. } => body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_redacted() {
        let spec = RequestSpec {
            method: HttpMethod::Post,
            path: "/api/categories".to_string(),
            query: BTreeMap::new(),
            body: None,
            auth_required: true,
            bearer_token: Some(BearerToken::new("secret-token-value")),
        };

        let debug = format!("{:?}", spec);
        assert!(!debug.contains("secret-token-value"));

        let json = serde_json::to_string(&spec).unwrap();
        assert!(!json.contains("secret-token-value"));
        assert_eq!(spec.label(), "POST /api/categories");
        assert_eq!(spec.body_value(), Value::Null);
    }

    #[test]
    fn test_execution_result_accessors() {
        let result = ExecutionResult::Success {
            status: 201,
            body: serde_json::json!({"id": "1"}),
            headers: BTreeMap::new(),
        };
        assert!(result.is_success());
        assert_eq!(result.status(), 201);
        assert_eq!(result.body()["id"], "1");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "success");
    }
}

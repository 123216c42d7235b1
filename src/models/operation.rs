//! Operation request and outcome models
//!
//! The surface handed back to the chat layer or HTTP endpoint

use crate::models::fix::{ErrorCategory, FixSuggestion, RetryPlan};
use crate::models::intent::IntentSummary;
use crate::models::request::{ExecutionResult, RequestSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Incoming user operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRequest {
    /// Free-text query
    pub query: String,
    /// Bearer token for the target API (optional, header also accepted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Where the pipeline stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Resolved,
    Built,
    Executed,
    Failed,
    Classified,
    PlannedFix,
    Retried,
    /// Terminal: a call succeeded
    Success,
    /// Terminal: the last call failed
    FailedFinal,
    /// Terminal: the intent could not be resolved
    Unresolved,
    /// Terminal: the user must supply more fields
    NeedsInput,
    /// Terminal: the caller must supply credentials
    AuthRequired,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineStage::Success
                | PipelineStage::FailedFinal
                | PipelineStage::Unresolved
                | PipelineStage::NeedsInput
                | PipelineStage::AuthRequired
        )
    }
}

/// Diagnostic record of one HTTP attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    pub status: u16,
    pub response_body: Value,
}

impl AttemptRecord {
    pub fn new(spec: &RequestSpec, result: &ExecutionResult) -> Self {
        Self {
            method: spec.method.to_string(),
            path: spec.path.clone(),
            request_body: spec.body.clone().map(Value::Object),
            status: result.status(),
            response_body: result.body().clone(),
        }
    }
}

/// Result of one user operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub success: bool,
    /// Always non-empty
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixSuggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_plan: Option<RetryPlan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<AttemptRecord>,
    pub stage: PipelineStage,
}

impl OperationOutcome {
    /// Failed outcome carrying only a message
    pub fn failure(message: impl Into<String>, stage: PipelineStage) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            missing_fields: None,
            intent: None,
            category: None,
            fix: None,
            retry_plan: None,
            attempts: Vec::new(),
            stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_stages() {
        assert!(PipelineStage::Success.is_terminal());
        assert!(PipelineStage::FailedFinal.is_terminal());
        assert!(PipelineStage::NeedsInput.is_terminal());
        assert!(!PipelineStage::Classified.is_terminal());
        assert!(!PipelineStage::Retried.is_terminal());
    }

    #[test]
    fn test_failure_outcome_serialization() {
        let outcome = OperationOutcome::failure("Could not understand the request", PipelineStage::Unresolved);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["stage"], "unresolved");
        assert!(json.get("missing_fields").is_none());
        assert!(json.get("attempts").is_none());
    }

    #[test]
    fn test_operation_request_token_optional() {
        let request: OperationRequest = serde_json::from_str(r#"{"query": "show categories"}"#).unwrap();
        assert!(request.token.is_none());
    }
}

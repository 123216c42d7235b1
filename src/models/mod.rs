//! Data models module
//!
//! Defines intents, request specs, failures, fixes and the reasoning-service wire format

pub mod catalog;
pub mod fix;
pub mod intent;
pub mod openai;
pub mod operation;
pub mod request;

pub use catalog::{EndpointCandidate, HttpMethod};
pub use fix::{ApiError, ErrorCategory, FixSuggestion, RetryPlan};
pub use intent::{AccessLevel, Action, Entity, Intent, IntentSummary};
pub use operation::{AttemptRecord, OperationOutcome, OperationRequest, PipelineStage};
pub use request::{BearerToken, ExecutionResult, RequestSpec};

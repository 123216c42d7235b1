//! Retry controller
//!
//! Applies a planned fix at most once. Every refusal is decided before any
//! network call.

use crate::models::fix::{ErrorCategory, FixSuggestion};
use crate::models::request::{ExecutionResult, RequestSpec};
use crate::services::builder::RequestBuilder;
use crate::services::classifier::is_retry_eligible;
use crate::services::credentials::CredentialProvider;
use crate::services::executor::RequestExecutor;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Why a fix was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotRetriedReason {
    /// No usable fix was produced
    NoFix,
    /// The error category is never retried
    IneligibleCategory,
    /// Fix confidence below the configured threshold
    LowConfidence,
    /// Applying the fix would not change the request
    NothingToFix,
    /// Credentials are no longer available
    AuthRequired,
}

impl fmt::Display for NotRetriedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NotRetriedReason::NoFix => "no fix available",
            NotRetriedReason::IneligibleCategory => "error category is not retried",
            NotRetriedReason::LowConfidence => "fix confidence below threshold",
            NotRetriedReason::NothingToFix => "fix does not change the request",
            NotRetriedReason::AuthRequired => "credentials missing for retry",
        };
        f.write_str(text)
    }
}

/// Result of a retry decision
#[derive(Debug, Clone)]
pub enum RetryOutcome {
    /// The corrected request was executed once
    Retried {
        request: RequestSpec,
        result: ExecutionResult,
    },
    NotRetried(NotRetriedReason),
}

/// Executes at most one corrected attempt
pub struct RetryController {
    builder: RequestBuilder,
    executor: RequestExecutor,
    confidence_threshold: f64,
}

impl RetryController {
    pub fn new(executor: RequestExecutor, confidence_threshold: f64) -> Self {
        Self {
            builder: RequestBuilder::new(),
            executor,
            confidence_threshold,
        }
    }

    /// Decide whether the fix may be applied and, if so, execute it once
    pub async fn retry_once(
        &self,
        original: &RequestSpec,
        category: ErrorCategory,
        suggestion: Option<&FixSuggestion>,
        credentials: &dyn CredentialProvider,
    ) -> RetryOutcome {
        let Some(fix) = suggestion else {
            return RetryOutcome::NotRetried(NotRetriedReason::NoFix);
        };

        if !is_retry_eligible(category) {
            return RetryOutcome::NotRetried(NotRetriedReason::IneligibleCategory);
        }

        if fix.confidence < self.confidence_threshold {
            debug!(
                "Fix confidence {} below threshold {}, not retrying",
                fix.confidence, self.confidence_threshold
            );
            return RetryOutcome::NotRetried(NotRetriedReason::LowConfidence);
        }

        let rebuilt = match self.builder.rebuild_with_fix(original, &fix.fixed_data, credentials) {
            Ok(rebuilt) => rebuilt,
            Err(e) => {
                debug!("Cannot rebuild request for retry: {}", e);
                return RetryOutcome::NotRetried(NotRetriedReason::AuthRequired);
            }
        };

        if rebuilt.body == original.body && rebuilt.query == original.query {
            return RetryOutcome::NotRetried(NotRetriedReason::NothingToFix);
        }

        info!("🔁 Retrying {} with corrected data", rebuilt.label());
        let result = self.executor.execute(&rebuilt).await;

        RetryOutcome::Retried {
            request: rebuilt,
            result,
        }
    }
}

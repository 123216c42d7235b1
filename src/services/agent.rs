//! Operation agent
//!
//! Runs one user operation through resolve, build, execute, classify, plan and
//! retry. Each operation is a single sequential pipeline; concurrent operations
//! share only the fix cache.

use crate::config::{AgentConfig, Settings};
use crate::models::fix::ApiError;
use crate::models::intent::{Entity, Intent};
use crate::models::operation::{AttemptRecord, OperationOutcome, PipelineStage};
use crate::models::request::{ExecutionResult, RequestSpec};
use crate::providers::ReasoningService;
use crate::services::builder::RequestBuilder;
use crate::services::catalog::EndpointCatalog;
use crate::services::classifier::classify;
use crate::services::credentials::CredentialProvider;
use crate::services::executor::RequestExecutor;
use crate::services::planner::{get_user_friendly_message, FixCacheStats, FixPlanner};
use crate::services::resolver::IntentResolver;
use crate::services::retry::{NotRetriedReason, RetryController, RetryOutcome};
use crate::utils::error::BuildError;
use crate::utils::fix_cache::FixCache;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

const UNRESOLVED_MESSAGE: &str =
    "Could not understand the request. Try something like \"show categories\" or \"create category name Books\".";

/// Entry point for user operations
pub struct OperationAgent {
    catalog: Arc<dyn EndpointCatalog>,
    resolver: IntentResolver,
    builder: RequestBuilder,
    executor: RequestExecutor,
    planner: FixPlanner,
    retry: RetryController,
    min_intent_confidence: f64,
}

impl OperationAgent {
    /// Create an agent from settings
    pub fn new(
        settings: &Settings,
        catalog: Arc<dyn EndpointCatalog>,
        reasoning: Arc<dyn ReasoningService>,
        cache: Arc<FixCache>,
    ) -> Result<Self> {
        let executor = RequestExecutor::new(settings)?;
        Ok(Self::from_parts(catalog, reasoning, cache, executor, &settings.agent))
    }

    /// Create an agent from already-built collaborators
    pub fn from_parts(
        catalog: Arc<dyn EndpointCatalog>,
        reasoning: Arc<dyn ReasoningService>,
        cache: Arc<FixCache>,
        executor: RequestExecutor,
        config: &AgentConfig,
    ) -> Self {
        Self {
            catalog,
            resolver: IntentResolver::new(),
            builder: RequestBuilder::new(),
            retry: RetryController::new(executor.clone(), config.fix_confidence_threshold),
            executor,
            planner: FixPlanner::new(reasoning, cache),
            min_intent_confidence: config.min_intent_confidence,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn EndpointCatalog> {
        &self.catalog
    }

    pub fn cache_stats(&self) -> FixCacheStats {
        self.planner.cache_stats()
    }

    pub fn clear_cache(&self) -> usize {
        self.planner.clear_cache()
    }

    /// Plain-language validation rules for an entity's operations
    pub async fn validation_rules(&self, endpoint: &str, entity: Entity) -> String {
        self.planner.validation_rules(endpoint, entity).await
    }

    /// Handle one natural-language operation
    ///
    /// Never fails: every path produces an outcome with a non-empty message.
    pub async fn handle_user_operation(&self, query: &str, credentials: &dyn CredentialProvider) -> OperationOutcome {
        let outcome = self.run(query, credentials).await;
        debug_assert!(outcome.stage.is_terminal());
        info!(
            "🏁 Operation finished: stage={:?}, success={}, attempts={}",
            outcome.stage,
            outcome.success,
            outcome.attempts.len()
        );
        outcome
    }

    async fn run(&self, query: &str, credentials: &dyn CredentialProvider) -> OperationOutcome {
        let query = query.trim();
        if query.is_empty() {
            return OperationOutcome::failure(UNRESOLVED_MESSAGE, PipelineStage::Unresolved);
        }

        let hint = match self.catalog.lookup(query).await {
            Ok(candidates) => candidates.into_iter().next(),
            Err(e) => {
                warn!("Catalog lookup failed, continuing without a hint: {}", e);
                None
            }
        };

        let intent = self.resolver.resolve(query, hint.as_ref());
        info!(
            "🧭 Intent: action={}, entity={}, confidence={}",
            intent.action, intent.entity, intent.confidence
        );
        trace_stage(PipelineStage::Resolved);

        if intent.confidence < self.min_intent_confidence {
            return self.outcome(&intent, UNRESOLVED_MESSAGE, PipelineStage::Unresolved);
        }

        let spec = match self.builder.build(&intent, credentials) {
            Ok(spec) => spec,
            Err(e) => return self.build_failure(&intent, e),
        };
        trace_stage(PipelineStage::Built);

        let result = self.executor.execute(&spec).await;
        trace_stage(PipelineStage::Executed);

        let mut attempts = vec![AttemptRecord::new(&spec, &result)];

        let error = match ApiError::from_result(&result) {
            None => {
                let mut outcome = self.outcome(
                    &intent,
                    format!("Operation completed: {} {} (HTTP {})", intent.action, intent.entity, result.status()),
                    PipelineStage::Success,
                );
                outcome.success = true;
                outcome.data = Some(result.body().clone());
                outcome.attempts = attempts;
                return outcome;
            }
            Some(error) => error,
        };
        trace_stage(PipelineStage::Failed);

        let category = classify(&error);
        info!("Classified failure of {} as {}", spec.label(), category);
        trace_stage(PipelineStage::Classified);

        let fix = self.planner.plan_fix(&error, &spec).await;
        if fix.is_some() {
            trace_stage(PipelineStage::PlannedFix);
        }

        let retry = self.retry.retry_once(&spec, category, fix.as_ref(), credentials).await;

        let mut outcome = self.outcome(&intent, String::new(), PipelineStage::FailedFinal);
        outcome.category = Some(category);
        outcome.fix = fix.clone();

        match retry {
            RetryOutcome::Retried { request, result } => {
                trace_stage(PipelineStage::Retried);
                attempts.push(AttemptRecord::new(&request, &result));
                outcome.attempts = attempts;
                self.finish_retry(outcome, &request, result)
            }
            RetryOutcome::NotRetried(reason) => {
                debug!("Not retrying {}: {}", spec.label(), reason);
                outcome.attempts = attempts;
                outcome.message = get_user_friendly_message(&error, fix.as_ref(), category);
                if reason != NotRetriedReason::NothingToFix {
                    outcome.retry_plan = fix.as_ref().map(|f| f.retry_plan());
                }
                outcome
            }
        }
    }

    fn finish_retry(&self, mut outcome: OperationOutcome, request: &RequestSpec, result: ExecutionResult) -> OperationOutcome {
        match ApiError::from_result(&result) {
            None => {
                let explanation = outcome.fix.as_ref().map(|f| f.explanation.clone()).unwrap_or_default();
                outcome.success = true;
                outcome.message = format!(
                    "Operation completed after applying a fix (HTTP {}): {}",
                    result.status(),
                    explanation
                );
                outcome.data = Some(result.body().clone());
                outcome.stage = PipelineStage::Success;
            }
            Some(error) => {
                let category = classify(&error);
                warn!("Retry of {} failed with {}", request.label(), category);
                outcome.category = Some(category);
                outcome.message = get_user_friendly_message(&error, None, category);
            }
        }
        outcome
    }

    fn build_failure(&self, intent: &Intent, error: BuildError) -> OperationOutcome {
        match error {
            BuildError::MissingFields { ref required } => {
                let mut outcome = self.outcome(intent, error.to_string(), PipelineStage::NeedsInput);
                outcome.missing_fields = Some(required.clone());
                outcome
            }
            BuildError::InvalidPathValue { ref field } => {
                let mut outcome = self.outcome(intent, error.to_string(), PipelineStage::NeedsInput);
                outcome.missing_fields = Some(vec![field.clone()]);
                outcome
            }
            BuildError::AuthRequired { .. } => self.outcome(intent, error.to_string(), PipelineStage::AuthRequired),
            BuildError::UnresolvedIntent => self.outcome(intent, UNRESOLVED_MESSAGE, PipelineStage::Unresolved),
        }
    }

    /// Failed outcome carrying the intent summary
    fn outcome(&self, intent: &Intent, message: impl Into<String>, stage: PipelineStage) -> OperationOutcome {
        let mut outcome = OperationOutcome::failure(message, stage);
        outcome.intent = Some(intent.summary());
        outcome
    }
}

fn trace_stage(stage: PipelineStage) {
    debug!(?stage, "pipeline stage");
}

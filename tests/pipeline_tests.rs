//! End-to-end pipeline tests against mocked target API and reasoning service

use aiapiagent::config::{AgentConfig, ReasoningConfig};
use aiapiagent::models::{EndpointCandidate, ErrorCategory, HttpMethod, PipelineStage};
use aiapiagent::providers::{OpenAIReasoningService, ReasoningService};
use aiapiagent::services::classifier::fallback_explanation;
use aiapiagent::services::{OperationAgent, RequestExecutor, StaticCatalog, StaticCredentials};
use aiapiagent::FixCache;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const LETTERS_ONLY: &str = "Category name must contain only letters";

fn reasoning_config(server: &MockServer) -> ReasoningConfig {
    ReasoningConfig {
        api_key: "sk-test".to_string(),
        base_url: server.base_url(),
        model: "gpt-4".to_string(),
        temperature: 0.1,
        max_tokens: 500,
        timeout: 5,
        json_mode: false,
    }
}

fn reasoning(server: &MockServer) -> Arc<dyn ReasoningService> {
    Arc::new(OpenAIReasoningService::new(reasoning_config(server)).unwrap())
}

/// Mock the chat completion endpoint answering with `content`
fn mock_completion<'a>(server: &'a MockServer, content: &str) -> httpmock::Mock<'a> {
    let body = json!({
        "id": "chatcmpl-1",
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    });
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(body);
    })
}

fn agent_with_catalog(
    target: &MockServer,
    reasoning: Arc<dyn ReasoningService>,
    catalog: StaticCatalog,
) -> OperationAgent {
    let executor = RequestExecutor::with_timeout(&target.base_url(), 5).unwrap();
    OperationAgent::from_parts(
        Arc::new(catalog),
        reasoning,
        Arc::new(FixCache::new()),
        executor,
        &AgentConfig::default(),
    )
}

fn agent(target: &MockServer, reasoning: Arc<dyn ReasoningService>) -> OperationAgent {
    agent_with_catalog(target, reasoning, StaticCatalog::default())
}

fn admin() -> StaticCredentials {
    StaticCredentials::new(Some("admin-jwt".to_string()))
}

#[tokio::test]
async fn test_missing_fields_make_no_calls() {
    let target = MockServer::start();
    let llm = MockServer::start();
    let any_target = target.mock(|when, then| {
        when.path_contains("/");
        then.status(201);
    });
    let any_llm = mock_completion(&llm, "{}");

    let outcome = agent(&target, reasoning(&llm))
        .handle_user_operation("Create category", &StaticCredentials::anonymous())
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.stage, PipelineStage::NeedsInput);
    assert_eq!(
        outcome.missing_fields,
        Some(vec!["name".to_string(), "slug".to_string()])
    );
    assert!(!outcome.message.is_empty());
    assert!(outcome.attempts.is_empty());
    any_target.assert_hits(0);
    any_llm.assert_hits(0);
}

#[tokio::test]
async fn test_admin_operation_without_token() {
    let target = MockServer::start();
    let llm = MockServer::start();
    let any_target = target.mock(|when, then| {
        when.path_contains("/");
        then.status(204);
    });

    let outcome = agent(&target, reasoning(&llm))
        .handle_user_operation("delete category 42", &StaticCredentials::anonymous())
        .await;

    assert_eq!(outcome.stage, PipelineStage::AuthRequired);
    assert!(outcome.message.contains("bearer token"));
    any_target.assert_hits(0);
}

#[tokio::test]
async fn test_validation_error_fixed_and_retried() {
    let target = MockServer::start();
    let llm = MockServer::start();

    let rejected = target.mock(|when, then| {
        when.method(POST)
            .path("/api/categories")
            .header("authorization", "Bearer admin-jwt")
            .json_body(json!({"name": "Test123", "slug": "test123"}));
        then.status(400)
            .json_body(json!({"message": LETTERS_ONLY, "statusCode": 400}));
    });
    let accepted = target.mock(|when, then| {
        when.method(POST)
            .path("/api/categories")
            .header("authorization", "Bearer admin-jwt")
            .json_body(json!({"name": "Test", "slug": "test123"}));
        then.status(201)
            .json_body(json!({"id": "c-1", "name": "Test", "slug": "test123"}));
    });
    let completion = mock_completion(
        &llm,
        r#"{"fixed_data": {"name": "Test"}, "explanation": "Removed the digits from the name", "confidence": 0.9, "suggestions": ["Use letters only"]}"#,
    );

    let outcome = agent(&target, reasoning(&llm))
        .handle_user_operation("create category name Test123", &admin())
        .await;

    rejected.assert_hits(1);
    accepted.assert_hits(1);
    completion.assert_hits(1);

    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.stage, PipelineStage::Success);
    assert_eq!(outcome.category, Some(ErrorCategory::Validation));
    assert_eq!(outcome.data.as_ref().unwrap()["id"], "c-1");
    assert_eq!(outcome.attempts.len(), 2);
    assert_eq!(outcome.attempts[0].status, 400);
    assert_eq!(outcome.attempts[1].status, 201);
    assert_eq!(outcome.fix.as_ref().unwrap().fixed_data["name"], "Test");
    assert!(outcome.message.contains("Removed the digits"));
}

#[tokio::test]
async fn test_server_error_not_retried() {
    let target = MockServer::start();
    let llm = MockServer::start();

    let failing = target.mock(|when, then| {
        when.method(GET).path("/api/categories");
        then.status(500).json_body(json!({"message": "Internal Server Error"}));
    });
    let completion = mock_completion(&llm, "{}");

    let outcome = agent(&target, reasoning(&llm))
        .handle_user_operation("show categories", &StaticCredentials::anonymous())
        .await;

    failing.assert_hits(1);
    completion.assert_hits(0);

    assert!(!outcome.success);
    assert_eq!(outcome.stage, PipelineStage::FailedFinal);
    assert_eq!(outcome.category, Some(ErrorCategory::Server));
    assert!(outcome.fix.is_none());
    assert_eq!(outcome.attempts.len(), 1);
    assert!(outcome.message.contains(fallback_explanation(ErrorCategory::Server)));
}

#[tokio::test]
async fn test_unparsable_reasoning_answer() {
    let target = MockServer::start();
    let llm = MockServer::start();

    let rejected = target.mock(|when, then| {
        when.method(POST).path("/api/categories");
        then.status(400).json_body(json!({"message": LETTERS_ONLY}));
    });
    let completion = mock_completion(&llm, "Sorry, I am not sure what went wrong.");

    let outcome = agent(&target, reasoning(&llm))
        .handle_user_operation("create category name Test123", &admin())
        .await;

    rejected.assert_hits(1);
    completion.assert_hits(1);

    assert_eq!(outcome.stage, PipelineStage::FailedFinal);
    assert_eq!(outcome.category, Some(ErrorCategory::Validation));
    assert!(outcome.fix.is_none());
    assert!(outcome.retry_plan.is_none());
    assert_eq!(outcome.attempts.len(), 1);
    assert!(outcome.message.contains(fallback_explanation(ErrorCategory::Validation)));
    assert!(outcome.message.contains(LETTERS_ONLY));
}

#[tokio::test]
async fn test_low_confidence_fix_surfaced_without_retry() {
    let target = MockServer::start();
    let llm = MockServer::start();

    let rejected = target.mock(|when, then| {
        when.method(POST).path("/api/categories");
        then.status(400).json_body(json!({"message": LETTERS_ONLY}));
    });
    mock_completion(
        &llm,
        r#"{"fixed_data": {"name": "Test"}, "explanation": "Maybe remove the digits", "confidence": 0.3, "suggestions": []}"#,
    );

    let outcome = agent(&target, reasoning(&llm))
        .handle_user_operation("create category name Test123", &admin())
        .await;

    rejected.assert_hits(1);
    assert_eq!(outcome.stage, PipelineStage::FailedFinal);
    assert_eq!(outcome.fix.as_ref().unwrap().confidence, 0.3);
    let plan = outcome.retry_plan.expect("retry plan for an unapplied fix");
    assert_eq!(plan.retry_data["name"], "Test");
    assert!(outcome.message.contains("Maybe remove the digits"));
    assert!(outcome.message.contains("Low (30.0%)"));
}

#[tokio::test]
async fn test_failed_retry_is_final() {
    let target = MockServer::start();
    let llm = MockServer::start();

    let rejected = target.mock(|when, then| {
        when.method(POST).path("/api/categories");
        then.status(400).json_body(json!({"message": LETTERS_ONLY}));
    });
    let completion = mock_completion(
        &llm,
        r#"{"fixed_data": {"name": "Test"}, "explanation": "Removed digits", "confidence": 0.8, "suggestions": []}"#,
    );

    let outcome = agent(&target, reasoning(&llm))
        .handle_user_operation("create category name Test123", &admin())
        .await;

    // Original attempt plus exactly one retry
    rejected.assert_hits(2);
    completion.assert_hits(1);
    assert_eq!(outcome.stage, PipelineStage::FailedFinal);
    assert_eq!(outcome.attempts.len(), 2);
}

#[tokio::test]
async fn test_successful_retrieve() {
    let target = MockServer::start();
    let llm = MockServer::start();

    let listing = target.mock(|when, then| {
        when.method(GET).path("/api/categories").query_param("isActive", "true");
        then.status(200).json_body(json!([{"id": "c-1", "name": "Books"}]));
    });

    let outcome = agent(&target, reasoning(&llm))
        .handle_user_operation("show active categories", &StaticCredentials::anonymous())
        .await;

    listing.assert_hits(1);
    assert!(outcome.success);
    assert_eq!(outcome.stage, PipelineStage::Success);
    assert_eq!(outcome.data.unwrap()[0]["name"], "Books");
    let intent = outcome.intent.unwrap();
    assert!(intent.confidence >= 0.8);
}

#[tokio::test]
async fn test_catalog_operation_used() {
    let target = MockServer::start();
    let llm = MockServer::start();

    let catalog = StaticCatalog::new(vec![EndpointCandidate {
        method: HttpMethod::Put,
        path_template: "/api/products/{id}".to_string(),
        summary: Some("Update a product".to_string()),
        required_params: vec!["price".to_string()],
        optional_params: vec![],
        schema: None,
        auth_required: true,
    }]);

    let update = target.mock(|when, then| {
        when.method(PUT)
            .path("/api/products/42")
            .json_body(json!({"price": 10}));
        then.status(200).json_body(json!({"id": "42", "price": 10}));
    });

    let outcome = agent_with_catalog(&target, reasoning(&llm), catalog)
        .handle_user_operation("update product 42 price=10", &admin())
        .await;

    update.assert_hits(1);
    assert!(outcome.success, "{}", outcome.message);
}

#[tokio::test]
async fn test_unreachable_target_is_network_error() {
    let llm = MockServer::start();
    let completion = mock_completion(&llm, "{}");

    let executor = RequestExecutor::with_timeout("http://127.0.0.1:9", 2).unwrap();
    let agent = OperationAgent::from_parts(
        Arc::new(StaticCatalog::default()),
        reasoning(&llm),
        Arc::new(FixCache::new()),
        executor,
        &AgentConfig::default(),
    );

    let outcome = agent
        .handle_user_operation("show categories", &StaticCredentials::anonymous())
        .await;

    completion.assert_hits(0);
    assert_eq!(outcome.category, Some(ErrorCategory::Network));
    assert_eq!(outcome.attempts[0].status, 0);
    assert!(outcome.message.contains(fallback_explanation(ErrorCategory::Network)));
}

#[tokio::test]
async fn test_target_timeout_is_network_error_without_retry() {
    let target = MockServer::start();
    let llm = MockServer::start();
    target.mock(|when, then| {
        when.method(POST).path("/api/categories");
        then.status(201)
            .json_body(json!({"id": "c-1"}))
            .delay(Duration::from_secs(3));
    });
    let completion = mock_completion(&llm, "{}");

    let executor = RequestExecutor::with_timeout(&target.base_url(), 1).unwrap();
    let agent = OperationAgent::from_parts(
        Arc::new(StaticCatalog::default()),
        reasoning(&llm),
        Arc::new(FixCache::new()),
        executor,
        &AgentConfig::default(),
    );

    let outcome = agent
        .handle_user_operation("create category name Books", &admin())
        .await;

    completion.assert_hits(0);
    assert_eq!(outcome.stage, PipelineStage::FailedFinal);
    assert_eq!(outcome.category, Some(ErrorCategory::Network));
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(outcome.attempts[0].status, 0);
    assert!(outcome.fix.is_none());
}

#[tokio::test]
async fn test_path_escaping_id_is_rejected() {
    let target = MockServer::start();
    let llm = MockServer::start();
    let any_target = target.mock(|when, then| {
        when.path_contains("/");
        then.status(204);
    });

    let outcome = agent(&target, reasoning(&llm))
        .handle_user_operation("delete category id=../../admin/users", &admin())
        .await;

    any_target.assert_hits(0);
    assert_eq!(outcome.stage, PipelineStage::NeedsInput);
    assert_eq!(outcome.missing_fields, Some(vec!["id".to_string()]));
    assert!(outcome.attempts.is_empty());
}

#[tokio::test]
async fn test_unresolved_query() {
    let target = MockServer::start();
    let llm = MockServer::start();

    let outcome = agent(&target, reasoning(&llm))
        .handle_user_operation("what is the weather like", &admin())
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.stage, PipelineStage::Unresolved);
    assert!(!outcome.message.is_empty());
}

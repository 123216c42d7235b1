//! Request executor
//!
//! Performs exactly one HTTP call per `execute`. Retries are decided elsewhere.

use crate::config::Settings;
use crate::models::catalog::HttpMethod;
use crate::models::request::{ExecutionResult, RequestSpec};
use crate::utils::logging::{create_request_log_summary, summarize_value};
use anyhow::{Context, Result};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP executor bound to the target API
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl RequestExecutor {
    /// Create an executor for the configured target API
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_timeout(settings.target_base_url(), settings.target_api.timeout)
    }

    /// Create an executor with an explicit base URL and timeout
    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("aiapiagent/0.1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    fn build_url(&self, spec: &RequestSpec) -> String {
        format!("{}{}", self.base_url, spec.path)
    }

    /// Execute a request spec
    ///
    /// Transport failures (DNS, refused connection, timeout) come back as a
    /// `Failure` with status 0.
    pub async fn execute(&self, spec: &RequestSpec) -> ExecutionResult {
        debug!("📤 Executing request: {}", create_request_log_summary(spec));

        let mut request = self
            .client
            .request(to_reqwest_method(spec.method), self.build_url(spec));

        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(token) = &spec.bearer_token {
            request = request.bearer_auth(token.expose());
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return self.transport_failure(spec, &e),
        };

        let status = response.status();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return self.transport_failure(spec, &e),
        };
        let body = parse_body(&text);

        if status.is_success() {
            info!("✅ {} -> {}", spec.label(), status.as_u16());
            ExecutionResult::Success {
                status: status.as_u16(),
                body,
                headers,
            }
        } else {
            warn!("❌ {} -> {}: {}", spec.label(), status.as_u16(), summarize_value(&body));
            ExecutionResult::Failure {
                status: status.as_u16(),
                body,
                headers,
                request: spec.clone(),
            }
        }
    }

    fn transport_failure(&self, spec: &RequestSpec, e: &reqwest::Error) -> ExecutionResult {
        let message = if e.is_timeout() {
            format!("Request timed out after {}s", self.timeout_secs)
        } else if e.is_connect() {
            format!("Could not connect to the target API: {}", e)
        } else {
            format!("Transport error: {}", e)
        };

        warn!("❌ {} failed without a response: {}", spec.label(), message);

        ExecutionResult::Failure {
            status: 0,
            body: json!({ "error": message }),
            headers: BTreeMap::new(),
            request: spec.clone(),
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// JSON when the body parses, the raw text otherwise, null when empty
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

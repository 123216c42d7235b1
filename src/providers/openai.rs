//! OpenAI reasoning service
//!
//! Standard OpenAI-compatible `/chat/completions` client

use super::ReasoningService;
use crate::config::ReasoningConfig;
use crate::models::openai::*;
use crate::utils::logging::truncate_content;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

/// OpenAI-compatible reasoning service
pub struct OpenAIReasoningService {
    client: Client,
    config: ReasoningConfig,
}

impl OpenAIReasoningService {
    /// Create a new service from configuration
    pub fn new(config: ReasoningConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent("aiapiagent/0.1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Build the request URL
    fn build_url(&self) -> String {
        let base_url = self.config.base_url.trim_end_matches('/');
        format!("{}/chat/completions", base_url)
    }

    fn build_request(&self, system_prompt: &str, user_prompt: &str) -> OpenAIRequest {
        OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![OpenAIMessage::system(system_prompt), OpenAIMessage::user(user_prompt)],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            response_format: self.config.json_mode.then(|| OpenAIResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ReasoningService for OpenAIReasoningService {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        debug!("Sending reasoning request to model {}", self.config.model);

        let request = self.build_request(system_prompt, user_prompt);

        let response = self
            .client
            .post(self.build_url())
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();

        if status.is_success() {
            let openai_response: OpenAIResponse = response
                .json()
                .await
                .context("Failed to parse OpenAI response")?;

            let content = openai_response
                .first_content()
                .context("OpenAI response contained no message content")?;

            debug!("Reasoning response: {}", truncate_content(content, 200));
            Ok(content.to_string())
        } else {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                error!("OpenAI API error: {:?}", error_response.error);
                anyhow::bail!("OpenAI API error: {}", error_response.error.message);
            } else {
                error!("OpenAI API request failed: {} - {}", status, error_text);
                anyhow::bail!("OpenAI API request failed: {} - {}", status, error_text);
            }
        }
    }
}

//! Provider module
//!
//! Defines the reasoning service trait and its implementations

pub mod openai;

use anyhow::Result;
use async_trait::async_trait;

/// Reasoning service used to plan fixes for failed calls
///
/// Implementations return the raw completion text. Callers treat it as
/// untrusted and validate it before use.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Get the model name
    fn model(&self) -> &str;

    /// Send one completion request
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

pub use openai::OpenAIReasoningService;

//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Target REST API configuration
    pub target_api: TargetApiConfig,
    /// Reasoning service configuration
    pub reasoning: ReasoningConfig,
    /// Pipeline policy configuration
    pub agent: AgentConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// Target REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetApiConfig {
    /// API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Reasoning service (OpenAI-compatible) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// API key
    #[serde(skip_serializing)]
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens in a fix answer
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Ask for `response_format: json_object` (models that support it)
    pub json_mode: bool,
}

/// Pipeline policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Fixes below this confidence are surfaced but not applied
    pub fix_confidence_threshold: f64,
    /// Intents below this confidence are not executed
    pub min_intent_confidence: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            fix_confidence_threshold: 0.5,
            min_intent_confidence: 0.5,
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Key required for operator routes (fix cache reset); open when unset
    #[serde(skip_serializing)]
    pub operator_api_key: Option<String>,
    /// Header carrying the operator key
    pub operator_key_header: String,
    /// Whether CORS is enabled
    pub cors_enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            server: ServerConfig {
                host: get_env_or_default("SERVER_HOST", "0.0.0.0"),
                port: get_env_or_default("SERVER_PORT", "8082")
                    .parse()
                    .context("Invalid port number")?,
            },
            target_api: TargetApiConfig {
                base_url: std::env::var("TARGET_API_BASE_URL")
                    .context("TARGET_API_BASE_URL environment variable not set")?,
                timeout: get_env_or_default("TARGET_API_TIMEOUT", "30")
                    .parse()
                    .context("Invalid target API timeout")?,
            },
            reasoning: ReasoningConfig {
                api_key: std::env::var("OPENAI_API_KEY")
                    .context("OPENAI_API_KEY environment variable not set")?,
                base_url: get_env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                model: get_env_or_default("OPENAI_MODEL", "gpt-4"),
                temperature: get_env_or_default("OPENAI_TEMPERATURE", "0.1")
                    .parse()
                    .context("Invalid temperature value")?,
                max_tokens: get_env_or_default("OPENAI_MAX_TOKENS", "500")
                    .parse()
                    .context("Invalid max tokens value")?,
                timeout: get_env_or_default("REASONING_TIMEOUT", "30")
                    .parse()
                    .context("Invalid reasoning timeout")?,
                json_mode: get_env_or_default("OPENAI_JSON_MODE", "false")
                    .parse()
                    .context("Invalid JSON mode flag")?,
            },
            agent: AgentConfig {
                fix_confidence_threshold: get_env_or_default("FIX_CONFIDENCE_THRESHOLD", "0.5")
                    .parse()
                    .context("Invalid fix confidence threshold")?,
                min_intent_confidence: get_env_or_default("MIN_INTENT_CONFIDENCE", "0.5")
                    .parse()
                    .context("Invalid minimum intent confidence")?,
            },
            security: SecurityConfig {
                operator_api_key: std::env::var("OPERATOR_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                operator_key_header: get_env_or_default("OPERATOR_KEY_HEADER", "X-Operator-Key"),
                cors_enabled: get_env_or_default("CORS_ENABLED", "true")
                    .parse()
                    .context("Invalid CORS enabled flag")?,
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        // Validate port range
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        if self.reasoning.api_key.is_empty() {
            anyhow::bail!("OpenAI API key cannot be empty");
        }

        if self.reasoning.api_key.contains(char::is_whitespace) {
            anyhow::bail!("OpenAI API key cannot contain whitespace characters");
        }

        // Validate URL format
        if !self.reasoning.base_url.starts_with("http") {
            anyhow::bail!("Invalid OpenAI base URL format, should start with 'http'");
        }

        if !self.target_api.base_url.starts_with("http") {
            anyhow::bail!("Invalid target API base URL format, should start with 'http'");
        }

        // Validate timeout values
        if self.target_api.timeout == 0 || self.reasoning.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        if self.reasoning.max_tokens == 0 {
            anyhow::bail!("Max tokens cannot be 0");
        }

        if !(0.0..=2.0).contains(&self.reasoning.temperature) {
            anyhow::bail!("Temperature must be between 0.0 and 2.0");
        }

        // Thresholds are compared against confidences in [0, 1]
        if !(0.0..=1.0).contains(&self.agent.fix_confidence_threshold) {
            anyhow::bail!("Fix confidence threshold must be between 0.0 and 1.0");
        }

        if !(0.0..=1.0).contains(&self.agent.min_intent_confidence) {
            anyhow::bail!("Minimum intent confidence must be between 0.0 and 1.0");
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        // Validate log format
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Target API base URL without a trailing slash
    pub fn target_base_url(&self) -> &str {
        self.target_api.base_url.trim_end_matches('/')
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_settings() -> Settings {
        Settings {
            server: ServerConfig {
                host: "localhost".to_string(),
                port: 8080,
            },
            target_api: TargetApiConfig {
                base_url: "https://api.example.com/".to_string(),
                timeout: 30,
            },
            reasoning: ReasoningConfig {
                api_key: "sk-test".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4".to_string(),
                temperature: 0.1,
                max_tokens: 500,
                timeout: 30,
                json_mode: false,
            },
            agent: AgentConfig::default(),
            security: SecurityConfig {
                operator_api_key: None,
                operator_key_header: "X-Operator-Key".to_string(),
                cors_enabled: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_settings() {
        let settings = sample_settings();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.target_base_url(), "https://api.example.com");
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut settings = sample_settings();
        settings.agent.fix_confidence_threshold = 1.5;
        assert!(settings.validate().is_err());

        let mut settings = sample_settings();
        settings.agent.min_intent_confidence = -0.1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut settings = sample_settings();
        settings.security.operator_api_key = Some("operator-secret".to_string());
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("sk-test"));
        assert!(!json.contains("operator-secret"));
    }
}

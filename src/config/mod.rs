//! Configuration management module
//!
//! Responsible for loading and managing application configuration, including environment variables and the endpoint catalog file.

pub mod file;
pub mod settings;

pub use file::CatalogFile;
pub use settings::{
    AgentConfig, LoggingConfig, ReasoningConfig, SecurityConfig, ServerConfig, Settings, TargetApiConfig,
};

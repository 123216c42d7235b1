//! AI API Agent Library
//!
//! Turns natural-language requests into calls against a REST API and recovers
//! from validation failures with AI-planned fixes

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{CatalogFile, Settings};
pub use handlers::{create_router, AppState};
pub use models::operation::{OperationOutcome, OperationRequest, PipelineStage};
pub use providers::{OpenAIReasoningService, ReasoningService};
pub use services::{
    CredentialProvider, EndpointCatalog, OperationAgent, StaticCatalog, StaticCredentials,
};
pub use utils::error::{AppError, AppResult, BuildError};
pub use utils::fix_cache::FixCache;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}

//! Service layer module
//!
//! Contains the resolve, build, execute, classify, plan and retry pipeline

pub mod agent;
pub mod builder;
pub mod catalog;
pub mod classifier;
pub mod credentials;
pub mod executor;
pub mod planner;
pub mod resolver;
pub mod retry;

pub use agent::OperationAgent;
pub use builder::RequestBuilder;
pub use catalog::{EndpointCatalog, StaticCatalog};
pub use credentials::{CredentialProvider, StaticCredentials};
pub use executor::RequestExecutor;
pub use planner::{FixCacheStats, FixPlanner};
pub use resolver::IntentResolver;
pub use retry::{NotRetriedReason, RetryController, RetryOutcome};

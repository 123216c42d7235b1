//! AI API Agent Server
//!
//! HTTP service that resolves natural-language operations into REST calls and
//! retries validation failures once with an AI-planned fix

use aiapiagent::{
    create_router, version_info, CatalogFile, EndpointCatalog, FixCache, OpenAIReasoningService,
    OperationAgent, ReasoningService, Settings, StaticCatalog,
};
use aiapiagent::services::resolver::VOCABULARY_VERSION;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load settings from environment (.env supported)
    let settings = Settings::new().context("Failed to load server settings")?;

    // Initialize logging
    init_logging(&settings.logging.level, &settings.logging.format)?;
    info!("{}", version_info());

    // Load endpoint catalog
    let catalog_file = CatalogFile::load_default().context("Failed to load endpoint catalog")?;
    let catalog: Arc<dyn EndpointCatalog> = Arc::new(StaticCatalog::from_file(catalog_file));
    if catalog.endpoint_count() == 0 {
        warn!("Endpoint catalog is empty, operations use REST conventions only");
    } else {
        info!("📁 Endpoint catalog loaded ({} endpoints)", catalog.endpoint_count());
    }

    let reasoning: Arc<dyn ReasoningService> = Arc::new(
        OpenAIReasoningService::new(settings.reasoning.clone()).context("Failed to create reasoning service")?,
    );
    let cache = Arc::new(FixCache::new());

    let agent = Arc::new(OperationAgent::new(&settings, catalog, reasoning, cache)?);
    info!("🧭 Intent vocabulary v{}", VOCABULARY_VERSION);

    // Create router
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let target = settings.target_base_url().to_string();
    let app = create_router(settings, agent);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 AI API Agent server started!");
    info!("🎯 Target API: {}", target);
    info!("📝 Health check: http://{}/health", addr);
    info!("🔄 Operation endpoint: http://{}/v1/operations", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    Ok(())
}

/// Initialize logging system
fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if log_format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(log_level)
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(log_level)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    info!("Logging system initialized");
    Ok(())
}

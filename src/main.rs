//! Rizzard AI Server
//!
//! HTTP microservice that streams Claude chat completions as server-sent events

use anyhow::{Context, Result};
use rizzard_ai::utils::logging::init_logging;
use rizzard_ai::{create_router, version_info, EnvSecretProvider, SecretProvider, Settings};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Settings also load the optional .env file
    let settings = Settings::new().context("Failed to load server settings")?;

    init_logging(&settings.logging)?;
    info!("{}", version_info());
    if settings.debug {
        info!("Debug mode enabled, effective settings: {:?}", settings);
    }

    let secrets: Arc<dyn SecretProvider> = Arc::new(EnvSecretProvider::from_default_env());
    if secrets.get_credential().is_none() {
        warn!("CLAUDE_API is not set, chat requests will fail until it is configured");
    }

    let app = create_router(settings.clone(), secrets).context("Failed to create router")?;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 {} started!", settings.app_name);
    info!("📝 Health check: http://{}/health", addr);
    info!("💬 Chat endpoint: http://{}/chat", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

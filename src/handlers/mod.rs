//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod chat;
pub mod features;
pub mod health;

use crate::config::{SecretProvider, Settings};
use crate::middleware::logging::request_logging_middleware;
use crate::providers::{AnthropicProvider, Provider};
use crate::services::StreamRelay;
use anyhow::Result;
use axum::{
    extract::State,
    http::HeaderValue,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub relay: StreamRelay,
    pub secrets: Arc<dyn SecretProvider>,
}

/// Create application router
pub fn create_router(settings: Settings, secrets: Arc<dyn SecretProvider>) -> Result<Router> {
    let provider: Arc<dyn Provider> = Arc::new(AnthropicProvider::new(&settings.anthropic)?);
    let relay = StreamRelay::from_settings(&settings, provider, secrets.clone());

    info!(
        "Chat relay configured with model {} (max_tokens {})",
        relay.model(),
        relay.max_tokens()
    );

    let app_state = Arc::new(AppState {
        settings: settings.clone(),
        relay,
        secrets,
    });

    // Create middleware stack
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&settings))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(RequestBodyLimitLayer::new(settings.request.max_request_size));

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/chat", post(chat::handle_chat))
        .route("/chat/", post(chat::handle_chat))
        .route("/embed", post(features::generate_embeddings))
        .route("/embed/", post(features::generate_embeddings))
        .route("/score", post(features::score_profiles))
        .route("/score/", post(features::score_profiles))
        .route("/email", post(features::generate_email))
        .route("/email/", post(features::generate_email))
        .route("/project", post(features::generate_projects))
        .route("/project/", post(features::generate_projects))
        .route("/process-profile", post(features::process_profile))
        .route("/process-profile/", post(features::process_profile))
        .with_state(app_state)
        .layer(middleware_stack);

    Ok(router)
}

/// Build the CORS layer from the security settings
fn cors_layer(settings: &Settings) -> CorsLayer {
    let security = &settings.security;
    if !security.cors_enabled {
        return CorsLayer::new();
    }

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if security.allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

/// GET /
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} is running", state.settings.app_name),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

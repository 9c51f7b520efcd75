//! Chat handler
//!
//! Streams Claude completions to the caller as server-sent events

use crate::handlers::AppState;
use crate::models::chat::ChatRequest;
use crate::services::RelayEvent;
use crate::utils::error::AppResult;
use crate::utils::logging::create_chat_request_log_summary;
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::sse::{Event, KeepAlive},
    response::{IntoResponse, Response, Sse},
    Json,
};
use futures::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Interval between idle keep-alive comments
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Handle chat requests
///
/// POST /chat
///
/// Configuration and validation failures are returned as JSON errors before
/// the stream starts. Once streaming, failures arrive as an in-band `error` event.
pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Response> {
    let log_summary = create_chat_request_log_summary(&request);
    if let Ok(summary_json) = serde_json::to_string_pretty(&log_summary) {
        debug!("📥 Chat request:\n{}", summary_json);
    }

    let events = state.relay.relay(request.messages)?;

    let stream = events.map(|event: RelayEvent| Ok::<_, Infallible>(Event::default().data(event.to_sse_data())));

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    );

    let mut response = sse.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

    debug!("Starting streaming response transmission");
    Ok(response)
}

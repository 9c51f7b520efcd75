//! Chat stream relay
//!
//! Opens a streaming session with the upstream provider and re-emits its text
//! deltas and completion signal as [`RelayEvent`]s.
//!
//! Contract:
//! - a missing credential or an empty history fails before any upstream call;
//! - once the stream is returned, the caller receives zero or more `Delta`
//!   events followed by exactly one terminal `Done` or `Error`;
//! - the upstream session is dropped as soon as a terminal event is produced,
//!   or when the caller drops the relay stream.

use crate::config::secret::CREDENTIAL_ENV_VAR;
use crate::config::{Credential, SecretProvider, Settings};
use crate::models::anthropic::{ContentDelta, MessagesRequest, UpstreamEvent};
use crate::models::chat::ChatMessage;
use crate::providers::{BoxStream, Provider};
use crate::utils::error::helpers::{configuration_error, validation_error};
use crate::utils::error::AppResult;
use futures::StreamExt;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::{debug, error, info};

/// Message used when the upstream stream ends without a completion signal
pub const TRUNCATED_STREAM_MESSAGE: &str = "Upstream stream ended before message completion";

/// Event emitted to the chat client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// Incremental text fragment
    Delta(String),
    /// Generation finished successfully
    Done,
    /// Generation failed
    Error(String),
}

impl RelayEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RelayEvent::Done | RelayEvent::Error(_))
    }

    /// Payload of the `data:` line for this event
    pub fn to_sse_data(&self) -> String {
        match self {
            RelayEvent::Delta(text) => serde_json::json!({
                "type": "content_block_delta",
                "delta": {
                    "type": "text_delta",
                    "text": text,
                },
            })
            .to_string(),
            RelayEvent::Done => "[DONE]".to_string(),
            RelayEvent::Error(message) => serde_json::json!({
                "type": "error",
                "error": message,
            })
            .to_string(),
        }
    }

    fn from_failure(err: &anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        if message.trim().is_empty() {
            RelayEvent::Error("Upstream stream failed".to_string())
        } else {
            RelayEvent::Error(message)
        }
    }
}

/// Map an upstream event to the event forwarded to the client, if any
pub fn translate_event(event: UpstreamEvent) -> Option<RelayEvent> {
    match event {
        UpstreamEvent::ContentBlockDelta { delta, .. } => match delta {
            ContentDelta::TextDelta { text } => Some(RelayEvent::Delta(text)),
            ContentDelta::InputJsonDelta { .. } | ContentDelta::Other => None,
        },
        UpstreamEvent::MessageStop => Some(RelayEvent::Done),
        UpstreamEvent::Error { error } => {
            Some(RelayEvent::Error(format!("{}: {}", error.error_type, error.message)))
        }
        UpstreamEvent::MessageStart { .. }
        | UpstreamEvent::ContentBlockStart { .. }
        | UpstreamEvent::ContentBlockStop { .. }
        | UpstreamEvent::MessageDelta { .. }
        | UpstreamEvent::Ping
        | UpstreamEvent::Unknown => None,
    }
}

/// Lazily evaluated stream of relay events
pub type RelayStream = Pin<Box<dyn Stream<Item = RelayEvent> + Send>>;

/// Relays chat completions from the upstream provider
#[derive(Clone)]
pub struct StreamRelay {
    provider: Arc<dyn Provider>,
    secrets: Arc<dyn SecretProvider>,
    model: String,
    max_tokens: u32,
}

impl StreamRelay {
    pub fn new(
        provider: Arc<dyn Provider>,
        secrets: Arc<dyn SecretProvider>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            secrets,
            model: model.into(),
            max_tokens,
        }
    }

    /// Relay using the model and token budget from the settings
    pub fn from_settings(
        settings: &Settings,
        provider: Arc<dyn Provider>,
        secrets: Arc<dyn SecretProvider>,
    ) -> Self {
        Self::new(provider, secrets, &settings.anthropic.model, settings.anthropic.max_tokens)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Start relaying a conversation
    ///
    /// Nothing is sent upstream until the returned stream is first polled.
    pub fn relay(&self, history: Vec<ChatMessage>) -> AppResult<RelayStream> {
        let credential = self.secrets.get_credential().ok_or_else(|| {
            error!("Claude API key is not configured");
            configuration_error(format!(
                "Claude API key is not configured. Please set {} environment variable.",
                CREDENTIAL_ENV_VAR
            ))
        })?;

        if history.is_empty() {
            return Err(validation_error("Conversation history cannot be empty"));
        }

        let request = MessagesRequest::from_history(&self.model, self.max_tokens, &history);
        info!("Starting chat stream with {} messages", history.len());

        let state = RelayState::Opening {
            provider: self.provider.clone(),
            request,
            credential,
        };

        Ok(Box::pin(futures::stream::unfold(state, advance)))
    }
}

enum RelayState {
    Opening {
        provider: Arc<dyn Provider>,
        request: MessagesRequest,
        credential: Credential,
    },
    Streaming {
        upstream: BoxStream<'static, UpstreamEvent>,
        deltas: usize,
    },
    Finished,
}

async fn advance(state: RelayState) -> Option<(RelayEvent, RelayState)> {
    let (mut upstream, mut deltas) = match state {
        RelayState::Finished => return None,
        RelayState::Streaming { upstream, deltas } => (upstream, deltas),
        RelayState::Opening {
            provider,
            request,
            credential,
        } => match provider.stream_messages(request, &credential).await {
            Ok(upstream) => {
                debug!("Upstream session opened with provider {}", provider.name());
                (upstream, 0)
            }
            Err(e) => {
                error!("Error opening chat stream: {:#}", e);
                return Some((RelayEvent::from_failure(&e), RelayState::Finished));
            }
        },
    };

    loop {
        match upstream.next().await {
            Some(Ok(event)) => {
                let Some(relay_event) = translate_event(event) else {
                    continue;
                };

                if !relay_event.is_terminal() {
                    deltas += 1;
                    return Some((relay_event, RelayState::Streaming { upstream, deltas }));
                }

                match &relay_event {
                    RelayEvent::Error(message) => error!("Upstream reported an error: {}", message),
                    _ => info!("Chat stream completed after {} deltas", deltas),
                }
                // terminal: `upstream` is dropped here, nothing more is read
                return Some((relay_event, RelayState::Finished));
            }
            Some(Err(e)) => {
                error!("Error in stream generation after {} deltas: {:#}", deltas, e);
                return Some((RelayEvent::from_failure(&e), RelayState::Finished));
            }
            None => {
                error!("Upstream stream ended without a completion signal");
                return Some((
                    RelayEvent::Error(TRUNCATED_STREAM_MESSAGE.to_string()),
                    RelayState::Finished,
                ));
            }
        }
    }
}

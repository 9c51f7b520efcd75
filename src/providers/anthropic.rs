//! Anthropic Provider implementation
//!
//! Talks to the Anthropic Messages API

use super::{BoxStream, Provider};
use crate::config::settings::AnthropicConfig;
use crate::config::Credential;
use crate::models::anthropic::*;
use crate::services::sse::{SseDecoder, SseFrame};
use crate::utils::logging::truncate_content;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use std::collections::VecDeque;
use std::time::Duration;
use tokio_stream::Stream;
use tracing::{debug, error};

/// Anthropic Provider
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    client: Client,
    stream_client: Client,
    base_url: String,
    api_version: String,
}

impl AnthropicProvider {
    /// Create a new provider from the Anthropic settings
    pub fn new(config: &AnthropicConfig) -> Result<Self> {
        let user_agent = format!("rizzard-ai/{}", env!("CARGO_PKG_VERSION"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(&user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        let stream_client = Client::builder()
            .timeout(Duration::from_secs(config.stream_timeout))
            .user_agent(&user_agent)
            .build()
            .context("Failed to create streaming HTTP client")?;

        Ok(Self {
            client,
            stream_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        })
    }

    /// Messages endpoint of the configured Anthropic API
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    /// Turn a non-success response into an error carrying the provider's message
    async fn error_from_response(response: Response) -> anyhow::Error {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();

        if let Ok(error_response) = serde_json::from_str::<AnthropicErrorResponse>(&error_text) {
            error!("Anthropic API error: {:?}", error_response.error);
            anyhow::anyhow!(
                "Anthropic API error ({}): {}",
                error_response.error.error_type,
                error_response.error.message
            )
        } else {
            error!("Anthropic API request failed: {} - {}", status, error_text);
            anyhow::anyhow!("Anthropic API request failed: {} - {}", status, error_text)
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn create_message(
        &self,
        mut request: MessagesRequest,
        credential: &Credential,
    ) -> Result<MessagesResponse> {
        debug!("Sending Anthropic message request");

        request.stream = None;

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", credential.expose())
            .header("anthropic-version", &self.api_version)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let message: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic response")?;

        debug!("Anthropic request completed successfully");
        Ok(message)
    }

    async fn stream_messages(
        &self,
        mut request: MessagesRequest,
        credential: &Credential,
    ) -> Result<BoxStream<'static, UpstreamEvent>> {
        debug!("Sending Anthropic streaming message request");

        request.stream = Some(true);

        let response = self
            .stream_client
            .post(self.messages_url())
            .header("x-api-key", credential.expose())
            .header("anthropic-version", &self.api_version)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&request)
            .send()
            .await
            .context("Failed to send streaming request")?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(decode_event_stream(response.bytes_stream()))
    }
}

struct DecodeState<S> {
    bytes: S,
    decoder: SseDecoder,
    pending: VecDeque<SseFrame>,
    exhausted: bool,
}

/// Decode a raw `text/event-stream` body into upstream events
///
/// A transport error, an overlong line or an unparseable frame is yielded once
/// and ends the stream.
pub fn decode_event_stream<S, B, E>(bytes: S) -> BoxStream<'static, UpstreamEvent>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let state = DecodeState {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        exhausted: false,
    };

    let frames = futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(frame) = state.pending.pop_front() {
                return Some((Ok(frame), state));
            }
            if state.exhausted {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => match state.decoder.push(chunk.as_ref()) {
                    Ok(frames) => state.pending.extend(frames),
                    Err(e) => {
                        state.exhausted = true;
                        return Some((Err(e.context("Malformed streaming response")), state));
                    }
                },
                Some(Err(e)) => {
                    state.exhausted = true;
                    let err = anyhow::Error::new(e).context("Failed to read streaming response chunk");
                    return Some((Err(err), state));
                }
                None => {
                    state.exhausted = true;
                    state.pending.extend(state.decoder.finish());
                }
            }
        }
    });

    let mut failed = false;
    let events = frames
        .filter_map(|item| {
            let event = match item {
                Ok(frame) => parse_frame(&frame).transpose(),
                Err(e) => Some(Err(e)),
            };
            futures::future::ready(event)
        })
        .take_while(move |item| {
            // yield the first error, then stop
            let keep = !failed;
            failed = failed || item.is_err();
            futures::future::ready(keep)
        });

    Box::pin(events)
}

/// Parse one SSE frame into an upstream event
fn parse_frame(frame: &SseFrame) -> Result<Option<UpstreamEvent>> {
    let data = frame.data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let event = serde_json::from_str::<UpstreamEvent>(data)
        .with_context(|| format!("Invalid streaming event: {}", truncate_content(data, 200)))?;

    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = std::result::Result<&'static [u8], io::Error>> + Send {
        futures::stream::iter(parts.iter().copied().map(|p| Ok(p.as_bytes())).collect::<Vec<_>>())
    }

    #[test]
    fn test_provider_creation() {
        let provider = AnthropicProvider::new(&crate::config::Settings::default().anthropic).unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_messages_url_trims_trailing_slash() {
        let mut config = crate::config::Settings::default().anthropic;
        config.base_url = "http://127.0.0.1:9000/".to_string();

        let provider = AnthropicProvider::new(&config).unwrap();
        assert_eq!(provider.messages_url(), "http://127.0.0.1:9000/v1/messages");
    }

    #[test]
    fn test_decode_event_stream() {
        let body = chunks(&[
            "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"model\":\"m\"}}\n\n",
            "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,",
            "\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\n\nevent: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
        ]);

        let events: Vec<_> = tokio_test::block_on(decode_event_stream(body).collect());
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Ok(UpstreamEvent::MessageStart { .. })));
        assert!(matches!(
            &events[1],
            Ok(UpstreamEvent::ContentBlockDelta { delta: ContentDelta::TextDelta { text }, .. }) if text == "Hi"
        ));
        assert!(matches!(events[2], Ok(UpstreamEvent::MessageStop)));
    }

    #[test]
    fn test_invalid_frame_ends_stream() {
        let body = chunks(&[
            "data: {\"type\":\"ping\"}\n\n",
            "data: {not json}\n\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        ]);

        let events: Vec<_> = tokio_test::block_on(decode_event_stream(body).collect());
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Ok(UpstreamEvent::Ping)));
        let err = events[1].as_ref().unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid streaming event"));
    }

    #[test]
    fn test_transport_error_ends_stream() {
        let body = futures::stream::iter(vec![
            Ok("data: {\"type\":\"ping\"}\n\n".as_bytes()),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
            Ok("data: {\"type\":\"message_stop\"}\n\n".as_bytes()),
        ]);

        let events: Vec<_> = tokio_test::block_on(decode_event_stream(body).collect());
        assert_eq!(events.len(), 2);
        assert!(format!("{:#}", events[1].as_ref().unwrap_err()).contains("connection reset"));
    }

    #[test]
    fn test_overlong_line_ends_stream() {
        let endless_line = "x".repeat(64 * 1024);
        let mut parts = vec![Ok(b"data: {\"type\":\"ping\"}\n\ndata: ".to_vec())];
        // one line, never terminated, well past the decoder limit
        parts.extend((0..20).map(|_| Ok::<_, io::Error>(endless_line.clone().into_bytes())));
        parts.push(Ok(b"\n\ndata: {\"type\":\"message_stop\"}\n\n".to_vec()));

        let events: Vec<_> = tokio_test::block_on(decode_event_stream(futures::stream::iter(parts)).collect());
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Ok(UpstreamEvent::Ping)));
        assert!(format!("{:#}", events[1].as_ref().unwrap_err()).contains("exceeds"));
    }
}

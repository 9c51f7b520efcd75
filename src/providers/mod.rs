//! Provider module
//!
//! Defines the Provider trait and the upstream provider implementations

pub mod anthropic;

use crate::config::Credential;
use crate::models::anthropic::{MessagesRequest, MessagesResponse, UpstreamEvent};
use anyhow::Result;
use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

/// A boxed stream of streaming responses
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Provider trait for upstream text-generation APIs
///
/// A streaming session is opened once and then yields events until the
/// provider finishes, fails, or the stream is dropped.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Send a message request (non-streaming)
    async fn create_message(
        &self,
        request: MessagesRequest,
        credential: &Credential,
    ) -> Result<MessagesResponse>;

    /// Open a streaming session
    async fn stream_messages(
        &self,
        request: MessagesRequest,
        credential: &Credential,
    ) -> Result<BoxStream<'static, UpstreamEvent>>;
}

pub use anthropic::AnthropicProvider;

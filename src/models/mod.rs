//! Data models module
//!
//! Defines the service's own request/response structures and the upstream
//! Anthropic Messages API structures

pub mod anthropic;
pub mod chat;
pub mod schemas;

pub use chat::{ChatMessage, ChatRequest, ChatRole};

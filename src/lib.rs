//! Rizzard AI Library
//!
//! Streams Claude chat completions to the Rizzard frontend and exposes the
//! contracts of the planned AI feature endpoints

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{EnvSecretProvider, SecretProvider, Settings};
pub use handlers::{create_router, AppState};
pub use models::{ChatMessage, ChatRequest, ChatRole};
pub use providers::{AnthropicProvider, Provider};
pub use services::{RelayEvent, StreamRelay};
pub use utils::error::{AppError, AppResult};

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

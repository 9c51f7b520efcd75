//! Claude connection check
//!
//! Sends one small non-streaming request with the configured credential and
//! prints the reply. Exits with an error when the credential is missing or the
//! call fails.

use anyhow::{Context, Result};
use rizzard_ai::config::secret::CREDENTIAL_ENV_VAR;
use rizzard_ai::models::anthropic::MessagesRequest;
use rizzard_ai::utils::logging::init_logging;
use rizzard_ai::{AnthropicProvider, ChatMessage, EnvSecretProvider, Provider, SecretProvider, Settings};
use tracing::{error, info};

const CHECK_PROMPT: &str = "Say 'Hello, this is a test!' and nothing else.";
const CHECK_MAX_TOKENS: u32 = 100;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new().context("Failed to load settings")?;
    init_logging(&settings.logging)?;

    let secrets = EnvSecretProvider::from_default_env();
    let credential = secrets
        .get_credential()
        .with_context(|| format!("{} is not set in the environment or .env file", CREDENTIAL_ENV_VAR))?;

    info!("API key found: {}", credential.prefix());

    let provider = AnthropicProvider::new(&settings.anthropic)?;
    let request = MessagesRequest::from_history(
        &settings.anthropic.model,
        CHECK_MAX_TOKENS,
        &[ChatMessage::user(CHECK_PROMPT)],
    );

    info!("Sending test request to {} ({})", provider.messages_url(), settings.anthropic.model);
    let response = provider.create_message(request, &credential).await.map_err(|e| {
        error!("Claude API connection failed: {:#}", e);
        e
    })?;

    info!("Claude API connection successful");
    println!("{}", response.text());

    Ok(())
}

//! Configuration management module
//!
//! Responsible for loading application settings from environment variables and the
//! optional `.env` file, and for serving the upstream credential.

pub mod secret;
pub mod settings;

pub use secret::{Credential, EnvSecretProvider, SecretProvider, StaticSecretProvider};
pub use settings::Settings;

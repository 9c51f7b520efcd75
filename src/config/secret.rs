//! Upstream credential loading
//!
//! The Anthropic API key is read once per provider from the process
//! environment and cached for its lifetime.

use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Environment variable holding the Anthropic API key
pub const CREDENTIAL_ENV_VAR: &str = "CLAUDE_API";

/// Number of leading characters that may appear in logs
pub const LOGGED_PREFIX_LEN: usize = 10;

/// Opaque API credential
///
/// `Debug` and `Display` never print the full secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Arc<str>);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::from(secret.into()))
    }

    /// Full secret, only for building upstream request headers
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Bounded prefix safe for diagnostics
    pub fn prefix(&self) -> String {
        let prefix: String = self.0.chars().take(LOGGED_PREFIX_LEN).collect();
        format!("{}...", prefix)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.prefix()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

/// Source of the upstream credential
pub trait SecretProvider: Send + Sync {
    /// Returns the credential, or `None` when it is not configured
    fn get_credential(&self) -> Option<Credential>;
}

/// Reads the credential from an environment variable on first use
#[derive(Debug)]
pub struct EnvSecretProvider {
    var: String,
    cached: OnceCell<Option<Credential>>,
}

impl EnvSecretProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            cached: OnceCell::new(),
        }
    }

    /// Provider for the default `CLAUDE_API` variable
    pub fn from_default_env() -> Self {
        Self::new(CREDENTIAL_ENV_VAR)
    }

    fn load(&self) -> Option<Credential> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => {
                let credential = Credential::new(value.trim());
                info!("Claude API key loaded: {}", credential.prefix());
                Some(credential)
            }
            _ => {
                warn!("{} not found in environment, chat is unavailable", self.var);
                None
            }
        }
    }
}

impl SecretProvider for EnvSecretProvider {
    fn get_credential(&self) -> Option<Credential> {
        self.cached.get_or_init(|| self.load()).clone()
    }
}

/// Fixed credential, used when the key is supplied programmatically
#[derive(Debug, Clone, Default)]
pub struct StaticSecretProvider {
    credential: Option<Credential>,
}

impl StaticSecretProvider {
    pub fn new(credential: Option<Credential>) -> Self {
        Self { credential }
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self::new(Some(Credential::new(secret)))
    }

    pub fn missing() -> Self {
        Self::new(None)
    }
}

impl SecretProvider for StaticSecretProvider {
    fn get_credential(&self) -> Option<Credential> {
        self.credential.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_is_redacted() {
        let credential = Credential::new("sk-ant-REDACTED");
        assert_eq!(credential.prefix(), "sk-ant-api...");
        assert!(!format!("{:?}", credential).contains("very-secret"));
        assert!(!credential.to_string().contains("very-secret"));
        assert_eq!(credential.expose(), "sk-ant-REDACTED");
    }

    #[test]
    fn test_short_credential_prefix() {
        assert_eq!(Credential::new("abc").prefix(), "abc...");
    }

    #[test]
    fn test_env_provider_caches_first_load() {
        let var = "RIZZARD_TEST_SECRET_CACHE";
        std::env::set_var(var, "sk-first-value");
        let provider = EnvSecretProvider::new(var);

        assert_eq!(provider.get_credential().unwrap().expose(), "sk-first-value");

        std::env::set_var(var, "sk-second-value");
        assert_eq!(provider.get_credential().unwrap().expose(), "sk-first-value");

        std::env::remove_var(var);
    }

    #[test]
    fn test_env_provider_missing_and_blank() {
        let var = "RIZZARD_TEST_SECRET_BLANK";
        std::env::set_var(var, "   ");
        assert!(EnvSecretProvider::new(var).get_credential().is_none());

        std::env::remove_var(var);
        assert!(EnvSecretProvider::new(var).get_credential().is_none());
    }

    #[test]
    fn test_concurrent_first_access_converges() {
        let var = "RIZZARD_TEST_SECRET_CONCURRENT";
        std::env::set_var(var, "sk-shared");
        let provider = Arc::new(EnvSecretProvider::new(var));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                std::thread::spawn(move || provider.get_credential())
            })
            .collect();

        for handle in handles {
            let credential = handle.join().unwrap();
            assert_eq!(credential.unwrap().expose(), "sk-shared");
        }

        std::env::remove_var(var);
    }
}

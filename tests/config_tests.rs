//! Configuration module unit tests

use rizzard_ai::config::secret::CREDENTIAL_ENV_VAR;
use rizzard_ai::config::{EnvSecretProvider, SecretProvider, Settings, StaticSecretProvider};
use std::env;
use std::sync::{Arc, Mutex, MutexGuard};

/// Settings are read from process-wide environment variables
static ENV_LOCK: Mutex<()> = Mutex::new(());

const SETTINGS_VARS: &[&str] = &[
    "APP_NAME",
    "DEBUG",
    "SERVER_HOST",
    "SERVER_PORT",
    "ANTHROPIC_BASE_URL",
    "ANTHROPIC_VERSION",
    "CLAUDE_MODEL",
    "CLAUDE_MAX_TOKENS",
    "REQUEST_TIMEOUT",
    "STREAM_TIMEOUT",
    "MAX_REQUEST_SIZE",
    "ALLOWED_ORIGINS",
    "CORS_ENABLED",
    "RUST_LOG",
    "LOG_FORMAT",
];

fn lock_env() -> MutexGuard<'static, ()> {
    let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    cleanup_test_env();
    guard
}

/// Setup test environment variables
fn setup_test_env() {
    env::set_var("APP_NAME", "Rizzard Test");
    env::set_var("SERVER_HOST", "127.0.0.1");
    env::set_var("SERVER_PORT", "8080");
    env::set_var("ANTHROPIC_BASE_URL", "http://localhost:9999");
    env::set_var("CLAUDE_MODEL", "claude-3-5-sonnet-latest");
    env::set_var("CLAUDE_MAX_TOKENS", "1024");
    env::set_var("REQUEST_TIMEOUT", "10");
    env::set_var("STREAM_TIMEOUT", "120");
    env::set_var("MAX_REQUEST_SIZE", "2048");
    env::set_var("RUST_LOG", "debug");
    env::set_var("LOG_FORMAT", "json");
    env::set_var("ALLOWED_ORIGINS", "http://localhost:3000, https://rizzard.app");
    env::set_var("CORS_ENABLED", "true");
}

/// Clean up test environment variables
fn cleanup_test_env() {
    for var in SETTINGS_VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_settings_creation_with_valid_env() {
    let _guard = lock_env();
    setup_test_env();

    let settings = Settings::new().unwrap();
    assert_eq!(settings.app_name, "Rizzard Test");
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.anthropic.base_url, "http://localhost:9999");
    assert_eq!(settings.anthropic.model, "claude-3-5-sonnet-latest");
    assert_eq!(settings.anthropic.max_tokens, 1024);
    assert_eq!(settings.anthropic.timeout, 10);
    assert_eq!(settings.anthropic.stream_timeout, 120);
    assert_eq!(settings.request.max_request_size, 2048);
    assert_eq!(settings.logging.level, "debug");
    assert_eq!(settings.logging.format, "json");
    assert_eq!(
        settings.security.allowed_origins,
        vec!["http://localhost:3000".to_string(), "https://rizzard.app".to_string()]
    );

    cleanup_test_env();
}

#[test]
fn test_default_values() {
    let _guard = lock_env();

    let settings = Settings::new().unwrap();
    assert_eq!(settings.app_name, "Rizzard AI Microservice");
    assert!(!settings.debug);
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 8000);
    assert_eq!(settings.anthropic.base_url, "https://api.anthropic.com");
    assert_eq!(settings.anthropic.api_version, "2023-06-01");
    assert_eq!(settings.anthropic.model, "claude-3-5-haiku-latest");
    assert_eq!(settings.anthropic.max_tokens, 700);
    assert_eq!(settings.anthropic.timeout, 30);
    assert_eq!(settings.anthropic.stream_timeout, 300);
    assert_eq!(settings.request.max_request_size, 1048576);
    assert_eq!(settings.security.allowed_origins, vec!["*".to_string()]);
    assert!(settings.security.cors_enabled);
}

#[test]
fn test_settings_validation_invalid_port() {
    let _guard = lock_env();
    env::set_var("SERVER_PORT", "0");

    let result = Settings::new();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Port number cannot be 0"));

    cleanup_test_env();
}

#[test]
fn test_settings_validation_invalid_url() {
    let _guard = lock_env();
    env::set_var("ANTHROPIC_BASE_URL", "api.anthropic.com");

    let result = Settings::new();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("base URL"));

    cleanup_test_env();
}

#[test]
fn test_settings_validation_invalid_timeout() {
    let _guard = lock_env();
    env::set_var("STREAM_TIMEOUT", "0");

    assert!(Settings::new().is_err());

    cleanup_test_env();
}

#[test]
fn test_settings_validation_invalid_log_level() {
    let _guard = lock_env();
    env::set_var("RUST_LOG", "verbose");

    let result = Settings::new();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid log level"));

    cleanup_test_env();
}

#[test]
fn test_parse_errors() {
    let _guard = lock_env();

    env::set_var("SERVER_PORT", "not-a-port");
    assert!(Settings::new().is_err());
    cleanup_test_env();

    env::set_var("CLAUDE_MAX_TOKENS", "-5");
    assert!(Settings::new().is_err());
    cleanup_test_env();

    env::set_var("DEBUG", "maybe");
    assert!(Settings::new().is_err());
    cleanup_test_env();
}

#[test]
fn test_debug_flag_accepts_common_spellings() {
    let _guard = lock_env();

    for (value, expected) in [
        ("True", true),
        ("1", true),
        ("yes", true),
        ("ON", true),
        ("0", false),
        ("off", false),
        ("FALSE", false),
    ] {
        env::set_var("DEBUG", value);
        let settings = Settings::new().unwrap();
        assert_eq!(settings.debug, expected, "DEBUG={}", value);
    }

    cleanup_test_env();
}

#[test]
fn test_cors_flag_accepts_common_spellings() {
    let _guard = lock_env();

    env::set_var("CORS_ENABLED", "0");
    assert!(!Settings::new().unwrap().security.cors_enabled);

    env::set_var("CORS_ENABLED", "Yes");
    assert!(Settings::new().unwrap().security.cors_enabled);

    env::set_var("CORS_ENABLED", "sometimes");
    assert!(Settings::new().is_err());

    cleanup_test_env();
}

#[test]
fn test_validate_rejects_blank_model() {
    let mut settings = Settings::default();
    settings.anthropic.model = "   ".to_string();
    assert!(settings.validate().is_err());
}

#[test]
fn test_env_secret_provider_reads_once() {
    let var = "RIZZARD_TEST_SECRET_READS_ONCE";
    env::set_var(var, "sk-ant-REDACTED");

    let provider = EnvSecretProvider::new(var);
    let credential = provider.get_credential().unwrap();
    assert_eq!(credential.expose(), "sk-ant-REDACTED");
    assert_eq!(credential.prefix(), "sk-ant-api...");

    // later changes are not observed
    env::set_var(var, "sk-ant-rotated");
    assert_eq!(provider.get_credential().unwrap().expose(), "sk-ant-REDACTED");

    env::remove_var(var);
    assert!(provider.get_credential().is_some());
}

#[test]
fn test_env_secret_provider_missing() {
    let provider = EnvSecretProvider::new("RIZZARD_TEST_SECRET_NEVER_SET");
    assert!(provider.get_credential().is_none());
    assert!(provider.get_credential().is_none());
}

#[test]
fn test_credential_is_redacted_in_logs() {
    let provider = StaticSecretProvider::with_secret("sk-ant-very-secret-value");
    let credential = provider.get_credential().unwrap();

    assert!(!format!("{:?}", credential).contains("very-secret"));
    assert!(!format!("{}", credential).contains("very-secret"));
}

#[test]
fn test_secret_provider_shared_across_threads() {
    let var = "RIZZARD_TEST_SECRET_THREADS";
    env::set_var(var, "sk-ant-shared");

    let provider: Arc<dyn SecretProvider> = Arc::new(EnvSecretProvider::new(var));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let provider = provider.clone();
            std::thread::spawn(move || provider.get_credential().map(|c| c.expose().to_string()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("sk-ant-shared"));
    }

    env::remove_var(var);
}

#[test]
fn test_default_credential_variable_name() {
    assert_eq!(CREDENTIAL_ENV_VAR, "CLAUDE_API");
}

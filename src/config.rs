//! Application configuration for examforge.
//!
//! One `AppConfig` is constructed by the process entrypoint (from
//! environment variables or builders) and handed to every collaborator.
//! Nothing reads the environment at import time and nothing is global,
//! so test doubles plug in without patching.

use std::time::Duration;
use thiserror::Error;

/// Default actor identifier used to scope topic usage events.
pub const DEFAULT_ACTOR_ID: &str = "examforge-agent";

/// Default trailing window for "recently used" topics, in days.
pub const DEFAULT_RECENCY_WINDOW_DAYS: i64 = 7;

/// Default maximum number of events fetched per recency lookup.
pub const DEFAULT_RECENCY_MAX_EVENTS: u32 = 10;

/// Default webhook request timeout, in seconds.
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration for the question generation pipeline.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Memory service settings
    /// Identifier of the memory store holding topic usage events.
    pub memory_store_id: String,
    /// Base URL of the memory service data plane.
    pub memory_endpoint: String,
    /// Actor identifier under which usage events are recorded.
    pub actor_id: String,
    /// Trailing window for recency lookups.
    pub recency_window: Duration,
    /// Maximum events fetched per recency lookup.
    pub recency_max_events: u32,

    // Generation runtime settings
    /// Invocation endpoint of the managed agent runtime.
    pub runtime_endpoint: String,
    /// Optional bearer token for the runtime.
    pub runtime_api_key: Option<String>,
    /// Timeout for one generation call.
    pub generation_timeout: Duration,

    // Notification settings
    /// Webhook URL for result delivery. Empty means notification is
    /// unconfigured; the sink constructor reports this.
    pub webhook_url: Option<String>,
    /// Shared secret embedded in the webhook body for verification.
    pub webhook_token: Option<String>,
    /// Timeout for one webhook delivery.
    pub webhook_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            memory_store_id: String::new(),
            memory_endpoint: String::new(),
            actor_id: DEFAULT_ACTOR_ID.to_string(),
            recency_window: Duration::from_secs(
                DEFAULT_RECENCY_WINDOW_DAYS as u64 * 24 * 60 * 60,
            ),
            recency_max_events: DEFAULT_RECENCY_MAX_EVENTS,
            runtime_endpoint: String::new(),
            runtime_api_key: None,
            generation_timeout: Duration::from_secs(120),
            webhook_url: None,
            webhook_token: None,
            webhook_timeout: Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `EXAMFORGE_MEMORY_STORE_ID`: memory store identifier (required)
    /// - `EXAMFORGE_MEMORY_ENDPOINT`: memory service base URL (required)
    /// - `EXAMFORGE_ACTOR_ID`: actor identifier (default: examforge-agent)
    /// - `EXAMFORGE_RECENCY_WINDOW_DAYS`: recency window in days (default: 7)
    /// - `EXAMFORGE_RECENCY_MAX_EVENTS`: max events per lookup (default: 10)
    /// - `EXAMFORGE_RUNTIME_ENDPOINT`: agent runtime invocation URL (required)
    /// - `EXAMFORGE_RUNTIME_API_KEY`: runtime bearer token (optional)
    /// - `EXAMFORGE_GENERATION_TIMEOUT_SECS`: generation timeout (default: 120)
    /// - `EXAMFORGE_WEBHOOK_URL`: notification webhook URL (optional)
    /// - `EXAMFORGE_WEBHOOK_TOKEN`: webhook shared secret (optional)
    /// - `EXAMFORGE_WEBHOOK_TIMEOUT_SECS`: webhook timeout (default: 30)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or have
    /// invalid values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        config.memory_store_id = std::env::var("EXAMFORGE_MEMORY_STORE_ID")
            .map_err(|_| ConfigError::MissingEnvVar("EXAMFORGE_MEMORY_STORE_ID".to_string()))?;

        config.memory_endpoint = std::env::var("EXAMFORGE_MEMORY_ENDPOINT")
            .map_err(|_| ConfigError::MissingEnvVar("EXAMFORGE_MEMORY_ENDPOINT".to_string()))?;

        if let Ok(val) = std::env::var("EXAMFORGE_ACTOR_ID") {
            config.actor_id = val;
        }

        if let Ok(val) = std::env::var("EXAMFORGE_RECENCY_WINDOW_DAYS") {
            let days: u64 = parse_env_value(&val, "EXAMFORGE_RECENCY_WINDOW_DAYS")?;
            config.recency_window = Duration::from_secs(days * 24 * 60 * 60);
        }

        if let Ok(val) = std::env::var("EXAMFORGE_RECENCY_MAX_EVENTS") {
            config.recency_max_events = parse_env_value(&val, "EXAMFORGE_RECENCY_MAX_EVENTS")?;
        }

        config.runtime_endpoint = std::env::var("EXAMFORGE_RUNTIME_ENDPOINT")
            .map_err(|_| ConfigError::MissingEnvVar("EXAMFORGE_RUNTIME_ENDPOINT".to_string()))?;

        config.runtime_api_key = std::env::var("EXAMFORGE_RUNTIME_API_KEY").ok();

        if let Ok(val) = std::env::var("EXAMFORGE_GENERATION_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "EXAMFORGE_GENERATION_TIMEOUT_SECS")?;
            config.generation_timeout = Duration::from_secs(secs);
        }

        config.webhook_url = std::env::var("EXAMFORGE_WEBHOOK_URL").ok();
        config.webhook_token = std::env::var("EXAMFORGE_WEBHOOK_TOKEN").ok();

        if let Ok(val) = std::env::var("EXAMFORGE_WEBHOOK_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "EXAMFORGE_WEBHOOK_TIMEOUT_SECS")?;
            config.webhook_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_store_id.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "memory_store_id cannot be empty".to_string(),
            ));
        }

        if self.memory_endpoint.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "memory_endpoint cannot be empty".to_string(),
            ));
        }

        if self.actor_id.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "actor_id cannot be empty".to_string(),
            ));
        }

        if self.recency_window.as_secs() == 0 {
            return Err(ConfigError::ValidationFailed(
                "recency_window must be greater than 0".to_string(),
            ));
        }

        if self.recency_max_events == 0 {
            return Err(ConfigError::ValidationFailed(
                "recency_max_events must be greater than 0".to_string(),
            ));
        }

        if self.runtime_endpoint.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "runtime_endpoint cannot be empty".to_string(),
            ));
        }

        if self.generation_timeout.as_secs() == 0 {
            return Err(ConfigError::ValidationFailed(
                "generation_timeout must be greater than 0".to_string(),
            ));
        }

        if self.webhook_timeout.as_secs() == 0 {
            return Err(ConfigError::ValidationFailed(
                "webhook_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder method to set the memory store identifier.
    pub fn with_memory_store_id(mut self, id: impl Into<String>) -> Self {
        self.memory_store_id = id.into();
        self
    }

    /// Builder method to set the memory service endpoint.
    pub fn with_memory_endpoint(mut self, url: impl Into<String>) -> Self {
        self.memory_endpoint = url.into();
        self
    }

    /// Builder method to set the actor identifier.
    pub fn with_actor_id(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = actor_id.into();
        self
    }

    /// Builder method to set the recency window.
    pub fn with_recency_window(mut self, window: Duration) -> Self {
        self.recency_window = window;
        self
    }

    /// Builder method to set the maximum events per recency lookup.
    pub fn with_recency_max_events(mut self, max: u32) -> Self {
        self.recency_max_events = max;
        self
    }

    /// Builder method to set the runtime invocation endpoint.
    pub fn with_runtime_endpoint(mut self, url: impl Into<String>) -> Self {
        self.runtime_endpoint = url.into();
        self
    }

    /// Builder method to set the runtime bearer token.
    pub fn with_runtime_api_key(mut self, key: impl Into<String>) -> Self {
        self.runtime_api_key = Some(key.into());
        self
    }

    /// Builder method to set the generation timeout.
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Builder method to set the webhook URL.
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Builder method to set the webhook shared secret.
    pub fn with_webhook_token(mut self, token: impl Into<String>) -> Self {
        self.webhook_token = Some(token.into());
        self
    }

    /// Builder method to set the webhook timeout.
    pub fn with_webhook_timeout(mut self, timeout: Duration) -> Self {
        self.webhook_timeout = timeout;
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> AppConfig {
        AppConfig::new()
            .with_memory_store_id("mem-test-001")
            .with_memory_endpoint("https://memory.test.local")
            .with_runtime_endpoint("https://runtime.test.local/invoke")
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.actor_id, DEFAULT_ACTOR_ID);
        assert_eq!(config.recency_max_events, DEFAULT_RECENCY_MAX_EVENTS);
        assert_eq!(
            config.recency_window,
            Duration::from_secs(7 * 24 * 60 * 60)
        );
        assert_eq!(config.webhook_timeout, Duration::from_secs(30));
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = minimal_config()
            .with_actor_id("custom-actor")
            .with_recency_window(Duration::from_secs(3600))
            .with_recency_max_events(25)
            .with_runtime_api_key("secret")
            .with_webhook_url("https://hooks.test.local/wh")
            .with_webhook_token("token")
            .with_webhook_timeout(Duration::from_secs(10));

        assert_eq!(config.actor_id, "custom-actor");
        assert_eq!(config.recency_window, Duration::from_secs(3600));
        assert_eq!(config.recency_max_events, 25);
        assert_eq!(config.runtime_api_key.as_deref(), Some("secret"));
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://hooks.test.local/wh")
        );
        assert_eq!(config.webhook_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(minimal_config().validate().is_ok());
    }

    #[test]
    fn test_validation_missing_store_id() {
        let config = AppConfig::new()
            .with_memory_endpoint("https://memory.test.local")
            .with_runtime_endpoint("https://runtime.test.local/invoke");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("memory_store_id"));
    }

    #[test]
    fn test_validation_missing_runtime_endpoint() {
        let config = AppConfig::new()
            .with_memory_store_id("mem-test-001")
            .with_memory_endpoint("https://memory.test.local");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("runtime_endpoint"));
    }

    #[test]
    fn test_validation_zero_window() {
        let config = minimal_config().with_recency_window(Duration::from_secs(0));
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("recency_window"));
    }

    #[test]
    fn test_validation_zero_max_events() {
        let config = minimal_config().with_recency_max_events(0);
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("recency_max_events"));
    }

    #[test]
    fn test_parse_env_value() {
        let parsed: u64 = parse_env_value("42", "TEST_KEY").expect("valid number");
        assert_eq!(parsed, 42);

        let err = parse_env_value::<u64>("not-a-number", "TEST_KEY").unwrap_err();
        assert!(err.to_string().contains("TEST_KEY"));
    }
}

//! Service configuration.
//!
//! `ServiceConfig` represents the top-level `scrivener.toml` that controls
//! admission capacity, worker concurrency, and the endpoints of the
//! external collaborators. All fields have sensible defaults; credentials
//! are never stored in the file -- they come from the environment at
//! startup.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable holding the generation service API key.
pub const GENERATOR_API_KEY_VAR: &str = "SCRIVENER_GENERATOR_API_KEY";

/// Environment variable holding the optional webhook signing secret.
pub const WEBHOOK_SECRET_VAR: &str = "SCRIVENER_WEBHOOK_SECRET";

/// Top-level configuration for the Scrivener service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Maximum number of jobs generating concurrently. Must be >= 1.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Maximum number of jobs waiting for a slot. 0 means unbounded.
    #[serde(default = "default_max_queue_length")]
    pub max_queue_length: usize,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub notifier: NotifierConfig,
}

fn default_max_concurrency() -> usize {
    2
}

fn default_max_queue_length() -> usize {
    50
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_queue_length: default_max_queue_length(),
            generator: GeneratorConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Validate the capacity settings. Called once at startup, before any
    /// client action is accepted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        Ok(())
    }
}

/// Endpoint settings for the external report/question generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_generator_url")]
    pub base_url: String,

    /// Per-request timeout. Generation can take tens of seconds.
    #[serde(default = "default_generator_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_generator_url() -> String {
    "http://localhost:8089".to_string()
}

fn default_generator_timeout_secs() -> u64 {
    120
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_generator_url(),
            timeout_secs: default_generator_timeout_secs(),
        }
    }
}

/// Endpoint settings for result delivery webhooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "default_notifier_url")]
    pub base_url: String,

    #[serde(default = "default_notifier_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_notifier_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_notifier_timeout_secs() -> u64 {
    30
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            base_url: default_notifier_url(),
            timeout_secs: default_notifier_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.max_queue_length, 50);
        assert_eq!(config.generator.timeout_secs, 120);
        config.validate().unwrap();
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.max_queue_length, 50);
    }

    #[test]
    fn test_deserialize_with_values() {
        let toml_str = r#"
max_concurrency = 4
max_queue_length = 0

[generator]
base_url = "https://generate.internal"
timeout_secs = 300

[notifier]
base_url = "https://deliver.internal"
"#;
        let config: ServiceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.max_queue_length, 0);
        assert_eq!(config.generator.base_url, "https://generate.internal");
        assert_eq!(config.generator.timeout_secs, 300);
        assert_eq!(config.notifier.base_url, "https://deliver.internal");
        assert_eq!(config.notifier.timeout_secs, 30);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config: ServiceConfig = toml::from_str("max_concurrency = 0").unwrap();
        assert!(config.validate().is_err());
    }
}

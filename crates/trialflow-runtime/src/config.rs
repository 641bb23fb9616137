//! Delivery configuration.
//!
//! The endpoint URL is the single switch for the side channel: absent, the
//! logger is a no-op. Timeouts accept humantime strings ("15s", "500ms").

use std::time::Duration;
use thiserror::Error;

use crate::sink::SINK_URL_ENV;

/// Default delivery timeout when none is configured.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid timeout '{value}': {reason}")]
    InvalidTimeout { value: String, reason: String },
}

/// Configuration for the event logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Logging endpoint URL; `None` disables delivery entirely.
    pub endpoint: Option<String>,

    /// Per-delivery timeout.
    pub timeout: Duration,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LoggerConfig {
    /// Create a config with the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    /// Load from the `TRIALFLOW_SINK_URL` environment variable.
    ///
    /// A missing or blank variable yields a disabled config, not an error.
    pub fn from_env() -> Self {
        let endpoint = std::env::var(SINK_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty());
        Self {
            endpoint,
            ..Default::default()
        }
    }

    /// Load from a JSON configuration value with environment fallback.
    ///
    /// Checks `endpoint` in the config first, then `TRIALFLOW_SINK_URL`.
    /// `timeout` is an optional humantime string.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let endpoint = value["endpoint"]
            .as_str()
            .filter(|url| !url.trim().is_empty())
            .map(str::to_owned)
            .or_else(|| {
                std::env::var(SINK_URL_ENV)
                    .ok()
                    .filter(|url| !url.trim().is_empty())
            });

        let timeout = match value["timeout"].as_str() {
            Some(raw) => {
                humantime::parse_duration(raw).map_err(|e| ConfigError::InvalidTimeout {
                    value: raw.to_string(),
                    reason: e.to_string(),
                })?
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self { endpoint, timeout })
    }

    /// Whether delivery is enabled.
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        let config = LoggerConfig::default();
        assert!(!config.is_enabled());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_from_json_with_endpoint_and_timeout() {
        let value = serde_json::json!({
            "endpoint": "https://script.example.com/exec",
            "timeout": "3s"
        });
        let config = LoggerConfig::from_json(&value).unwrap();
        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://script.example.com/exec")
        );
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_blank_endpoint_treated_as_absent() {
        let value = serde_json::json!({ "endpoint": "   " });
        let config = LoggerConfig::from_json(&value).unwrap();
        // Unless the environment supplies one, delivery stays disabled.
        if std::env::var(SINK_URL_ENV).is_err() {
            assert!(!config.is_enabled());
        }
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let value = serde_json::json!({ "timeout": "not-a-duration" });
        let result = LoggerConfig::from_json(&value);
        assert!(matches!(result, Err(ConfigError::InvalidTimeout { .. })));
    }
}

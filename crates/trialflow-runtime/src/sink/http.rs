//! HTTP sink implementation.
//!
//! Performs a one-way JSON POST per record to the configured endpoint.
//! No response body is parsed; only the status code is inspected to
//! classify a rejection for the diagnostic log.

use super::{EventSink, LogRecord, SinkError};
use async_trait::async_trait;
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable name for the logging endpoint URL.
pub const SINK_URL_ENV: &str = "TRIALFLOW_SINK_URL";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP delivery sink.
#[derive(Debug, Clone)]
pub struct HttpSink {
    endpoint: String,
    timeout: Duration,
}

impl HttpSink {
    /// Create a sink posting to the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create from the `TRIALFLOW_SINK_URL` environment variable.
    pub fn from_env() -> Result<Self, SinkError> {
        match std::env::var(SINK_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Ok(Self::new(url)),
            _ => Err(SinkError::NotConfigured(format!(
                "set {} to enable event delivery",
                SINK_URL_ENV
            ))),
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn client() -> &'static reqwest::Client {
        static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
        CLIENT.get_or_init(|| {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client")
        })
    }
}

#[async_trait]
impl EventSink for HttpSink {
    async fn deliver(&self, record: &LogRecord) -> Result<(), SinkError> {
        let response = Self::client()
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .timeout(self.timeout)
            .json(record)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SinkError::Timeout(self.timeout)
                } else {
                    SinkError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_creation() {
        let sink = HttpSink::new("https://example.com/log");
        assert_eq!(sink.name(), "http");
        assert_eq!(sink.endpoint(), "https://example.com/log");
        assert_eq!(sink.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_with_timeout() {
        let sink = HttpSink::new("https://example.com/log").with_timeout(Duration::from_secs(3));
        assert_eq!(sink.timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_health_check_requires_endpoint() {
        assert!(HttpSink::new("https://example.com/log").health_check().await);
        assert!(!HttpSink::new("   ").health_check().await);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_http_error() {
        // Reserved TEST-NET address; connection fails fast without a server.
        let sink = HttpSink::new("http://192.0.2.1:9/log").with_timeout(Duration::from_millis(300));
        let record = LogRecord {
            pid: "EM1234".to_string(),
            timestamp: chrono::Utc::now(),
            trial_id: "baseline_pna".to_string(),
            case_text: "text".to_string(),
            ai_text: "finding".to_string(),
            ai_confidence: 90,
            choice: "ai".to_string(),
            confidence: 50,
            clinician_note: String::new(),
            ai_revealed: true,
        };

        let result = sink.deliver(&record).await;
        assert!(matches!(
            result,
            Err(SinkError::HttpError(_)) | Err(SinkError::Timeout(_))
        ));
    }
}

//! Fire-and-forget event delivery.
//!
//! [`EventLogger::submit`] dispatches one unawaited delivery task per
//! committed response. The call never throws, never blocks, and its outcome
//! is never read back into session state: success is silent, failure lands
//! in the [`DiagnosticLog`] only.

use std::sync::Arc;

use chrono::Utc;
use trialflow_core::{ResponseObserver, TrialResponse};

use crate::config::LoggerConfig;
use crate::diagnostics::{DeliveryFailure, DiagnosticLog};
use crate::sink::{EventSink, HttpSink, LogRecord};

/// One-way delivery of committed responses to an external sink.
pub struct EventLogger {
    sink: Option<Arc<dyn EventSink>>,
    diagnostics: Arc<DiagnosticLog>,
}

impl EventLogger {
    /// Create a logger delivering through the given sink.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink: Some(sink),
            diagnostics: Arc::new(DiagnosticLog::default()),
        }
    }

    /// Create a logger with no sink; every submit is a no-op.
    pub fn disabled() -> Self {
        Self {
            sink: None,
            diagnostics: Arc::new(DiagnosticLog::default()),
        }
    }

    /// Build from configuration: an endpoint yields an HTTP sink, absence
    /// disables delivery entirely.
    pub fn from_config(config: &LoggerConfig) -> Self {
        match &config.endpoint {
            Some(endpoint) => Self::new(Arc::new(
                HttpSink::new(endpoint.clone()).with_timeout(config.timeout),
            )),
            None => Self::disabled(),
        }
    }

    /// The diagnostic channel where delivery failures land.
    pub fn diagnostics(&self) -> Arc<DiagnosticLog> {
        self.diagnostics.clone()
    }

    /// Submit a committed response for delivery.
    ///
    /// Returns immediately in every case. With no sink configured this is a
    /// no-op. With no ambient async runtime the dispatch itself is recorded
    /// as a failure instead of panicking.
    pub fn submit(&self, response: &TrialResponse) {
        let Some(sink) = &self.sink else {
            return;
        };

        let record = LogRecord::from(response);
        let sink = Arc::clone(sink);
        let diagnostics = Arc::clone(&self.diagnostics);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(error) = sink.deliver(&record).await {
                        diagnostics.record(DeliveryFailure {
                            trial_id: record.trial_id,
                            sink: sink.name().to_string(),
                            error: error.to_string(),
                            at: Utc::now(),
                        });
                    }
                });
            }
            Err(_) => {
                diagnostics.record(DeliveryFailure {
                    trial_id: record.trial_id,
                    sink: sink.name().to_string(),
                    error: "no async runtime available for dispatch".to_string(),
                    at: Utc::now(),
                });
            }
        }
    }
}

impl ResponseObserver for EventLogger {
    fn on_commit(&self, response: &TrialResponse) {
        self.submit(response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;
    use trialflow_core::{AdvanceOutcome, CaseCatalog, Choice, Session};

    struct RecordingSink {
        delivered: Mutex<Vec<LogRecord>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                delivered: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn deliver(&self, record: &LogRecord) -> Result<(), SinkError> {
            self.delivered.lock().push(record.clone());
            Ok(())
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct FailingSink;

    #[async_trait]
    impl EventSink for FailingSink {
        async fn deliver(&self, _record: &LogRecord) -> Result<(), SinkError> {
            Err(SinkError::HttpError("connection refused".to_string()))
        }

        async fn health_check(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn response(trial_id: &str) -> TrialResponse {
        TrialResponse {
            participant_id: "EM1234".to_string(),
            timestamp: Utc::now(),
            trial_id: trial_id.to_string(),
            case_text: "Vignette text.".to_string(),
            ai_text: "Pneumonia detected.".to_string(),
            ai_confidence: 90,
            choice: Choice::Ai,
            confidence: 50,
            clinician_note: String::new(),
            ai_revealed: true,
        }
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_submit_without_sink_is_noop() {
        let logger = EventLogger::disabled();
        logger.submit(&response("case_0"));
        tokio::task::yield_now().await;
        assert!(logger.diagnostics().is_empty());
    }

    #[tokio::test]
    async fn test_submit_delivers_record() {
        let sink = RecordingSink::new();
        let logger = EventLogger::new(sink.clone());

        logger.submit(&response("case_0"));
        wait_until(|| !sink.delivered.lock().is_empty()).await;

        let delivered = sink.delivered.lock();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].trial_id, "case_0");
        assert_eq!(delivered[0].pid, "EM1234");
    }

    #[tokio::test]
    async fn test_failure_lands_in_diagnostics_only() {
        let logger = EventLogger::new(Arc::new(FailingSink));

        logger.submit(&response("case_0"));
        let diagnostics = logger.diagnostics();
        wait_until(|| !diagnostics.is_empty()).await;

        let failures = diagnostics.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].trial_id, "case_0");
        assert_eq!(failures[0].sink, "failing");
        assert!(failures[0].error.contains("connection refused"));
    }

    #[test]
    fn test_submit_outside_runtime_never_panics() {
        let logger = EventLogger::new(Arc::new(FailingSink));
        logger.submit(&response("case_0"));

        let failures = logger.diagnostics().failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].error.contains("no async runtime"));
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_disturb_session() {
        let catalog_yaml = r#"
catalog_version: "1.0"
name: "Test"
cases:
  - id: "case_0"
    caseText: "Vignette 0."
    aiText: "Pneumonia detected."
    aiConfidence: 90
  - id: "case_1"
    caseText: "Vignette 1."
    aiText: "Pneumothorax detected."
    aiConfidence: 80
"#;
        let catalog = Arc::new(CaseCatalog::from_yaml(catalog_yaml).unwrap());
        let logger = Arc::new(EventLogger::new(Arc::new(FailingSink)));
        let diagnostics = logger.diagnostics();

        let mut session = Session::new(catalog, "EM1234").with_observer(logger);
        session.start_onboarding();
        session.start_trials();

        for i in 0..2 {
            session.reveal_finding();
            session.set_choice(Choice::Radiologist);
            let outcome = session.attempt_advance();
            if i == 0 {
                assert_eq!(outcome, AdvanceOutcome::Committed { next_trial: 1 });
            } else {
                assert_eq!(outcome, AdvanceOutcome::Finished);
            }
        }

        // Every commit landed in the response log despite failing delivery.
        assert_eq!(session.responses().len(), 2);
        wait_until(|| diagnostics.len() == 2).await;
        assert_eq!(diagnostics.failures()[0].trial_id, "case_0");
        assert_eq!(diagnostics.failures()[1].trial_id, "case_1");
    }

    #[tokio::test]
    async fn test_from_config_respects_disabled() {
        let logger = EventLogger::from_config(&LoggerConfig::default());
        assert!(logger.sink.is_none());

        let logger = EventLogger::from_config(&LoggerConfig::new("https://example.com/log"));
        assert!(logger.sink.is_some());
    }
}

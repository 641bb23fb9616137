//! Event sink abstractions for trialflow-runtime.
//!
//! This module defines the trait for delivery sinks and the flat wire
//! record they carry. The HTTP sink in [`http`] is the production
//! implementation; tests substitute their own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use trialflow_core::TrialResponse;

mod http;

pub use http::{HttpSink, SINK_URL_ENV};

/// Errors from delivery sinks.
///
/// These never travel past the delivery task; they terminate in the
/// diagnostic log.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Endpoint rejected record: HTTP {status}")]
    Rejected { status: u16 },

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Sink not configured: {0}")]
    NotConfigured(String),
}

/// The flat field-keyed record delivered for each committed trial.
///
/// Field names are the wire contract of the external logging endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Participant identifier
    pub pid: String,

    /// Commit time, ISO-8601 in serialized form
    pub timestamp: DateTime<Utc>,

    pub trial_id: String,
    pub case_text: String,
    pub ai_text: String,
    pub ai_confidence: u8,
    pub choice: String,
    pub confidence: u8,
    pub clinician_note: String,
    pub ai_revealed: bool,
}

impl From<&TrialResponse> for LogRecord {
    fn from(response: &TrialResponse) -> Self {
        Self {
            pid: response.participant_id.clone(),
            timestamp: response.timestamp,
            trial_id: response.trial_id.clone(),
            case_text: response.case_text.clone(),
            ai_text: response.ai_text.clone(),
            ai_confidence: response.ai_confidence,
            choice: match response.choice {
                trialflow_core::Choice::Radiologist => "radiologist".to_string(),
                trialflow_core::Choice::Ai => "ai".to_string(),
            },
            confidence: response.confidence,
            clinician_note: response.clinician_note.clone(),
            ai_revealed: response.ai_revealed,
        }
    }
}

/// Sink abstraction allows swapping delivery backends.
///
/// Delivery is strictly one-way: implementations must not feed their
/// outcome back into session state.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one record to the external endpoint.
    async fn deliver(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Check if the sink is usable.
    async fn health_check(&self) -> bool;

    /// Get sink name for diagnostics.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use trialflow_core::Choice;

    fn response() -> TrialResponse {
        TrialResponse {
            participant_id: "EM1234".to_string(),
            timestamp: Utc::now(),
            trial_id: "baseline_pna".to_string(),
            case_text: "65-year-old woman with fever.".to_string(),
            ai_text: "Right lower-lobe pneumonia detected.".to_string(),
            ai_confidence: 94,
            choice: Choice::Radiologist,
            confidence: 65,
            clinician_note: "Agree, right base consolidation.".to_string(),
            ai_revealed: true,
        }
    }

    #[test]
    fn test_record_carries_wire_field_names() {
        let record = LogRecord::from(&response());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["pid"], "EM1234");
        assert_eq!(json["trialId"], "baseline_pna");
        assert_eq!(json["aiConfidence"], 94);
        assert_eq!(json["choice"], "radiologist");
        assert_eq!(json["clinicianNote"], "Agree, right base consolidation.");
        assert_eq!(json["aiRevealed"], true);
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_choice_maps_to_lowercase_labels() {
        let mut r = response();
        r.choice = Choice::Ai;
        assert_eq!(LogRecord::from(&r).choice, "ai");
    }
}

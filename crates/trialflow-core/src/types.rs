//! Core data model for trial sessions.
//!
//! Three kinds of state live here:
//! - [`SessionState`]: where the participant is in the Consent → Done flow
//! - [`TrialEphemeral`]: the in-progress inputs for the current trial,
//!   reset on every advance
//! - [`TrialResponse`]: the immutable record created at commit time

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The participant's declared primary source of truth for a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    /// Rely on the radiologist's own read.
    Radiologist,
    /// Rely on the AI finding.
    Ai,
}

/// The phases of a session, traversed strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Consent,
    Onboarding,
    Trial,
    Done,
}

/// Durable per-session state: who is participating and where they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Participant identifier entered at consent.
    pub participant_id: String,

    /// Current phase.
    pub step: Step,

    /// Index of the active case; meaningful only while `step == Step::Trial`.
    pub trial_index: usize,
}

impl SessionState {
    pub fn new(participant_id: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            step: Step::Consent,
            trial_index: 0,
        }
    }
}

/// In-progress inputs for the current trial.
///
/// Reset to defaults on every trial advance. `warning_issued` is monotone
/// within a trial: once true it stays true until the next advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialEphemeral {
    /// Reliance choice; `None` until the participant selects one.
    pub choice: Option<Choice>,

    /// Confidence slider value, clamped to 0–100 at the setter.
    pub confidence: u8,

    /// Free-text clinician note.
    pub note: String,

    /// Whether the AI finding has been revealed this trial.
    pub ai_revealed: bool,

    /// Whether the one-shot warning has already been issued this trial.
    pub warning_issued: bool,
}

impl Default for TrialEphemeral {
    fn default() -> Self {
        Self {
            choice: None,
            confidence: 50,
            note: String::new(),
            ai_revealed: false,
            warning_issued: false,
        }
    }
}

impl TrialEphemeral {
    /// Restore all fields to their trial-start defaults.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The immutable record committed for one trial.
///
/// Appended to the response log in trial order and never mutated afterward.
/// Serializes with the camelCase field names of the export surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialResponse {
    pub participant_id: String,

    /// Commit time, ISO-8601 in serialized form.
    pub timestamp: DateTime<Utc>,

    pub trial_id: String,
    pub case_text: String,
    pub ai_text: String,
    pub ai_confidence: u8,
    pub choice: Choice,
    pub confidence: u8,
    pub clinician_note: String,
    pub ai_revealed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ephemeral_defaults() {
        let ephemeral = TrialEphemeral::default();
        assert_eq!(ephemeral.choice, None);
        assert_eq!(ephemeral.confidence, 50);
        assert_eq!(ephemeral.note, "");
        assert!(!ephemeral.ai_revealed);
        assert!(!ephemeral.warning_issued);
    }

    #[test]
    fn test_choice_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Choice::Radiologist).unwrap(),
            "\"radiologist\""
        );
        assert_eq!(serde_json::to_string(&Choice::Ai).unwrap(), "\"ai\"");
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = TrialResponse {
            participant_id: "EM1234".to_string(),
            timestamp: Utc::now(),
            trial_id: "baseline_pna".to_string(),
            case_text: "65-year-old woman with fever.".to_string(),
            ai_text: "Right lower-lobe pneumonia detected.".to_string(),
            ai_confidence: 94,
            choice: Choice::Ai,
            confidence: 70,
            clinician_note: "Consistent with pneumonia.".to_string(),
            ai_revealed: true,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["participantId"], "EM1234");
        assert_eq!(json["trialId"], "baseline_pna");
        assert_eq!(json["aiConfidence"], 94);
        assert_eq!(json["clinicianNote"], "Consistent with pneumonia.");
        assert_eq!(json["aiRevealed"], true);
    }
}

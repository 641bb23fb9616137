//! Session state machine.
//!
//! [`Session`] owns all mutable session state exclusively: the durable
//! [`SessionState`], the per-trial [`TrialEphemeral`], the pending warning
//! modal, and the append-only response log. Every mutation happens
//! synchronously inside one of its methods; the presentation layer only ever
//! switches on the returned [`AdvanceOutcome`].
//!
//! The flow is strictly forward: Consent → Onboarding → Trial(0) → … →
//! Trial(N-1) → Done. There is exactly one commit per trial, through one
//! canonical advance path, and at most one warning per trial.

use std::sync::Arc;

use chrono::Utc;

use crate::catalog::{CaseCatalog, CaseVignette};
use crate::gate::{GateDecision, ModalAction, Warning, WarningGate};
use crate::types::{Choice, SessionState, Step, TrialEphemeral, TrialResponse};

/// Calibration text shown during onboarding, between consent and the first
/// trial.
pub const CALIBRATION_TEXT: &str = "AI imaging systems can be confidently wrong.\n\
Confidence reflects the model's internal certainty, not ground truth.\n\
Treat confidence as one signal among many.";

/// Receives each committed response.
///
/// Implementations must not block: the session hands the response over
/// synchronously and moves on. The delivery runtime implements this by
/// dispatching an unawaited task.
pub trait ResponseObserver: Send + Sync {
    fn on_commit(&self, response: &TrialResponse);
}

/// Outcome of a flow action.
///
/// Preconditions that are not met surface as [`AdvanceOutcome::Unavailable`]
/// — a disabled action, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The action is currently unavailable; nothing changed.
    Unavailable,

    /// The modal closed without a commit; advance must be invoked again.
    Dismissed,

    /// The gate blocked progression; a warning modal is now pending.
    Warned(Warning),

    /// The trial committed and the session moved to the next case.
    Committed { next_trial: usize },

    /// The final trial committed and the session is done.
    Finished,
}

/// One participant's run from Consent through Done.
pub struct Session {
    catalog: Arc<CaseCatalog>,
    state: SessionState,
    ephemeral: TrialEphemeral,
    responses: Vec<TrialResponse>,
    pending_warning: Option<Warning>,
    gate: WarningGate,
    observer: Option<Arc<dyn ResponseObserver>>,
}

impl Session {
    /// Create a session over a catalog for the given participant.
    pub fn new(catalog: Arc<CaseCatalog>, participant_id: impl Into<String>) -> Self {
        Self {
            catalog,
            state: SessionState::new(participant_id),
            ephemeral: TrialEphemeral::default(),
            responses: Vec::new(),
            pending_warning: None,
            gate: WarningGate::new(),
            observer: None,
        }
    }

    /// Attach an observer that receives each committed response.
    pub fn with_observer(mut self, observer: Arc<dyn ResponseObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn participant_id(&self) -> &str {
        &self.state.participant_id
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    pub fn trial_index(&self) -> usize {
        self.state.trial_index
    }

    /// The active vignette, while in the Trial step.
    pub fn current_case(&self) -> Option<&CaseVignette> {
        match self.state.step {
            Step::Trial => self.catalog.get(self.state.trial_index),
            _ => None,
        }
    }

    pub fn ephemeral(&self) -> &TrialEphemeral {
        &self.ephemeral
    }

    pub fn pending_warning(&self) -> Option<Warning> {
        self.pending_warning
    }

    /// The committed responses so far, in trial order.
    pub fn responses(&self) -> &[TrialResponse] {
        &self.responses
    }

    /// Fraction of trials completed: `trial_index / N` during trials, 0
    /// in every other step.
    pub fn progress(&self) -> f64 {
        match self.state.step {
            Step::Trial => self.state.trial_index as f64 / self.catalog.len() as f64,
            _ => 0.0,
        }
    }

    /// Move from Consent to Onboarding.
    ///
    /// Disabled unless in Consent with a non-blank participant id. Returns
    /// whether the transition happened.
    pub fn start_onboarding(&mut self) -> bool {
        if self.state.step != Step::Consent || self.state.participant_id.trim().is_empty() {
            return false;
        }
        self.state.step = Step::Onboarding;
        tracing::debug!(participant = %self.state.participant_id, "onboarding started");
        true
    }

    /// Move from Onboarding into the first trial. Unconditional from
    /// Onboarding, disabled elsewhere.
    pub fn start_trials(&mut self) -> bool {
        if self.state.step != Step::Onboarding {
            return false;
        }
        self.state.step = Step::Trial;
        self.state.trial_index = 0;
        tracing::debug!(trials = self.catalog.len(), "trials started");
        true
    }

    /// Record the reliance choice for the current trial.
    pub fn set_choice(&mut self, choice: Choice) {
        if self.trial_input_open() {
            self.ephemeral.choice = Some(choice);
        }
    }

    /// Record the confidence slider value, clamped to 0–100.
    pub fn set_confidence(&mut self, value: u8) {
        if self.trial_input_open() {
            self.ephemeral.confidence = value.min(100);
        }
    }

    /// Replace the clinician note for the current trial.
    pub fn set_note(&mut self, note: impl Into<String>) {
        if self.trial_input_open() {
            self.ephemeral.note = note.into();
        }
    }

    /// Reveal the AI finding for the current trial.
    pub fn reveal_finding(&mut self) {
        if self.trial_input_open() {
            self.ephemeral.ai_revealed = true;
        }
    }

    /// Attempt to advance out of the current trial.
    ///
    /// Disabled outside the Trial step, while a warning modal is pending,
    /// and until a reliance choice has been made. On the first attempt of a
    /// trial the warning gate is consulted; once a warning has been issued
    /// the check is skipped for the rest of the trial, so a warning can
    /// never recur after "keep editing" or "continue anyway".
    pub fn attempt_advance(&mut self) -> AdvanceOutcome {
        if self.state.step != Step::Trial || self.pending_warning.is_some() {
            return AdvanceOutcome::Unavailable;
        }
        let Some(choice) = self.ephemeral.choice else {
            return AdvanceOutcome::Unavailable;
        };

        if !self.ephemeral.warning_issued {
            let Some(case) = self.catalog.get(self.state.trial_index) else {
                return AdvanceOutcome::Unavailable;
            };
            if let GateDecision::Block(reason) = self.gate.evaluate(&self.ephemeral, case) {
                self.ephemeral.warning_issued = true;
                let warning = Warning { reason };
                self.pending_warning = Some(warning);
                tracing::debug!(
                    trial = self.state.trial_index,
                    reason = ?reason,
                    "warning surfaced"
                );
                return AdvanceOutcome::Warned(warning);
            }
        }

        self.commit(choice)
    }

    /// Resolve the pending warning modal.
    ///
    /// Reveal closes the modal and exposes the finding without advancing;
    /// keep-editing closes the modal with no state change; continue-anyway
    /// forces the commit path. Disabled when no modal is pending, or for
    /// reveal when the warning does not offer it.
    pub fn resolve_warning(&mut self, action: ModalAction) -> AdvanceOutcome {
        let Some(warning) = self.pending_warning else {
            return AdvanceOutcome::Unavailable;
        };

        match action {
            ModalAction::RevealFinding => {
                if !warning.offers_reveal() {
                    return AdvanceOutcome::Unavailable;
                }
                self.pending_warning = None;
                self.ephemeral.ai_revealed = true;
                AdvanceOutcome::Dismissed
            }
            ModalAction::KeepEditing => {
                self.pending_warning = None;
                AdvanceOutcome::Dismissed
            }
            ModalAction::ContinueAnyway => {
                self.pending_warning = None;
                let Some(choice) = self.ephemeral.choice else {
                    return AdvanceOutcome::Unavailable;
                };
                self.commit(choice)
            }
        }
    }

    /// The full response log as a human-readable JSON block, once Done.
    pub fn export_json(&self) -> Option<String> {
        match self.state.step {
            Step::Done => serde_json::to_string_pretty(&self.responses).ok(),
            _ => None,
        }
    }

    fn trial_input_open(&self) -> bool {
        self.state.step == Step::Trial && self.pending_warning.is_none()
    }

    /// The single commit path: snapshot, append, hand off, reset, advance.
    fn commit(&mut self, choice: Choice) -> AdvanceOutcome {
        let Some(case) = self.catalog.get(self.state.trial_index) else {
            return AdvanceOutcome::Unavailable;
        };

        let response = TrialResponse {
            participant_id: self.state.participant_id.clone(),
            timestamp: Utc::now(),
            trial_id: case.id.clone(),
            case_text: case.case_text.clone(),
            ai_text: case.ai_text.clone(),
            ai_confidence: case.ai_confidence,
            choice,
            confidence: self.ephemeral.confidence,
            clinician_note: self.ephemeral.note.clone(),
            ai_revealed: self.ephemeral.ai_revealed,
        };

        self.responses.push(response);
        if let Some(observer) = &self.observer {
            if let Some(committed) = self.responses.last() {
                observer.on_commit(committed);
            }
        }

        self.ephemeral.reset();
        self.pending_warning = None;

        let next = self.state.trial_index + 1;
        if next < self.catalog.len() {
            self.state.trial_index = next;
            tracing::debug!(trial = next, "advanced to next case");
            AdvanceOutcome::Committed { next_trial: next }
        } else {
            self.state.step = Step::Done;
            tracing::info!(responses = self.responses.len(), "session complete");
            AdvanceOutcome::Finished
        }
    }
}

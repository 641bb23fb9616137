//! One-shot warning gate.
//!
//! **Question**: should progression out of the current trial pause for a
//! warning first?
//!
//! The gate blocks when the AI finding is still hidden, or when a non-blank
//! note lexically disagrees with it. It is consulted at most once per trial;
//! the session skips the check entirely once a warning has been issued.

use crate::catalog::CaseVignette;
use crate::detector;
use crate::types::TrialEphemeral;

/// Why the gate blocked progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The AI finding has not been revealed this trial.
    FindingHidden,

    /// The clinician note shares no keyword with the AI finding.
    NoteDivergence,
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Progression may proceed to commit.
    Clear,

    /// Progression must pause; a warning is surfaced.
    Block(BlockReason),
}

/// A surfaced warning awaiting resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Warning {
    pub reason: BlockReason,
}

impl Warning {
    /// Whether the reveal resolution is offered.
    ///
    /// Only meaningful while the finding is hidden; a divergence warning on
    /// an already-revealed finding has nothing left to reveal.
    pub fn offers_reveal(&self) -> bool {
        self.reason == BlockReason::FindingHidden
    }
}

/// The three resolutions a surfaced warning offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    /// Reveal the AI finding and close the modal. Does not re-attempt the
    /// advance; the participant must invoke it again.
    RevealFinding,

    /// Close the modal with no state change.
    KeepEditing,

    /// Force the commit path unconditionally.
    ContinueAnyway,
}

/// The per-trial warning gate.
pub struct WarningGate;

impl WarningGate {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether the current trial may advance.
    ///
    /// The hidden-finding reason takes precedence when both predicates hold,
    /// since it decides the modal text and whether reveal is offered.
    pub fn evaluate(&self, ephemeral: &TrialEphemeral, case: &CaseVignette) -> GateDecision {
        if !ephemeral.ai_revealed {
            return GateDecision::Block(BlockReason::FindingHidden);
        }

        if !ephemeral.note.trim().is_empty()
            && detector::is_likely_disagreement(&ephemeral.note, &case.ai_text)
        {
            return GateDecision::Block(BlockReason::NoteDivergence);
        }

        GateDecision::Clear
    }
}

impl Default for WarningGate {
    fn default() -> Self {
        Self::new()
    }
}

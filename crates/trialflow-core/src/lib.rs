//! # trialflow-core
//!
//! Deterministic trial-flow controller for vignette-based reliance studies.
//!
//! This crate provides the session core for a behavioral-research
//! instrument, answering:
//! - Which case is the participant on, and what have they entered so far?
//! - May the session advance, or must a warning pause it first?
//! - What exactly was committed for each trial?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: no I/O and no network; the only clock use is the
//!    commit timestamp
//! 2. **One commit per trial**: a single canonical advance path, one index
//!    increment per advance
//! 3. **One warning per trial**: the gate is consulted at most once, then
//!    skipped for the rest of the trial
//! 4. **Exclusive ownership**: all session mutation goes through [`Session`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trialflow_core::{AdvanceOutcome, CaseCatalog, Choice, Session};
//!
//! let catalog = Arc::new(CaseCatalog::from_yaml_file("cases/demo.yaml")?);
//! let mut session = Session::new(catalog, "EM1234");
//! session.start_onboarding();
//! session.start_trials();
//!
//! session.reveal_finding();
//! session.set_choice(Choice::Radiologist);
//! match session.attempt_advance() {
//!     AdvanceOutcome::Committed { next_trial } => println!("on to case {next_trial}"),
//!     AdvanceOutcome::Warned(w) => println!("warned: {:?}", w.reason),
//!     other => println!("{other:?}"),
//! }
//! ```

pub mod catalog;
pub mod detector;
pub mod gate;
pub mod session;
pub mod types;

// Re-export main types at crate root
pub use catalog::{CaseCatalog, CaseVignette, CatalogError};
pub use gate::{BlockReason, GateDecision, ModalAction, Warning, WarningGate};
pub use session::{AdvanceOutcome, ResponseObserver, Session, CALIBRATION_TEXT};
pub use types::{Choice, SessionState, Step, TrialEphemeral, TrialResponse};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_basic_session_flow() {
        let catalog_yaml = r#"
catalog_version: "1.0"
name: "Smoke Catalog"
cases:
  - id: "baseline_pna"
    caseText: "65-year-old woman with 3 days of fever and productive cough."
    aiText: "Right lower-lobe pneumonia detected."
    aiConfidence: 94
"#;

        let catalog = Arc::new(CaseCatalog::from_yaml(catalog_yaml).unwrap());
        let mut session = Session::new(catalog, "EM1234");

        assert!(session.start_onboarding());
        assert!(session.start_trials());

        session.reveal_finding();
        session.set_choice(Choice::Ai);
        session.set_note("Consolidation in the right lower lobe, pneumonia.");

        assert_eq!(session.attempt_advance(), AdvanceOutcome::Finished);
        assert_eq!(session.responses().len(), 1);
        assert!(session.export_json().is_some());
    }
}

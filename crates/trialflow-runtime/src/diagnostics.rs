//! Local diagnostic channel for delivery failures.
//!
//! Transport failures are recovered here and nowhere else: they are never
//! surfaced to the participant flow and never block or reverse a commit.
//! The buffer is bounded; old failures age out first.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// A delivery attempt that failed.
#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    /// Trial whose record failed to deliver
    pub trial_id: String,

    /// Sink that attempted the delivery
    pub sink: String,

    /// Rendered error
    pub error: String,

    /// When the failure was recorded
    pub at: DateTime<Utc>,
}

/// Bounded in-memory record of delivery failures.
pub struct DiagnosticLog {
    failures: Mutex<VecDeque<DeliveryFailure>>,
    capacity: usize,
}

impl DiagnosticLog {
    /// Create a log keeping at most `capacity` failures.
    pub fn new(capacity: usize) -> Self {
        Self {
            failures: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Record a failure, evicting the oldest entry at capacity.
    pub fn record(&self, failure: DeliveryFailure) {
        tracing::warn!(
            trial = %failure.trial_id,
            sink = %failure.sink,
            error = %failure.error,
            "event delivery failed"
        );

        let mut failures = self.failures.lock();
        if failures.len() == self.capacity {
            failures.pop_front();
        }
        failures.push_back(failure);
    }

    /// Snapshot of the recorded failures, oldest first.
    pub fn failures(&self) -> Vec<DeliveryFailure> {
        self.failures.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(256)
    }
}

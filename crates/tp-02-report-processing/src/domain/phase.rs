//! Report processing phase machine
//!
//! A report moves through `Idle -> ReportAccepted -> Distributing -> Idle`
//! within a single serialized processing call. Any failure resets the
//! machine to `Idle` with no other state mutated.

use crate::error::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};

/// Processing phase of the report pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProcessingPhase {
    /// No report in flight.
    #[default]
    Idle,
    /// Structural sanity passed; deltas are being computed.
    ReportAccepted,
    /// Fee shares are being allocated and committed.
    Distributing,
}

impl ProcessingPhase {
    /// Whether `self -> to` is a legal transition.
    pub fn can_transition(self, to: ProcessingPhase) -> bool {
        use ProcessingPhase::*;
        matches!(
            (self, to),
            (Idle, ReportAccepted)
                | (ReportAccepted, Distributing)
                | (Distributing, Idle)
                // abort paths back to Idle
                | (ReportAccepted, Idle)
        )
    }

    /// Validated transition.
    pub fn transition(self, to: ProcessingPhase) -> ReportResult<ProcessingPhase> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(ReportError::InvalidTransition { from: self, to })
        }
    }
}

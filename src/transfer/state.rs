//! Transfer FSM states
//!
//! ```text
//! IDLE → VALIDATING → SUBMITTING → SUCCESS ─┐
//!            │             │                 ├→ IDLE
//!            └─────────────┴──→ FAILED ──────┘
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferState {
    #[default]
    Idle,
    Validating,
    /// Exactly one network call is in flight
    Submitting,
    Success,
    Failed,
}

impl TransferState {
    /// SUCCESS and FAILED are processed, then the machine returns to IDLE
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Success | TransferState::Failed)
    }

    /// Whether `self → next` is an edge of the machine
    pub fn can_transition_to(&self, next: TransferState) -> bool {
        use TransferState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Submitting)
                | (Validating, Failed)
                | (Submitting, Success)
                | (Submitting, Failed)
                | (Success, Idle)
                | (Failed, Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Idle => "IDLE",
            TransferState::Validating => "VALIDATING",
            TransferState::Submitting => "SUBMITTING",
            TransferState::Success => "SUCCESS",
            TransferState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

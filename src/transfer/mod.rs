//! Transfer workflow
//!
//! Client-side controller for moving funds between a user's accounts.
//!
//! # State Machine
//!
//! ```text
//! IDLE → VALIDATING → SUBMITTING → (SUCCESS | FAILED) → IDLE
//! ```
//!
//! # Safety Invariants
//!
//! 1. **One call per attempt**: a validated request triggers exactly one
//!    transfer call; a second submit while one is in flight is refused.
//! 2. **No self-transfer**: source and destination never resolve to the
//!    same account (id equality in BY_ACCOUNT, own number in BY_NUMBER).
//! 3. **Cache replaced, never patched**: every successful transfer is
//!    followed by a full reload; a failed transfer leaves it untouched.

pub mod controller;
pub mod error;
pub mod mode;
pub mod state;
pub mod types;
pub mod validation;

pub use controller::{SubmitOutcome, TransferController};
pub use error::{AccountsLoadError, ReloadFailure, SubmissionFailure, ValidationFailure};
pub use mode::{FieldGate, ModeSelector};
pub use state::TransferState;
pub use types::{
    AttemptId, Destination, TransferForm, TransferMode, TransferRequest, TransferResult,
};
pub use validation::{normalize_destination_number, validate};

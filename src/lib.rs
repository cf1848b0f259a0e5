//! Account Transfer Controller
//!
//! Client-side workflow for moving funds between a user's own accounts:
//! account selection, destination-by-number mode, local validation, a single
//! transfer call per attempt and a full account refresh after success.
//!
//! # Modules
//!
//! - [`account`] - Account types and the immutable account cache
//! - [`money`] - Strict amount parsing and USD display
//! - [`transfer`] - Validator, mode selector and submission FSM
//! - [`api`] - Accounts service seam (HTTP client, scripted mock)
//! - [`presentation`] - Events and view contract for front ends
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod account;
pub mod api;
pub mod config;
pub mod logging;
pub mod money;
pub mod presentation;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, AccountCache, AccountId, AccountNumber};
pub use api::{AccountsApi, ApiError, HttpAccountsApi};
pub use config::AppConfig;
pub use presentation::{ControllerEvent, TransferView};
pub use transfer::{SubmitOutcome, TransferController, TransferMode};

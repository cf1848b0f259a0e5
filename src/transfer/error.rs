//! Transfer Error Types
//!
//! Three failure kinds, kept apart so a refresh problem is never reported as
//! a failed transfer:
//! - [`ValidationFailure`]: local, raised before any network I/O
//! - [`SubmissionFailure`]: the transfer call itself failed
//! - [`ReloadFailure`]: the transfer went through, the account refresh did not

use thiserror::Error;

use crate::account::CacheError;
use crate::api::ApiError;
use crate::money::MoneyError;

/// Shown when a failed transfer call carries no message of its own
pub const GENERIC_TRANSFER_FAILURE: &str = "failed to process transfer";

/// Shown when the transfer call outlives `submit_timeout`
pub const TRANSFER_TIMEOUT_MESSAGE: &str =
    "transfer request timed out; check account balances before retrying";

/// Rejected form input. The display text is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("please select both source and destination accounts")]
    MissingAccounts,

    #[error("cannot transfer to the same account")]
    SameAccount,

    #[error("please enter a valid amount greater than zero")]
    InvalidAmount(#[source] MoneyError),

    /// Selected source is not in the cache (selector and cache out of sync)
    #[error("invalid source account")]
    UnknownSource,
}

impl ValidationFailure {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationFailure::MissingAccounts => "MISSING_ACCOUNTS",
            ValidationFailure::SameAccount => "SAME_ACCOUNT",
            ValidationFailure::InvalidAmount(_) => "INVALID_AMOUNT",
            ValidationFailure::UnknownSource => "UNKNOWN_SOURCE",
        }
    }
}

/// The transfer call failed; nothing was applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    #[error("{}", .0.message().unwrap_or(GENERIC_TRANSFER_FAILURE))]
    Api(#[from] ApiError),

    #[error("{}", TRANSFER_TIMEOUT_MESSAGE)]
    TimedOut,
}

/// Fetching or installing a fresh account list failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountsLoadError {
    #[error("{}", .0.message().unwrap_or("account service returned no message"))]
    Api(#[from] ApiError),

    #[error("{0}")]
    Cache(#[from] CacheError),

    /// The account list is refreshed when the in-flight transfer finishes
    #[error("a transfer is in progress; accounts will refresh when it completes")]
    TransferInFlight,
}

/// A completed transfer whose follow-up account refresh failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transfer succeeded but account list refresh failed: {0}")]
pub struct ReloadFailure(#[source] pub AccountsLoadError);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationFailure::MissingAccounts.to_string(),
            "please select both source and destination accounts"
        );
        assert_eq!(
            ValidationFailure::SameAccount.to_string(),
            "cannot transfer to the same account"
        );
        assert_eq!(
            ValidationFailure::InvalidAmount(MoneyError::InvalidAmount).to_string(),
            "please enter a valid amount greater than zero"
        );
        assert_eq!(ValidationFailure::SameAccount.code(), "SAME_ACCOUNT");
    }

    #[test]
    fn test_submission_message_falls_back_to_generic() {
        let with_msg = SubmissionFailure::from(ApiError::rejected(400, "Insufficient funds"));
        assert_eq!(with_msg.to_string(), "Insufficient funds");

        let blank = SubmissionFailure::from(ApiError::rejected(500, "  "));
        assert_eq!(blank.to_string(), GENERIC_TRANSFER_FAILURE);

        assert_eq!(
            SubmissionFailure::TimedOut.to_string(),
            TRANSFER_TIMEOUT_MESSAGE
        );
    }

    #[test]
    fn test_reload_failure_is_distinct() {
        let err = ReloadFailure(AccountsLoadError::from(ApiError::Transport(
            "connection refused".into(),
        )));
        assert_eq!(
            err.to_string(),
            "transfer succeeded but account list refresh failed: connection refused"
        );
    }
}

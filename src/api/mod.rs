//! Accounts API seam
//!
//! The controller talks to the accounts service only through [`AccountsApi`].
//! Every transfer call is atomic from the caller's side: it either succeeds
//! with a [`TransferResult`] or fails with nothing applied.

pub mod http;
#[cfg(feature = "mock-api")]
pub mod mock;

pub use http::HttpAccountsApi;
#[cfg(feature = "mock-api")]
pub use mock::MockAccountsApi;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::{AccountId, AccountList, AccountNumber};
use crate::transfer::TransferResult;

/// Failure reported by the accounts service or the transport beneath it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Non-2xx response. `message` is the service's `error` field, possibly empty.
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("Invalid response from accounts service: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Human-readable message, if the error carries a non-blank one
    pub fn message(&self) -> Option<&str> {
        let msg = match self {
            ApiError::Rejected { message, .. } => message.as_str(),
            ApiError::Transport(msg) | ApiError::Decode(msg) => msg.as_str(),
        };
        if msg.trim().is_empty() { None } else { Some(msg) }
    }
}

/// Accounts service operations consumed by the transfer controller
#[async_trait]
pub trait AccountsApi: Send + Sync {
    /// Get client name for logging
    fn name(&self) -> &'static str;

    /// List the accounts the user may transfer between
    async fn get_accounts(&self) -> Result<AccountList, ApiError>;

    /// Transfer between two accounts identified by id
    async fn transfer_by_account_id(
        &self,
        source_id: &AccountId,
        destination_id: &AccountId,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<TransferResult, ApiError>;

    /// Transfer between two accounts identified by account number
    async fn transfer_by_account_number(
        &self,
        source_number: &AccountNumber,
        destination_number: &AccountNumber,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<TransferResult, ApiError>;
}

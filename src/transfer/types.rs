//! Transfer Core Types
//!
//! Type definitions for the transfer-submission FSM.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::{AccountId, AccountNumber};

/// Attempt ID type - ULID-based unique identifier
///
/// One per submission attempt, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(ulid::Ulid);

impl AttemptId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AttemptId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// How the destination account is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    /// Destination picked from the cached account list
    #[default]
    ByAccount,
    /// Destination typed in as an account number
    ByNumber,
}

impl TransferMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferMode::ByAccount => "BY_ACCOUNT",
            TransferMode::ByNumber => "BY_NUMBER",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TransferMode::ByAccount => TransferMode::ByNumber,
            TransferMode::ByNumber => TransferMode::ByAccount,
        }
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw field values as entered by the user.
///
/// Nothing here is validated; see [`super::validation::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub source_id: Option<AccountId>,
    pub destination_id: Option<AccountId>,
    pub destination_number: String,
    pub amount: String,
    pub description: String,
}

impl TransferForm {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Validated destination, one variant per mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Picked from the cached list
    Account(AccountId),
    /// Typed in. `source_number` is the source account's own number,
    /// resolved from the cache during validation.
    Number {
        source_number: AccountNumber,
        destination_number: AccountNumber,
    },
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Account(id) => write!(f, "id:{}", id),
            Destination::Number {
                destination_number, ..
            } => write!(f, "number:{}", destination_number),
        }
    }
}

/// Normalized transfer, ready for the API client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: AccountId,
    pub destination: Destination,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl TransferRequest {
    pub fn mode(&self) -> TransferMode {
        match self.destination {
            Destination::Account(_) => TransferMode::ByAccount,
            Destination::Number { .. } => TransferMode::ByNumber,
        }
    }
}

impl fmt::Display for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer {} -> {} amount={}",
            self.source, self.destination, self.amount
        )
    }
}

/// Confirmation returned by a successful transfer call. Opaque to the workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl TransferResult {
    /// User-facing confirmation text
    pub fn confirmation(&self) -> String {
        let mut msg = String::from("transfer completed successfully");
        if let Some(hash) = &self.transaction_hash {
            msg.push_str(&format!("\nTransaction Hash: {}", hash));
        }
        if let Some(id) = &self.transaction_id {
            msg.push_str(&format!("\nTransaction ID: {}", id));
        }
        msg
    }
}

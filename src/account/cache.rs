//! Account Cache
//!
//! Immutable snapshot of the accounts the user can transfer from/to.
//! A new list always produces a new snapshot; nothing is patched in place.

use std::collections::HashSet;

use thiserror::Error;

use super::models::{Account, AccountId, AccountNumber};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Duplicate account id in account list: {0}")]
    DuplicateAccountId(AccountId),

    #[error("Duplicate account number in account list: {0}")]
    DuplicateAccountNumber(AccountNumber),
}

/// Snapshot of transferable accounts, in the order the loader supplied them.
///
/// Guarantees `account_id` and `account_number` are each unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountCache {
    accounts: Vec<Account>,
}

impl AccountCache {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot, rejecting the whole list if any id or number repeats.
    pub fn from_accounts(accounts: Vec<Account>) -> Result<Self, CacheError> {
        let mut ids = HashSet::with_capacity(accounts.len());
        let mut numbers = HashSet::with_capacity(accounts.len());

        for account in &accounts {
            if !ids.insert(&account.account_id) {
                return Err(CacheError::DuplicateAccountId(account.account_id.clone()));
            }
            if !numbers.insert(&account.account_number) {
                return Err(CacheError::DuplicateAccountNumber(
                    account.account_number.clone(),
                ));
            }
        }

        Ok(Self { accounts })
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Exact-match lookup by id.
    pub fn lookup_by_id(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| &a.account_id == id)
    }

    /// Exact-match lookup by account number (linear scan).
    pub fn lookup_by_number(&self, number: &AccountNumber) -> Option<&Account> {
        self.accounts.iter().find(|a| &a.account_number == number)
    }
}

//! Mock Accounts API
//!
//! Scripted in-memory [`AccountsApi`] for tests and local demos.
//! Responses are queued per operation; when a queue is empty the client
//! falls back to its default (current account list, or a successful transfer
//! with a generated transaction id).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;

use super::{AccountsApi, ApiError};
use crate::account::{Account, AccountId, AccountList, AccountNumber};
use crate::transfer::TransferResult;

/// One recorded transfer call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    ById {
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        description: Option<String>,
    },
    ByNumber {
        source: AccountNumber,
        destination: AccountNumber,
        amount: Decimal,
        description: Option<String>,
    },
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct MockAccountsApi {
    accounts: Mutex<Vec<Account>>,
    account_responses: Mutex<VecDeque<Result<AccountList, ApiError>>>,
    transfer_responses: Mutex<VecDeque<Result<TransferResult, ApiError>>>,
    calls: Mutex<Vec<MockCall>>,
    get_accounts_count: AtomicUsize,
    transfer_count: AtomicUsize,
    /// When set, every transfer call waits for a permit before answering
    hold: Mutex<Option<Arc<Semaphore>>>,
    /// Taken by the next `get_accounts` call, which then waits on it
    listing_hold: Mutex<Option<Arc<Semaphore>>>,
    listing_release: Mutex<Option<Arc<Semaphore>>>,
}

impl MockAccountsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        let api = Self::new();
        api.set_accounts(accounts);
        api
    }

    /// Replace the list returned by `get_accounts` once the queue is drained
    pub fn set_accounts(&self, accounts: Vec<Account>) {
        *lock(&self.accounts) = accounts;
    }

    /// Queue a one-off `get_accounts` response
    pub fn push_accounts_response(&self, response: Result<AccountList, ApiError>) {
        lock(&self.account_responses).push_back(response);
    }

    /// Queue a one-off transfer response
    pub fn push_transfer_response(&self, response: Result<TransferResult, ApiError>) {
        lock(&self.transfer_responses).push_back(response);
    }

    /// Make transfer calls wait until [`Self::release_transfer`] is called
    pub fn hold_transfers(&self) {
        *lock(&self.hold) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let one held transfer call answer
    pub fn release_transfer(&self) {
        if let Some(gate) = lock(&self.hold).as_ref() {
            gate.add_permits(1);
        }
    }

    /// Make the next `get_accounts` call wait until [`Self::release_listing`].
    /// Its response is fixed when the call arrives, not when it is released.
    pub fn hold_next_listing(&self) {
        let gate = Arc::new(Semaphore::new(0));
        *lock(&self.listing_hold) = Some(gate.clone());
        *lock(&self.listing_release) = Some(gate);
    }

    /// Let the held `get_accounts` call answer
    pub fn release_listing(&self) {
        if let Some(gate) = lock(&self.listing_release).take() {
            gate.add_permits(1);
        }
    }

    pub fn get_accounts_count(&self) -> usize {
        self.get_accounts_count.load(Ordering::SeqCst)
    }

    pub fn transfer_count(&self) -> usize {
        self.transfer_count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    async fn answer_transfer(&self, call: MockCall) -> Result<TransferResult, ApiError> {
        lock(&self.calls).push(call);
        let n = self.transfer_count.fetch_add(1, Ordering::SeqCst) + 1;

        let gate = lock(&self.hold).clone();
        if let Some(gate) = gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(ApiError::Transport("mock gate closed".into())),
            }
        }

        lock(&self.transfer_responses).pop_front().unwrap_or_else(|| {
            Ok(TransferResult {
                transaction_hash: None,
                transaction_id: Some(format!("mock-tx-{}", n)),
            })
        })
    }
}

#[async_trait]
impl AccountsApi for MockAccountsApi {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_accounts(&self) -> Result<AccountList, ApiError> {
        self.get_accounts_count.fetch_add(1, Ordering::SeqCst);
        let queued = lock(&self.account_responses).pop_front();
        let response = queued.unwrap_or_else(|| {
            Ok(AccountList {
                accounts: lock(&self.accounts).clone(),
            })
        });

        let gate = lock(&self.listing_hold).take();
        if let Some(gate) = gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(ApiError::Transport("mock gate closed".into())),
            }
        }
        response
    }

    async fn transfer_by_account_id(
        &self,
        source_id: &AccountId,
        destination_id: &AccountId,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<TransferResult, ApiError> {
        self.answer_transfer(MockCall::ById {
            source: source_id.clone(),
            destination: destination_id.clone(),
            amount,
            description: description.map(str::to_string),
        })
        .await
    }

    async fn transfer_by_account_number(
        &self,
        source_number: &AccountNumber,
        destination_number: &AccountNumber,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<TransferResult, ApiError> {
        self.answer_transfer(MockCall::ByNumber {
            source: source_number.clone(),
            destination: destination_number.clone(),
            amount,
            description: description.map(str::to_string),
        })
        .await
    }
}

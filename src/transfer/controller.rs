//! Transfer Controller
//!
//! Owns the account cache, the form, the mode selector and the submission
//! FSM. Talks to the accounts service through [`AccountsApi`] and to the
//! screen through [`TransferView`]; it never renders anything itself.
//!
//! # Submission
//!
//! ```text
//! submit()
//!   ├─ already in flight ──────────────→ Busy (no I/O, no event)
//!   ├─ VALIDATING ─ invalid ─→ FAILED ─→ Rejected   (form kept)
//!   └─ SUBMITTING ─ error ───→ FAILED ─→ Failed     (form kept, cache untouched)
//!                 └ ok ──────→ SUCCESS ─→ Completed (form cleared, cache reloaded)
//! ```
//!
//! Every path ends back in IDLE.
//!
//! # Account loads
//!
//! Each fetch takes a ticket before calling the service. A listing is only
//! installed if no newer ticket has been installed already, so a slow load
//! can never put older balances over a post-transfer refresh. Manual loads
//! are refused while a transfer is in flight.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, info, warn};

use super::error::{AccountsLoadError, ReloadFailure, SubmissionFailure, ValidationFailure};
use super::mode::ModeSelector;
use super::state::TransferState;
use super::types::{
    AttemptId, Destination, TransferForm, TransferMode, TransferRequest, TransferResult,
};
use super::validation::validate;
use crate::account::{Account, AccountCache, AccountId, CacheError};
use crate::api::{AccountsApi, ApiError};
use crate::config::TransferSettings;
use crate::presentation::{
    AccountOption, AccountPreview, ControllerEvent, PreviewSide, TransferView,
};

/// What a call to [`TransferController::submit`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission was already in flight; nothing happened
    Busy,
    /// Form input rejected before any network I/O
    Rejected(ValidationFailure),
    /// The transfer call failed; nothing was applied
    Failed(SubmissionFailure),
    /// The transfer went through. `reload` reports the follow-up refresh.
    Completed {
        result: TransferResult,
        reload: Result<(), ReloadFailure>,
    },
}

impl SubmitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SubmitOutcome::Completed { .. })
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight flag when the submission ends, however it ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Current snapshot and the load ticket that produced it
struct Installed {
    generation: u64,
    cache: Arc<AccountCache>,
}

pub struct TransferController {
    api: Arc<dyn AccountsApi>,
    view: Arc<dyn TransferView>,
    settings: TransferSettings,
    cache: RwLock<Installed>,
    load_generation: AtomicU64,
    form: Mutex<TransferForm>,
    mode: Mutex<ModeSelector>,
    state: Mutex<TransferState>,
    in_flight: AtomicBool,
}

impl TransferController {
    pub fn new(
        api: Arc<dyn AccountsApi>,
        view: Arc<dyn TransferView>,
        settings: TransferSettings,
    ) -> Self {
        Self {
            api,
            view,
            settings,
            cache: RwLock::new(Installed {
                generation: 0,
                cache: Arc::new(AccountCache::empty()),
            }),
            load_generation: AtomicU64::new(0),
            form: Mutex::new(TransferForm::default()),
            mode: Mutex::new(ModeSelector::new()),
            state: Mutex::new(TransferState::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Current cache snapshot. Stays valid even if a reload swaps it out.
    pub fn cache(&self) -> Arc<AccountCache> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cache
            .clone()
    }

    pub fn form(&self) -> TransferForm {
        lock(&self.form).clone()
    }

    pub fn mode(&self) -> TransferMode {
        lock(&self.mode).mode()
    }

    pub fn state(&self) -> TransferState {
        *lock(&self.state)
    }

    /// True while a submission owns the pipeline
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Account cache
    // ------------------------------------------------------------------

    /// Fetch the account list and install it. Failure is shown to the user
    /// and leaves the current snapshot in place. Refused while a transfer is
    /// in flight; that transfer refreshes the list itself when it completes.
    pub async fn load_accounts(&self) -> Result<(), AccountsLoadError> {
        let result = if self.is_busy() {
            Err(AccountsLoadError::TransferInFlight)
        } else {
            self.fetch_accounts().await
        };
        if let Err(e) = &result {
            warn!(api = self.api.name(), error = %e, "Account load failed");
            self.emit(ControllerEvent::AccountsLoadFailed {
                message: e.to_string(),
            });
        }
        result
    }

    /// Replace the cache wholesale, re-render both selectors and reset the
    /// form. The mode is kept. A list with duplicate ids or numbers is
    /// rejected and the previous snapshot stays.
    pub fn set_accounts(&self, accounts: Vec<Account>) -> Result<(), CacheError> {
        self.install(self.next_generation(), accounts).map(|_| ())
    }

    fn next_generation(&self) -> u64 {
        self.load_generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Install `accounts` unless a newer load already has. Returns whether
    /// the list was installed.
    fn install(&self, generation: u64, accounts: Vec<Account>) -> Result<bool, CacheError> {
        let snapshot = AccountCache::from_accounts(accounts).inspect_err(|e| {
            warn!(error = %e, "Rejected account list");
        })?;
        let options = snapshot
            .accounts()
            .iter()
            .map(AccountOption::from_account)
            .collect();
        let count = snapshot.len();

        {
            let mut installed = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            if generation < installed.generation {
                info!(
                    generation,
                    installed = installed.generation,
                    "Discarded stale account list"
                );
                return Ok(false);
            }
            *installed = Installed {
                generation,
                cache: Arc::new(snapshot),
            };
        }
        *lock(&self.form) = TransferForm::default();
        info!(accounts = count, generation, "Account cache replaced");

        self.emit(ControllerEvent::AccountsUpdated { options });
        self.emit(ControllerEvent::FormReset);
        Ok(true)
    }

    async fn fetch_accounts(&self) -> Result<(), AccountsLoadError> {
        let generation = self.next_generation();
        let list = self.api.get_accounts().await?;
        self.install(generation, list.accounts)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Form input
    // ------------------------------------------------------------------

    pub fn select_source(&self, id: Option<AccountId>) {
        debug!(source = ?id, "Source selected");
        lock(&self.form).source_id = id.clone();
        self.emit_preview(PreviewSide::Source, id.as_ref());
    }

    pub fn select_destination(&self, id: Option<AccountId>) {
        debug!(destination = ?id, "Destination selected");
        lock(&self.form).destination_id = id.clone();
        self.emit_preview(PreviewSide::Destination, id.as_ref());
    }

    pub fn set_destination_number(&self, number: impl Into<String>) {
        lock(&self.form).destination_number = number.into();
    }

    pub fn set_amount(&self, amount: impl Into<String>) {
        lock(&self.form).amount = amount.into();
    }

    pub fn set_description(&self, description: impl Into<String>) {
        lock(&self.form).description = description.into();
    }

    /// Replace every field at once, for views that hand over the whole form
    /// with the submit intent.
    pub fn set_form(&self, form: TransferForm) {
        *lock(&self.form) = form;
    }

    fn emit_preview(&self, side: PreviewSide, id: Option<&AccountId>) {
        let cache = self.cache();
        let preview = AccountPreview::of(id.and_then(|id| cache.lookup_by_id(id)));
        self.emit(ControllerEvent::PreviewChanged { side, preview });
    }

    // ------------------------------------------------------------------
    // Mode
    // ------------------------------------------------------------------

    /// Flip between BY_ACCOUNT and BY_NUMBER. Field values and the cache are
    /// left alone; only the gate changes.
    pub fn toggle_mode(&self) -> TransferMode {
        let (mode, gate) = {
            let mut selector = lock(&self.mode);
            let mode = selector.toggle();
            (mode, selector.gate())
        };
        info!(mode = %mode, "Transfer mode changed");
        self.emit(ControllerEvent::ModeChanged { mode, gate });
        mode
    }

    /// Set the mode explicitly. Emits only when it actually changes.
    pub fn set_mode(&self, mode: TransferMode) {
        let gate = {
            let mut selector = lock(&self.mode);
            if !selector.set(mode) {
                return;
            }
            selector.gate()
        };
        info!(mode = %mode, "Transfer mode changed");
        self.emit(ControllerEvent::ModeChanged { mode, gate });
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Run one attempt through the submission FSM.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(_in_flight) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Submit ignored: transfer already in flight");
            return SubmitOutcome::Busy;
        };
        let attempt_id = AttemptId::new();

        self.transition(attempt_id, TransferState::Validating);
        let mode = self.mode();
        let form = self.form();
        let request = match validate(mode, &form, &self.cache()) {
            Ok(request) => request,
            Err(failure) => {
                info!(
                    attempt_id = %attempt_id,
                    mode = %mode,
                    code = failure.code(),
                    "Transfer rejected: {}", failure
                );
                self.transition(attempt_id, TransferState::Failed);
                self.emit(ControllerEvent::ValidationError {
                    message: failure.to_string(),
                });
                self.transition(attempt_id, TransferState::Idle);
                return SubmitOutcome::Rejected(failure);
            }
        };

        self.transition(attempt_id, TransferState::Submitting);
        info!(attempt_id = %attempt_id, mode = %request.mode(), "{}", request);

        let result = match self.call_with_timeout(&request).await {
            Ok(result) => result,
            Err(failure) => {
                warn!(attempt_id = %attempt_id, error = ?failure, "Transfer failed: {}", failure);
                self.transition(attempt_id, TransferState::Failed);
                self.emit(ControllerEvent::SubmissionFailed {
                    message: failure.to_string(),
                });
                self.transition(attempt_id, TransferState::Idle);
                return SubmitOutcome::Failed(failure);
            }
        };

        self.transition(attempt_id, TransferState::Success);
        info!(
            attempt_id = %attempt_id,
            transaction_id = ?result.transaction_id,
            transaction_hash = ?result.transaction_hash,
            "Transfer completed"
        );
        *lock(&self.form) = TransferForm::default();
        self.emit(ControllerEvent::FormReset);
        self.emit(ControllerEvent::Submitted {
            confirmation: result.confirmation(),
            result: result.clone(),
        });

        let reload = self.fetch_accounts().await.map_err(ReloadFailure);
        if let Err(failure) = &reload {
            warn!(attempt_id = %attempt_id, error = %failure.0, "Post-transfer reload failed");
            self.emit(ControllerEvent::ReloadFailed {
                message: failure.to_string(),
            });
        }

        self.transition(attempt_id, TransferState::Idle);
        SubmitOutcome::Completed { result, reload }
    }

    async fn call_with_timeout(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferResult, SubmissionFailure> {
        let call = self.dispatch(request);
        match self.settings.submit_timeout() {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result.map_err(SubmissionFailure::from),
                Err(_) => Err(SubmissionFailure::TimedOut),
            },
            None => call.await.map_err(SubmissionFailure::from),
        }
    }

    /// Exactly one API call per attempt, chosen by the destination kind
    async fn dispatch(&self, request: &TransferRequest) -> Result<TransferResult, ApiError> {
        let description = request.description.as_deref();
        match &request.destination {
            Destination::Account(destination_id) => {
                self.api
                    .transfer_by_account_id(
                        &request.source,
                        destination_id,
                        request.amount,
                        description,
                    )
                    .await
            }
            Destination::Number {
                source_number,
                destination_number,
            } => {
                self.api
                    .transfer_by_account_number(
                        source_number,
                        destination_number,
                        request.amount,
                        description,
                    )
                    .await
            }
        }
    }

    fn transition(&self, attempt_id: AttemptId, next: TransferState) {
        let mut state = lock(&self.state);
        if !state.can_transition_to(next) {
            warn!(attempt_id = %attempt_id, "Unexpected transition {} -> {}", *state, next);
        }
        debug!(attempt_id = %attempt_id, "State {} -> {}", *state, next);
        *state = next;
        if next.is_terminal() {
            info!(attempt_id = %attempt_id, "Attempt finished: {}", next);
        }
    }

    fn emit(&self, event: ControllerEvent) {
        debug!(event = event.kind(), "Notify view");
        self.view.notify(&event);
    }
}

#[cfg(all(test, feature = "mock-api"))]
mod tests {
    use super::*;
    use crate::account::{AccountList, AccountNumber};
    use crate::api::MockAccountsApi;
    use crate::api::mock::MockCall;
    use crate::presentation::{ChannelView, drain_events};
    use crate::transfer::FieldGate;
    use crate::transfer::error::{GENERIC_TRANSFER_FAILURE, TRANSFER_TIMEOUT_MESSAGE};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn two_accounts() -> Vec<Account> {
        vec![
            Account::new("A", "1001", "checking", dec("100")),
            Account::new("B", "1002", "savings", dec("50")),
        ]
    }

    fn kinds(events: &[ControllerEvent]) -> Vec<&'static str> {
        events.iter().map(ControllerEvent::kind).collect()
    }

    struct Harness {
        api: Arc<MockAccountsApi>,
        controller: Arc<TransferController>,
        events: UnboundedReceiver<ControllerEvent>,
    }

    impl Harness {
        async fn with_settings(settings: TransferSettings) -> Self {
            let api = Arc::new(MockAccountsApi::with_accounts(two_accounts()));
            let (view, events) = ChannelView::new();
            let controller = Arc::new(TransferController::new(
                api.clone(),
                Arc::new(view),
                settings,
            ));
            controller.load_accounts().await.unwrap();
            let mut harness = Self {
                api,
                controller,
                events,
            };
            harness.drain();
            harness
        }

        async fn new() -> Self {
            Self::with_settings(TransferSettings::default()).await
        }

        fn drain(&mut self) -> Vec<ControllerEvent> {
            drain_events(&mut self.events)
        }

        fn fill_by_account(&self, source: &str, dest: &str, amount: &str) {
            self.controller.select_source(Some(source.into()));
            self.controller.select_destination(Some(dest.into()));
            self.controller.set_amount(amount);
        }
    }

    #[tokio::test]
    async fn test_load_accounts_renders_options() {
        let api = Arc::new(MockAccountsApi::with_accounts(two_accounts()));
        let (view, mut rx) = ChannelView::new();
        let controller = TransferController::new(api, Arc::new(view), TransferSettings::default());
        assert!(controller.cache().is_empty());

        controller.load_accounts().await.unwrap();

        assert_eq!(controller.cache().len(), 2);
        let events = drain_events(&mut rx);
        assert_eq!(kinds(&events), vec!["accountsUpdated", "formReset"]);
        match &events[0] {
            ControllerEvent::AccountsUpdated { options } => {
                assert_eq!(options[0].label, "checking - 1001 ($100.00)");
                assert_eq!(options[1].account_id, AccountId::from("B"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_accounts_failure_is_reported() {
        let api = Arc::new(MockAccountsApi::new());
        api.push_accounts_response(Err(ApiError::rejected(401, "Unauthorized")));
        let (view, mut rx) = ChannelView::new();
        let controller = TransferController::new(api, Arc::new(view), TransferSettings::default());

        let err = controller.load_accounts().await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized");
        assert!(controller.cache().is_empty());
        assert_eq!(
            drain_events(&mut rx),
            vec![ControllerEvent::AccountsLoadFailed {
                message: "Unauthorized".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_duplicate_list_keeps_previous_snapshot() {
        let mut h = Harness::new().await;
        h.controller.set_amount("5");

        let err = h
            .controller
            .set_accounts(vec![
                Account::new("C", "2001", "checking", Decimal::ONE),
                Account::new("C", "2002", "savings", Decimal::ONE),
            ])
            .unwrap_err();
        assert_eq!(err, CacheError::DuplicateAccountId("C".into()));

        assert_eq!(h.controller.cache().len(), 2);
        assert!(h.controller.cache().lookup_by_id(&"A".into()).is_some());
        assert_eq!(h.controller.form().amount, "5");
        assert!(h.drain().is_empty());
    }

    #[tokio::test]
    async fn test_set_accounts_resets_form_but_not_mode() {
        let mut h = Harness::new().await;
        h.controller.toggle_mode();
        h.fill_by_account("A", "B", "10");
        h.drain();

        h.controller
            .set_accounts(vec![Account::new("C", "3001", "checking", Decimal::TEN)])
            .unwrap();

        assert!(h.controller.form().is_empty());
        assert_eq!(h.controller.mode(), TransferMode::ByNumber);
        assert_eq!(kinds(&h.drain()), vec!["accountsUpdated", "formReset"]);
    }

    #[tokio::test]
    async fn test_selection_emits_preview() {
        let mut h = Harness::new().await;

        h.controller.select_source(Some("A".into()));
        h.controller.select_destination(Some("missing".into()));
        h.controller.select_source(None);

        let events = h.drain();
        assert_eq!(
            events[0],
            ControllerEvent::PreviewChanged {
                side: PreviewSide::Source,
                preview: AccountPreview::Account {
                    account_number: "1001".into(),
                    account_type: "checking".into(),
                    balance: "$100.00".into(),
                },
            }
        );
        assert_eq!(
            events[1],
            ControllerEvent::PreviewChanged {
                side: PreviewSide::Destination,
                preview: AccountPreview::Empty,
            }
        );
        assert_eq!(
            events[2],
            ControllerEvent::PreviewChanged {
                side: PreviewSide::Source,
                preview: AccountPreview::Empty,
            }
        );
        assert_eq!(h.controller.form().source_id, None);
    }

    #[tokio::test]
    async fn test_toggle_there_and_back_keeps_cache() {
        let mut h = Harness::new().await;
        let before = h.controller.cache();

        assert_eq!(h.controller.toggle_mode(), TransferMode::ByNumber);
        assert_eq!(h.controller.toggle_mode(), TransferMode::ByAccount);

        assert_eq!(*h.controller.cache(), *before);
        assert_eq!(
            h.drain(),
            vec![
                ControllerEvent::ModeChanged {
                    mode: TransferMode::ByNumber,
                    gate: FieldGate::for_mode(TransferMode::ByNumber),
                },
                ControllerEvent::ModeChanged {
                    mode: TransferMode::ByAccount,
                    gate: FieldGate::for_mode(TransferMode::ByAccount),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_set_mode_same_value_is_silent() {
        let mut h = Harness::new().await;
        h.controller.set_mode(TransferMode::ByAccount);
        assert!(h.drain().is_empty());

        h.controller.set_mode(TransferMode::ByNumber);
        assert_eq!(kinds(&h.drain()), vec!["modeChanged"]);
    }

    #[tokio::test]
    async fn test_toggle_regates_which_destination_is_read() {
        let mut h = Harness::new().await;
        // Both destination fields filled; the mode decides which one counts
        h.fill_by_account("A", "B", "5");
        h.controller.set_destination_number("1001");

        h.controller.toggle_mode();
        let outcome = h.controller.submit().await;
        assert_eq!(outcome, SubmitOutcome::Rejected(ValidationFailure::SameAccount));

        h.controller.toggle_mode();
        assert!(h.controller.submit().await.is_completed());
        assert!(matches!(h.api.calls()[0], MockCall::ById { .. }));
        h.drain();
    }

    #[tokio::test]
    async fn test_validation_failure_does_no_io() {
        let mut h = Harness::new().await;
        for amount in ["", "abc", "0", "-5", "NaN"] {
            h.fill_by_account("A", "B", amount);
            h.controller.set_description("valid description");
            h.drain();

            let outcome = h.controller.submit().await;
            assert!(
                matches!(outcome, SubmitOutcome::Rejected(ValidationFailure::InvalidAmount(_))),
                "amount {:?}",
                amount
            );
            assert_eq!(
                h.drain(),
                vec![ControllerEvent::ValidationError {
                    message: "please enter a valid amount greater than zero".into()
                }]
            );
            assert_eq!(h.controller.form().amount, amount);
            assert_eq!(h.controller.state(), TransferState::Idle);
        }
        assert_eq!(h.api.transfer_count(), 0);
    }

    #[tokio::test]
    async fn test_same_account_rejected() {
        let mut h = Harness::new().await;
        h.fill_by_account("A", "A", "25.50");
        h.drain();

        assert_eq!(
            h.controller.submit().await,
            SubmitOutcome::Rejected(ValidationFailure::SameAccount)
        );
        assert_eq!(
            h.drain(),
            vec![ControllerEvent::ValidationError {
                message: "cannot transfer to the same account".into()
            }]
        );
        assert_eq!(h.api.transfer_count(), 0);
    }

    #[tokio::test]
    async fn test_success_by_account_reloads_cache() {
        let mut h = Harness::new().await;
        h.fill_by_account("A", "B", "25.50");
        h.controller.set_description("rent");
        h.drain();

        // Next listing drops B and updates A
        let refreshed = vec![Account::new("A", "1001", "checking", dec("74.50"))];
        h.api.set_accounts(refreshed.clone());

        let outcome = h.controller.submit().await;
        let SubmitOutcome::Completed { result, reload } = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        assert_eq!(result.transaction_id.as_deref(), Some("mock-tx-1"));
        assert_eq!(reload, Ok(()));

        assert_eq!(
            h.api.calls(),
            vec![MockCall::ById {
                source: "A".into(),
                destination: "B".into(),
                amount: dec("25.50"),
                description: Some("rent".into()),
            }]
        );

        // Cache now equals the refreshed listing
        let cache = h.controller.cache();
        assert_eq!(cache.accounts(), refreshed.as_slice());
        assert!(cache.lookup_by_id(&"B".into()).is_none());
        assert!(cache.lookup_by_number(&"1002".into()).is_none());

        assert!(h.controller.form().is_empty());
        assert_eq!(h.controller.state(), TransferState::Idle);
        assert!(!h.controller.is_busy());

        let events = h.drain();
        assert_eq!(
            kinds(&events),
            vec!["formReset", "submitted", "accountsUpdated", "formReset"]
        );
        assert_eq!(
            events[1],
            ControllerEvent::Submitted {
                confirmation: "transfer completed successfully\nTransaction ID: mock-tx-1".into(),
                result,
            }
        );
    }

    #[tokio::test]
    async fn test_success_by_number_sends_account_numbers() {
        let mut h = Harness::new().await;
        h.controller.toggle_mode();
        h.controller.select_source(Some("A".into()));
        h.controller.set_destination_number(" 9999 ");
        h.controller.set_amount("10");
        h.drain();

        assert!(h.controller.submit().await.is_completed());
        assert_eq!(
            h.api.calls(),
            vec![MockCall::ByNumber {
                source: AccountNumber::from("1001"),
                destination: AccountNumber::from("9999"),
                amount: Decimal::TEN,
                description: None,
            }]
        );
        assert_eq!(h.controller.mode(), TransferMode::ByNumber);
    }

    #[tokio::test]
    async fn test_set_form_then_submit() {
        let mut h = Harness::new().await;
        h.controller.set_form(TransferForm {
            source_id: Some("B".into()),
            destination_id: Some("A".into()),
            amount: " 12.34 ".into(),
            description: "   ".into(),
            ..Default::default()
        });

        assert!(h.controller.submit().await.is_completed());
        assert_eq!(
            h.api.calls(),
            vec![MockCall::ById {
                source: "B".into(),
                destination: "A".into(),
                amount: dec("12.34"),
                description: None,
            }]
        );
        h.drain();
    }

    #[tokio::test]
    async fn test_number_mode_self_transfer_rejected() {
        let mut h = Harness::new().await;
        h.controller.toggle_mode();
        h.controller.select_source(Some("A".into()));
        h.controller.set_destination_number("1001");
        h.controller.set_amount("10");
        h.drain();

        assert_eq!(
            h.controller.submit().await,
            SubmitOutcome::Rejected(ValidationFailure::SameAccount)
        );
        assert_eq!(h.api.transfer_count(), 0);
    }

    #[tokio::test]
    async fn test_submission_failure_keeps_form_and_cache() {
        let mut h = Harness::new().await;
        h.fill_by_account("A", "B", "500");
        h.controller.set_description("too much");
        h.drain();
        h.api
            .push_transfer_response(Err(ApiError::rejected(400, "Insufficient funds")));
        let cache_before = h.controller.cache();
        let form_before = h.controller.form();

        let outcome = h.controller.submit().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(SubmissionFailure::Api(ApiError::rejected(
                400,
                "Insufficient funds"
            )))
        );
        assert_eq!(
            h.drain(),
            vec![ControllerEvent::SubmissionFailed {
                message: "Insufficient funds".into()
            }]
        );
        assert_eq!(h.controller.form(), form_before);
        assert!(Arc::ptr_eq(&h.controller.cache(), &cache_before));
        // Only the initial load hit the listing endpoint
        assert_eq!(h.api.get_accounts_count(), 1);
        assert_eq!(h.controller.state(), TransferState::Idle);
    }

    #[tokio::test]
    async fn test_submission_failure_without_message_is_generic() {
        let mut h = Harness::new().await;
        h.fill_by_account("A", "B", "5");
        h.drain();
        h.api.push_transfer_response(Err(ApiError::rejected(500, "")));

        h.controller.submit().await;
        assert_eq!(
            h.drain(),
            vec![ControllerEvent::SubmissionFailed {
                message: GENERIC_TRANSFER_FAILURE.into()
            }]
        );
    }

    #[tokio::test]
    async fn test_reload_failure_is_not_a_transfer_failure() {
        let mut h = Harness::new().await;
        h.fill_by_account("A", "B", "5");
        h.drain();
        h.api
            .push_accounts_response(Err(ApiError::Transport("connection reset".into())));
        let cache_before = h.controller.cache();

        let outcome = h.controller.submit().await;

        let SubmitOutcome::Completed { reload, .. } = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        let failure = reload.unwrap_err();
        assert_eq!(
            failure.to_string(),
            "transfer succeeded but account list refresh failed: connection reset"
        );
        assert!(Arc::ptr_eq(&h.controller.cache(), &cache_before));
        assert!(h.controller.form().is_empty());

        let events = h.drain();
        assert_eq!(kinds(&events), vec!["formReset", "submitted", "reloadFailed"]);
        assert_eq!(
            events[2].error_message(),
            Some("transfer succeeded but account list refresh failed: connection reset")
        );
    }

    #[tokio::test]
    async fn test_reload_with_duplicate_list_is_reload_failure() {
        let mut h = Harness::new().await;
        h.fill_by_account("A", "B", "5");
        h.api.push_accounts_response(Ok(AccountList {
            accounts: vec![
                Account::new("A", "1001", "checking", Decimal::ONE),
                Account::new("B", "1001", "savings", Decimal::ONE),
            ],
        }));

        let SubmitOutcome::Completed { reload, .. } = h.controller.submit().await else {
            panic!("expected completion");
        };
        assert_eq!(
            reload,
            Err(ReloadFailure(AccountsLoadError::Cache(
                CacheError::DuplicateAccountNumber("1001".into())
            )))
        );
        assert_eq!(h.controller.cache().len(), 2);
        h.drain();
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_busy() {
        let mut h = Harness::new().await;
        h.fill_by_account("A", "B", "5");
        h.drain();
        h.api.hold_transfers();

        let controller = h.controller.clone();
        let first = tokio::spawn(async move { controller.submit().await });
        while h.api.transfer_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(h.controller.is_busy());
        assert_eq!(h.controller.state(), TransferState::Submitting);

        h.controller.set_amount("7");
        assert_eq!(h.controller.submit().await, SubmitOutcome::Busy);
        assert!(h.drain().is_empty());
        assert_eq!(h.api.transfer_count(), 1);
        assert_eq!(h.controller.form().amount, "7");

        h.api.release_transfer();
        assert!(first.await.unwrap().is_completed());
        assert!(!h.controller.is_busy());
        assert_eq!(h.api.transfer_count(), 1);
    }

    #[tokio::test]
    async fn test_slow_load_does_not_overwrite_post_transfer_refresh() {
        let mut h = Harness::new().await;

        // Manual load arrives at the service before the transfer and is slow
        h.api.hold_next_listing();
        let slow_load = {
            let controller = h.controller.clone();
            tokio::spawn(async move { controller.load_accounts().await })
        };
        while h.api.get_accounts_count() < 2 {
            tokio::task::yield_now().await;
        }

        // The transfer moves money; its reload sees the new balances
        h.api.set_accounts(vec![
            Account::new("A", "1001", "checking", dec("75")),
            Account::new("B", "1002", "savings", dec("75")),
        ]);
        h.fill_by_account("A", "B", "25");
        let SubmitOutcome::Completed { reload, .. } = h.controller.submit().await else {
            panic!("expected completion");
        };
        assert_eq!(reload, Ok(()));
        h.drain();

        // Now the stale listing (A = 100) finally answers
        h.api.release_listing();
        assert_eq!(slow_load.await.unwrap(), Ok(()));

        let cache = h.controller.cache();
        assert_eq!(cache.lookup_by_id(&"A".into()).unwrap().balance, dec("75"));
        assert!(h.drain().is_empty());
    }

    #[tokio::test]
    async fn test_manual_load_refused_while_in_flight() {
        let mut h = Harness::new().await;
        h.fill_by_account("A", "B", "5");
        h.drain();
        h.api.hold_transfers();

        let controller = h.controller.clone();
        let submission = tokio::spawn(async move { controller.submit().await });
        while h.api.transfer_count() == 0 {
            tokio::task::yield_now().await;
        }

        h.controller.set_description("still typing");
        assert_eq!(
            h.controller.load_accounts().await,
            Err(AccountsLoadError::TransferInFlight)
        );
        assert_eq!(h.api.get_accounts_count(), 1);
        assert_eq!(h.controller.form().description, "still typing");
        assert_eq!(kinds(&h.drain()), vec!["accountsLoadFailed"]);

        h.api.release_transfer();
        assert!(submission.await.unwrap().is_completed());
        // The transfer's own refresh still runs
        assert_eq!(h.api.get_accounts_count(), 2);
        assert!(h.controller.load_accounts().await.is_ok());
    }

    #[tokio::test]
    async fn test_submit_timeout() {
        let mut h = Harness::with_settings(TransferSettings {
            submit_timeout_ms: Some(20),
        })
        .await;
        h.fill_by_account("A", "B", "5");
        h.drain();
        h.api.hold_transfers();

        let outcome = h.controller.submit().await;

        assert_eq!(outcome, SubmitOutcome::Failed(SubmissionFailure::TimedOut));
        assert_eq!(
            h.drain(),
            vec![ControllerEvent::SubmissionFailed {
                message: TRANSFER_TIMEOUT_MESSAGE.into()
            }]
        );
        assert_eq!(h.controller.form().amount, "5");
        assert!(!h.controller.is_busy());
    }
}

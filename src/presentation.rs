//! Presentation Adapter contract
//!
//! The controller never touches a rendering surface. It emits
//! [`ControllerEvent`]s to a subscribed [`TransferView`], which renders them
//! however it likes (terminal, GUI, test recorder).

use tokio::sync::mpsc;

use crate::account::{Account, AccountId};
use crate::money::format_usd;
use crate::transfer::{FieldGate, TransferMode, TransferResult};

/// Text shown in place of an account preview when nothing is selected
pub const EMPTY_PREVIEW_TEXT: &str = "Select an account";

/// One entry of the source/destination selectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOption {
    pub account_id: AccountId,
    /// e.g. `checking - 1001 ($100.00)`
    pub label: String,
}

impl AccountOption {
    pub fn from_account(account: &Account) -> Self {
        Self {
            account_id: account.account_id.clone(),
            label: format!(
                "{} - {} ({})",
                account.account_type,
                account.account_number,
                format_usd(account.balance)
            ),
        }
    }
}

/// Detail card for the selected source or destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountPreview {
    Empty,
    Account {
        account_number: String,
        account_type: String,
        balance: String,
    },
}

impl AccountPreview {
    pub fn of(account: Option<&Account>) -> Self {
        match account {
            Some(a) => AccountPreview::Account {
                account_number: a.account_number.to_string(),
                account_type: a.account_type.clone(),
                balance: format_usd(a.balance),
            },
            None => AccountPreview::Empty,
        }
    }

    pub fn render(&self) -> String {
        match self {
            AccountPreview::Empty => EMPTY_PREVIEW_TEXT.to_string(),
            AccountPreview::Account {
                account_number,
                account_type,
                balance,
            } => format!(
                "Account Number: {}\nType: {}\nBalance: {}",
                account_number, account_type, balance
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSide {
    Source,
    Destination,
}

/// One-way notification from controller to view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Cache replaced: re-render both selectors
    AccountsUpdated { options: Vec<AccountOption> },
    /// All fields cleared, previews empty, error banner hidden
    FormReset,
    PreviewChanged {
        side: PreviewSide,
        preview: AccountPreview,
    },
    ModeChanged { mode: TransferMode, gate: FieldGate },
    ValidationError { message: String },
    SubmissionFailed { message: String },
    Submitted {
        confirmation: String,
        result: TransferResult,
    },
    /// Transfer succeeded, refresh did not
    ReloadFailed { message: String },
    /// Startup account load failed
    AccountsLoadFailed { message: String },
}

impl ControllerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerEvent::AccountsUpdated { .. } => "accountsUpdated",
            ControllerEvent::FormReset => "formReset",
            ControllerEvent::PreviewChanged { .. } => "previewChanged",
            ControllerEvent::ModeChanged { .. } => "modeChanged",
            ControllerEvent::ValidationError { .. } => "validationError",
            ControllerEvent::SubmissionFailed { .. } => "submissionFailed",
            ControllerEvent::Submitted { .. } => "submitted",
            ControllerEvent::ReloadFailed { .. } => "reloadFailed",
            ControllerEvent::AccountsLoadFailed { .. } => "accountsLoadFailed",
        }
    }

    /// Message for the inline error banner, if this event shows one
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ControllerEvent::ValidationError { message }
            | ControllerEvent::SubmissionFailed { message }
            | ControllerEvent::ReloadFailed { message }
            | ControllerEvent::AccountsLoadFailed { message } => Some(message),
            _ => None,
        }
    }
}

/// Subscriber side of the controller's notifications
pub trait TransferView: Send + Sync {
    fn notify(&self, event: &ControllerEvent);
}

/// View that forwards every event into an unbounded channel
pub struct ChannelView {
    tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl ChannelView {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TransferView for ChannelView {
    fn notify(&self, event: &ControllerEvent) {
        // Receiver gone means nobody is rendering; drop the event
        let _ = self.tx.send(event.clone());
    }
}

/// Take everything currently queued on a [`ChannelView`] receiver
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<ControllerEvent>) -> Vec<ControllerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

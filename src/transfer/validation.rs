//! Transfer Validator
//!
//! Pure decision function from raw form input to a [`TransferRequest`].
//! Rules run in a fixed order and the first failing rule wins:
//!
//! 1. Source and (mode-dependent) destination present
//! 2. `ByAccount`: source id != destination id
//! 3. Amount parses to a positive decimal
//! 4. `ByNumber`: source resolves in the cache and its number != entered number
//!
//! Rule 4 runs after the amount check because it needs the source account.

use crate::account::{AccountCache, AccountId, AccountNumber};
use crate::money::parse_amount;

use super::error::ValidationFailure;
use super::types::{Destination, TransferForm, TransferMode, TransferRequest};

/// Normalize an entered destination number: trim surrounding whitespace,
/// keep case. Returns `None` when nothing is left.
pub fn normalize_destination_number(raw: &str) -> Option<AccountNumber> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(AccountNumber::new(trimmed))
    }
}

fn normalize_description(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Destination as read from the form, before the source is resolved
enum Target<'a> {
    Id(&'a AccountId),
    Number(AccountNumber),
}

/// Validate `form` under `mode` against the current cache snapshot.
pub fn validate(
    mode: TransferMode,
    form: &TransferForm,
    cache: &AccountCache,
) -> Result<TransferRequest, ValidationFailure> {
    // Rule 1: both ends selected
    let source = form
        .source_id
        .as_ref()
        .ok_or(ValidationFailure::MissingAccounts)?;

    let target = match mode {
        TransferMode::ByAccount => form
            .destination_id
            .as_ref()
            .map(Target::Id)
            .ok_or(ValidationFailure::MissingAccounts)?,
        TransferMode::ByNumber => normalize_destination_number(&form.destination_number)
            .map(Target::Number)
            .ok_or(ValidationFailure::MissingAccounts)?,
    };

    // Rule 2: identifier equality (list mode only)
    if let Target::Id(dest_id) = target
        && dest_id == source
    {
        return Err(ValidationFailure::SameAccount);
    }

    // Rule 3: amount
    let amount = parse_amount(&form.amount).map_err(ValidationFailure::InvalidAmount)?;

    // Rule 4: number mode needs the source's own number
    let destination = match target {
        Target::Id(dest_id) => Destination::Account(dest_id.clone()),
        Target::Number(destination_number) => {
            let source_account = cache
                .lookup_by_id(source)
                .ok_or(ValidationFailure::UnknownSource)?;
            if source_account.account_number == destination_number {
                return Err(ValidationFailure::SameAccount);
            }
            Destination::Number {
                source_number: source_account.account_number.clone(),
                destination_number,
            }
        }
    };

    Ok(TransferRequest {
        source: source.clone(),
        destination,
        amount,
        description: normalize_description(&form.description),
    })
}

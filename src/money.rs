//! Money Conversion Module
//!
//! Conversion between user-typed amount text and `Decimal`, plus the USD
//! display format used in account labels and previews.
//!
//! ## Design Principles
//! 1. Plain decimal grammar only: `digits` or `digits.digits`
//! 2. Explicit Error Handling: no silent truncation, no partial parses
//! 3. No locale awareness: `1,000.00` is rejected, never read as one thousand
//!
//! ## Usage
//! ```rust
//! use account_transfer::money::{format_usd, parse_amount};
//!
//! let amount = parse_amount("25.50").unwrap();
//! assert_eq!(amount.to_string(), "25.50");
//! assert_eq!(format_usd(amount), "$25.50");
//! ```

use rust_decimal::prelude::*;
use thiserror::Error;

/// Largest number of fractional digits a `Decimal` can carry.
pub const MAX_FRACTION_DIGITS: u32 = 28;

// ============================================================================
// Error Types
// ============================================================================

/// Money conversion errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Parse: Client → Decimal
// ============================================================================

/// Parse a user-entered amount into a strictly positive `Decimal`.
///
/// Surrounding whitespace is ignored. Everything else must be plain ASCII
/// digits with at most one interior dot.
///
/// # Errors
/// * `InvalidFormat` - empty input, stray characters, exponents, separators
/// * `InvalidAmount` - zero, or an explicit sign
/// * `PrecisionOverflow` - more digits than `Decimal` can hold without rounding
/// * `Overflow` - magnitude beyond `Decimal::MAX`
pub fn parse_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if amount_str.starts_with('-') || amount_str.starts_with('+') {
        return Err(MoneyError::InvalidAmount);
    }

    let parts: Vec<&str> = amount_str.split('.').collect();
    let (whole, frac) = match parts.len() {
        1 => (parts[0], ""),
        2 => {
            // Both sides of the dot must be present: ".5" and "5." are ambiguous
            if parts[0].is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing leading zero (e.g., use 0.5 instead of .5)".into(),
                ));
            }
            if parts[1].is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
                ));
            }
            (parts[0], parts[1])
        }
        _ => return Err(MoneyError::InvalidFormat("multiple decimal points".into())),
    };

    if !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoneyError::InvalidFormat(format!(
            "invalid character in whole part: {}",
            whole
        )));
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoneyError::InvalidFormat(format!(
            "invalid character in fractional part: {}",
            frac
        )));
    }

    if frac.len() > MAX_FRACTION_DIGITS as usize {
        return Err(MoneyError::PrecisionOverflow {
            provided: frac.len() as u32,
            max: MAX_FRACTION_DIGITS,
        });
    }

    let amount = Decimal::from_str(amount_str).map_err(|_| MoneyError::Overflow)?;

    // Decimal keeps 28 significant digits and rounds the rest away
    if amount.scale() as usize != frac.len() {
        return Err(MoneyError::PrecisionOverflow {
            provided: frac.len() as u32,
            max: amount.scale(),
        });
    }

    if amount.is_zero() {
        return Err(MoneyError::InvalidAmount);
    }

    Ok(amount)
}

// ============================================================================
// Format: Decimal → Display
// ============================================================================

/// Format an amount as US dollars: `$1,234.50`, `-$5.00`.
///
/// Rounds half away from zero to cents.
pub fn format_usd(value: Decimal) -> String {
    let cents = value
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", cents);
    let (whole, frac) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && !cents.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}${}.{}", sign, grouped, frac)
}

// ============================================================================
// Unit Tests
// ============================================================================

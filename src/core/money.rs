//! Money conversion helpers.
//!
//! Amounts are persisted as integer cents and handled in memory as [`Decimal`]. Rounding is
//! half-up (away from zero) to two fractional digits and is applied only when a value leaves
//! the pricing arithmetic.

use crate::errors::{Error, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Converts stored cents into a two-place decimal.
#[must_use]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Rounds an amount half-up to two fractional digits.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a decimal amount into cents, rounding half-up first.
///
/// `field` names the input for the error when the amount is out of range.
pub fn to_cents(amount: Decimal, field: &str) -> Result<i64> {
    round_money(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| Error::InvalidAmount {
            field: field.to_string(),
            amount,
        })
}

/// Validates a caller-supplied price: non-negative with at most two fractional digits.
pub fn validate_price(amount: Decimal, field: &str) -> Result<i64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::InvalidAmount {
            field: field.to_string(),
            amount,
        });
    }
    if amount.normalize().scale() > 2 {
        return Err(Error::InvalidAmount {
            field: field.to_string(),
            amount,
        });
    }
    to_cents(amount, field)
}

//! Pricing engine - pure computation of an order's price breakdown.
//!
//! [`compute`] is side-effect free and idempotent; the reconciler calls it as often as it needs
//! without persisting anything in between. Tax and shipping are fixed at zero.

use crate::{
    core::money::{from_cents, round_money},
    entities::{coupon, order_line_item},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Serialize;

/// Anything that contributes a line total to a subtotal.
pub trait LineAmount {
    /// Exact `quantity * unit_price` for the line.
    fn line_total(&self) -> Decimal;
}

impl LineAmount for order_line_item::Model {
    fn line_total(&self) -> Decimal {
        from_cents(self.line_total_cents)
    }
}

/// The parts of a coupon that affect pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouponTerms {
    /// Percentage in `[0, 100]`
    pub discount_percent: Decimal,
    /// Upper bound on the discount
    pub max_discount: Decimal,
}

impl CouponTerms {
    /// Extracts pricing terms from a stored coupon.
    ///
    /// A percentage that cannot be represented (NaN) prices as no discount; values outside
    /// `[0, 100]` are clamped. Both cases are rejected when the coupon is saved.
    #[must_use]
    pub fn from_coupon(coupon: &coupon::Model) -> Self {
        let percent = Decimal::from_f64(coupon.discount_percent)
            .unwrap_or(Decimal::ZERO)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        Self {
            discount_percent: percent,
            max_discount: from_cents(coupon.max_discount_cents).max(Decimal::ZERO),
        }
    }
}

/// Result of pricing a set of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

/// Sum of line totals, kept exact.
pub fn subtotal<L: LineAmount>(lines: &[L]) -> Decimal {
    lines.iter().map(LineAmount::line_total).sum()
}

/// Discount for `subtotal` under `terms`: `min(subtotal * percent / 100, max_discount)`,
/// never more than the subtotal itself and never negative.
#[must_use]
pub fn discount_for(subtotal: Decimal, terms: &CouponTerms) -> Decimal {
    let raw = subtotal * terms.discount_percent / Decimal::ONE_HUNDRED;
    raw.min(terms.max_discount).min(subtotal).max(Decimal::ZERO)
}

/// Prices `lines` with an optional coupon.
///
/// Rounding happens once, when the breakdown is produced. The total is derived from the
/// rounded discount so the published figures always add up.
pub fn compute<L: LineAmount>(lines: &[L], coupon: Option<&CouponTerms>) -> PriceBreakdown {
    let subtotal = subtotal(lines);
    let tax = Decimal::ZERO;
    let shipping = Decimal::ZERO;
    let discount = round_money(coupon.map_or(Decimal::ZERO, |terms| discount_for(subtotal, terms)));
    let total = (subtotal - discount + tax + shipping).max(Decimal::ZERO);

    PriceBreakdown {
        subtotal: round_money(subtotal),
        discount,
        tax,
        shipping,
        total: round_money(total),
    }
}

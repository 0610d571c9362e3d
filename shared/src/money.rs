//! Money helpers
//!
//! Amounts are persisted as integer minor units (cents) and surfaced as
//! `Decimal` with two decimal places. All arithmetic happens on `Decimal`.

use rust_decimal::prelude::*;

/// Monetary values carry two decimal places, half-up
pub const DECIMAL_PLACES: u32 = 2;

/// Largest price accepted at the API boundary (max_digits = 10, 2 decimal places)
pub const MAX_PRICE: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 0);

/// Round a monetary value to two decimal places
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a `Decimal` amount to cents for storage
///
/// Returns `None` when the amount does not fit into an i64.
pub fn to_cents(value: Decimal) -> Option<i64> {
    round_money(value)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_i64()
}

/// Convert stored cents back to a two-place `Decimal`
#[inline]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, DECIMAL_PLACES)
}

/// Largest quantity a single order line may carry
pub const MAX_QUANTITY: i64 = 2_147_483_647;

/// Line total for `quantity` units at `unit_price`
///
/// Stored lines never exceed [`MAX_PRICE`] x [`MAX_QUANTITY`], which fits in a `Decimal`.
pub fn line_total(unit_price: Decimal, quantity: i64) -> Decimal {
    checked_line_total(unit_price, quantity).unwrap_or(Decimal::MAX)
}

/// Line total, or `None` when the product overflows
pub fn checked_line_total(unit_price: Decimal, quantity: i64) -> Option<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .map(round_money)
}

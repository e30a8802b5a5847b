//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` in one implicit group currency.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places amounts are rounded to at the presentation boundary.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Default tolerance below which a balance is treated as settled (one minor unit).
pub const DEFAULT_SETTLEMENT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Rounds an amount for display using Banker's Rounding.
///
/// Computation never rounds; only responses leaving the system do. The result
/// always carries exactly two decimal places, so `30` displays as `30.00`.
#[must_use]
pub fn round_for_display(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(DISPLAY_DECIMAL_PLACES);
    rounded
}

/// Returns true if `amount` is materially different from zero.
///
/// An amount is material when its magnitude is strictly greater than `epsilon`.
#[must_use]
pub fn is_material(amount: Decimal, epsilon: Decimal) -> bool {
    amount.abs() > epsilon
}

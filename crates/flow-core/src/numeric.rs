//! Conversions from the continuous model (`f64`) to wire-grade decimals.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Largest scale a `Decimal` can carry.
pub const MAX_DECIMALS: u32 = 28;

/// Round `value` to `dp` places, half away from zero.
///
/// Non-finite input maps to zero; callers clamp before converting.
pub fn round_decimal(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Smallest representable step at `dp` places (`10^-dp`).
pub fn tick(dp: u32) -> Decimal {
    Decimal::new(1, dp)
}

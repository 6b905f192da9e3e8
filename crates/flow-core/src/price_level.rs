//! Level pricing: (reference price, level, side) -> quoted price.
//!
//! The distance from the reference grows with the level and is tiered
//! to approximate a non-linear spread curve:
//!
//! | level    | step                                  |
//! |----------|---------------------------------------|
//! | 0..10    | `0.0001 * base * (level + 1)`         |
//! | 10..20   | `0.0002 * base * (level + 1)`         |
//! | 20..     | `0.0003 * base * (level + 1)`         |
//!
//! Each step is scaled by `1 + trend * direction * 0.1`, so a trend
//! widens quotes against it and tightens them with it.
//!
//! After rounding to `price_decimals`, a quote that landed on (or across)
//! the reference price is pushed one tick back onto its own side. Bids
//! are therefore always strictly below the reference and asks strictly
//! above.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::config::MarketConfig;
use crate::numeric::{round_decimal, tick};
use crate::side::Side;
use crate::state::Trend;

const TREND_WEIGHT: f64 = 0.1;

/// Fractional step per level for the tier `level` falls in.
pub fn tier_rate(level: usize) -> f64 {
    match level {
        0..=9 => 0.0001,
        10..=19 => 0.0002,
        _ => 0.0003,
    }
}

/// Unrounded distance from `base_price` for a level.
pub fn step_size(base_price: f64, level: usize, side: Side, trend: Trend) -> f64 {
    let trend_factor = 1.0 + trend.signum() * side.direction() * TREND_WEIGHT;
    base_price * tier_rate(level) * (level as f64 + 1.0) * trend_factor
}

/// Quoted price for `level` on `side`.
///
/// Returns `None` when the bid would be at or below zero, which can only
/// happen for a collapsed reference price.
pub fn level_price(
    base_price: f64,
    level: usize,
    side: Side,
    trend: Trend,
    config: &MarketConfig,
) -> Option<Decimal> {
    let dp = config.price_decimals;
    let raw = base_price + side.direction() * step_size(base_price, level, side, trend);
    let mut price = round_decimal(raw, dp);

    let reference = Decimal::from_f64(base_price).unwrap_or(Decimal::ZERO);
    match side {
        Side::Buy if price >= reference => price -= tick(dp),
        Side::Sell if price <= reference => price += tick(dp),
        _ => {}
    }

    if price <= Decimal::ZERO {
        return None;
    }
    Some(price)
}

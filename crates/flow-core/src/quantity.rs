//! Order size model.
//!
//! A size is `base_quantity` times five independent factors:
//!
//! | factor      | formula                                        |
//! |-------------|------------------------------------------------|
//! | level decay | `exp(-level * 0.08)`                           |
//! | time wave   | `sin(t/5000)*0.3 + sin(t/12000)*0.2 + 1`       |
//! | randomness  | `sqrt(U(0,1)) * 1.5`                           |
//! | multiplier  | `state.quantity_multiplier`                    |
//! | trend       | `1 + trend * 0.1`                              |
//!
//! The product is floored at `MIN_QUANTITY` and rounded to the market's
//! quantity precision. The multiplier is *read* here, never updated;
//! see [`crate::depth_target`] for its timer.

use rand::Rng;
use rust_decimal::Decimal;

use crate::config::MarketConfig;
use crate::numeric::round_decimal;
use crate::state::MarketState;

pub const LEVEL_DECAY: f64 = 0.08;
pub const MIN_QUANTITY: f64 = 0.1;
const RANDOM_SCALE: f64 = 1.5;
const TREND_WEIGHT: f64 = 0.1;

pub fn level_factor(level: usize) -> f64 {
    (-(level as f64) * LEVEL_DECAY).exp()
}

/// Smooth oscillation in `[0.5, 1.5]` driven by wall-clock millis.
pub fn time_factor(now_ms: i64) -> f64 {
    let t = now_ms as f64;
    (t / 5_000.0).sin() * 0.3 + (t / 12_000.0).sin() * 0.2 + 1.0
}

/// Map a uniform draw to the skewed random factor.
pub fn random_factor(draw: f64) -> f64 {
    draw.sqrt() * RANDOM_SCALE
}

/// Raw (unfloored, unrounded) size for a given random draw.
pub fn raw_quantity(
    level: usize,
    state: &MarketState,
    config: &MarketConfig,
    now_ms: i64,
    draw: f64,
) -> f64 {
    let trend_factor = 1.0 + state.trend.signum() * TREND_WEIGHT;
    config.base_quantity
        * level_factor(level)
        * time_factor(now_ms)
        * random_factor(draw)
        * state.quantity_multiplier
        * trend_factor
}

/// Size for a quote at `level`, consuming one draw from `rng`.
pub fn quantity<R: Rng + ?Sized>(
    level: usize,
    state: &MarketState,
    config: &MarketConfig,
    now_ms: i64,
    rng: &mut R,
) -> Decimal {
    let draw: f64 = rng.gen();
    let raw = raw_quantity(level, state, config, now_ms, draw);
    round_decimal(raw.max(MIN_QUANTITY), config.quantity_decimals)
}

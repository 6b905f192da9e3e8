//! Reference price process.
//!
//! Each cycle the reference price moves by three contributions:
//! - trend drift: `trend * volatility`
//! - random walk: `last * volatility * U(-1, 1)`
//! - mean reversion: `(base - last) * 0.1`
//!
//! The result is floored at zero. Reversion keeps a long run oscillating
//! around `base_price` instead of wandering off.
//!
//! The trend regime is itself a slow random process: with probability
//! `TREND_SWITCH_PROBABILITY` per cycle it is redrawn uniformly from
//! down / neutral / up (redrawing the current value is allowed).

use rand::Rng;

use crate::config::MarketConfig;
use crate::state::{MarketState, Trend};

pub const TREND_SWITCH_PROBABILITY: f64 = 0.03;
pub const MEAN_REVERSION: f64 = 0.1;

/// Possibly redraw the trend regime. Returns `true` if a redraw happened.
pub fn maybe_switch_trend<R: Rng + ?Sized>(state: &mut MarketState, rng: &mut R) -> bool {
    if rng.gen_bool(TREND_SWITCH_PROBABILITY) {
        state.trend = Trend::ALL[rng.gen_range(0..Trend::ALL.len())];
        true
    } else {
        false
    }
}

/// One step of the process for a given random shock in `[-1, 1]`.
pub fn step_price(last: f64, base: f64, volatility: f64, trend: Trend, shock: f64) -> f64 {
    let trend_effect = trend.signum() * volatility;
    let random_walk = last * volatility * shock;
    let reversion = (base - last) * MEAN_REVERSION;
    (last + trend_effect + random_walk + reversion).max(0.0)
}

/// Advance the reference price, record it in the history, and return it.
pub fn next_price<R: Rng + ?Sized>(
    state: &mut MarketState,
    config: &MarketConfig,
    rng: &mut R,
) -> f64 {
    let shock = rng.gen_range(-1.0..1.0);
    let price = step_price(
        state.last_price,
        config.base_price,
        config.volatility,
        state.trend,
        shock,
    );
    state.record_price(price);
    price
}

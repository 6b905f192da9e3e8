//! Timer-gated regime updates: the book-wide quantity multiplier and the
//! target resting-order count per side.
//!
//! Each has its own interval and fires at most once per interval, no
//! matter how often the loop cycles. That keeps size and depth regimes
//! smooth instead of flickering every tick.

use rand::Rng;

use crate::config::MarketConfig;
use crate::state::{MarketState, MAX_QUANTITY_MULTIPLIER, MIN_QUANTITY_MULTIPLIER};

/// Half-width of the uniform multiplier change per update.
pub const MULTIPLIER_STEP: f64 = 0.2;
const MULTIPLIER_TREND_WEIGHT: f64 = 0.1;

/// Which timers fired during a [`refresh`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetUpdate {
    pub multiplier_updated: bool,
    pub target_updated: bool,
}

/// `multiplier * (1 + base_change + trend_effect)`, clamped to `[0.5, 2.0]`.
pub fn apply_multiplier_change(multiplier: f64, base_change: f64, trend_effect: f64) -> f64 {
    (multiplier * (1.0 + base_change + trend_effect))
        .clamp(MIN_QUANTITY_MULTIPLIER, MAX_QUANTITY_MULTIPLIER)
}

/// `floor(min + (max - min) * draw^2)`.
///
/// Squaring biases toward `min`: thin books most of the time, with the
/// occasional deep burst. `draw` is expected in `[0, 1)`.
pub fn target_from_draw(min: usize, max: usize, draw: f64) -> usize {
    let range = max.saturating_sub(min) as f64;
    let target = min + (range * draw.clamp(0.0, 1.0).powi(2)).floor() as usize;
    target.min(max)
}

fn elapsed(now_ms: i64, since_ms: i64, interval_ms: u64) -> bool {
    now_ms.saturating_sub(since_ms) >= interval_ms as i64
}

/// Update the quantity multiplier if its interval has elapsed.
pub fn update_quantity_multiplier<R: Rng + ?Sized>(
    state: &mut MarketState,
    config: &MarketConfig,
    now_ms: i64,
    rng: &mut R,
) -> bool {
    if !elapsed(now_ms, state.last_quantity_update_ms, config.quantity_update_interval_ms) {
        return false;
    }
    let base_change = rng.gen_range(-MULTIPLIER_STEP..MULTIPLIER_STEP);
    let trend_effect = state.trend.signum() * MULTIPLIER_TREND_WEIGHT;
    state.quantity_multiplier =
        apply_multiplier_change(state.quantity_multiplier, base_change, trend_effect);
    state.last_quantity_update_ms = now_ms;
    true
}

/// Resample the target order count if its interval has elapsed.
pub fn update_target_order_count<R: Rng + ?Sized>(
    state: &mut MarketState,
    config: &MarketConfig,
    now_ms: i64,
    rng: &mut R,
) -> bool {
    if !elapsed(now_ms, state.last_order_count_update_ms, config.order_count_update_interval_ms) {
        return false;
    }
    state.target_order_count =
        target_from_draw(config.min_order_count, config.max_order_count, rng.gen());
    state.last_order_count_update_ms = now_ms;
    true
}

/// Run both timers for this cycle.
pub fn refresh<R: Rng + ?Sized>(
    state: &mut MarketState,
    config: &MarketConfig,
    now_ms: i64,
    rng: &mut R,
) -> TargetUpdate {
    TargetUpdate {
        target_updated: update_target_order_count(state, config, now_ms, rng),
        multiplier_updated: update_quantity_multiplier(state, config, now_ms, rng),
    }
}

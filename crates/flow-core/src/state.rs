//! Mutable simulator state for one market.
//!
//! Created once at startup, mutated every reconciliation cycle by the
//! single control task, and dropped at shutdown. Nothing is persisted;
//! a restart begins again from `base_price` with a neutral trend.

use std::collections::VecDeque;
use std::fmt;

use crate::config::MarketConfig;

/// How many reference prices the history ring keeps.
pub const PRICE_HISTORY_LEN: usize = 100;

/// Lower clamp for the book-wide quantity multiplier.
pub const MIN_QUANTITY_MULTIPLIER: f64 = 0.5;

/// Upper clamp for the book-wide quantity multiplier.
pub const MAX_QUANTITY_MULTIPLIER: f64 = 2.0;

/// Slow directional bias of the simulated market.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Trend {
    Down,
    #[default]
    Neutral,
    Up,
}

impl Trend {
    pub const ALL: [Trend; 3] = [Trend::Down, Trend::Neutral, Trend::Up];

    /// Signed value used by every formula: `-1`, `0` or `+1`.
    pub fn signum(self) -> f64 {
        match self {
            Trend::Down => -1.0,
            Trend::Neutral => 0.0,
            Trend::Up => 1.0,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Down => "down",
            Trend::Neutral => "neutral",
            Trend::Up => "up",
        })
    }
}

/// All mutable simulator fields, owned by the reconciliation loop.
#[derive(Debug, Clone)]
pub struct MarketState {
    /// Current reference price; never negative.
    pub last_price: f64,

    price_history: VecDeque<f64>,

    pub trend: Trend,

    /// Always within `[MIN_QUANTITY_MULTIPLIER, MAX_QUANTITY_MULTIPLIER]`.
    pub quantity_multiplier: f64,

    /// Always within `[min_order_count, max_order_count]`.
    pub target_order_count: usize,

    /// Wall-clock millis of the last multiplier update.
    pub last_quantity_update_ms: i64,

    /// Wall-clock millis of the last target-count resample.
    pub last_order_count_update_ms: i64,
}

impl MarketState {
    /// Fresh state anchored at `config.base_price`, with both timers
    /// starting at `now_ms`.
    pub fn new(config: &MarketConfig, now_ms: i64) -> Self {
        MarketState {
            last_price: config.base_price,
            price_history: VecDeque::with_capacity(PRICE_HISTORY_LEN),
            trend: Trend::Neutral,
            quantity_multiplier: 1.0,
            target_order_count: config.min_order_count,
            last_quantity_update_ms: now_ms,
            last_order_count_update_ms: now_ms,
        }
    }

    /// Record a new reference price, evicting the oldest once full.
    pub fn record_price(&mut self, price: f64) {
        self.last_price = price;
        if self.price_history.len() == PRICE_HISTORY_LEN {
            self.price_history.pop_front();
        }
        self.price_history.push_back(price);
    }

    pub fn price_history(&self) -> &VecDeque<f64> {
        &self.price_history
    }

    /// `(min, max)` over the retained history, `None` before the first cycle.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.price_history.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

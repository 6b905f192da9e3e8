//! Per-order retirement policy.
//!
//! A side at or below `min_order_count` is never touched. Above it, four
//! independent triggers are evaluated and OR-combined:
//!
//! 1. churn: probability 0.05 per order per cycle,
//! 2. stale quote: `|price - reference| / reference > 0.08`,
//! 3. depth correction: probability 0.15 while the side is over target,
//! 4. directional withdrawal: probability 0.1 for asks in an uptrend and
//!    bids in a downtrend.
//!
//! All four are drawn every time so that the random stream consumed per
//! order does not depend on which trigger fired first.

use std::fmt;

use rand::Rng;
use rust_decimal::prelude::*;

use crate::order::Order;
use crate::side::Side;
use crate::state::Trend;

pub const CHURN_PROBABILITY: f64 = 0.05;
pub const MAX_PRICE_DEVIATION: f64 = 0.08;
pub const OVER_TARGET_PROBABILITY: f64 = 0.15;
pub const AGAINST_TREND_PROBABILITY: f64 = 0.1;

/// Why an order was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Churn,
    StaleQuote,
    OverTarget,
    AgainstTrend,
    /// Not produced by the policy; used when the engine clears its book.
    Shutdown,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CancelReason::Churn => "churn",
            CancelReason::StaleQuote => "stale_quote",
            CancelReason::OverTarget => "over_target",
            CancelReason::AgainstTrend => "against_trend",
            CancelReason::Shutdown => "shutdown",
        })
    }
}

/// Relative distance of `price` from `reference`.
///
/// A non-positive reference makes every quote infinitely stale.
pub fn price_deviation(price: f64, reference: f64) -> f64 {
    if reference <= 0.0 {
        return f64::INFINITY;
    }
    (price - reference).abs() / reference
}

/// Whether `side` is leaning against `trend`.
pub fn opposes_trend(side: Side, trend: Trend) -> bool {
    matches!((trend, side), (Trend::Up, Side::Sell) | (Trend::Down, Side::Buy))
}

#[derive(Debug, Clone, Copy)]
pub struct CancellationPolicy {
    min_order_count: usize,
}

impl CancellationPolicy {
    pub fn new(min_order_count: usize) -> Self {
        CancellationPolicy { min_order_count }
    }

    /// First trigger that fired for `order`, or `None` to keep it.
    ///
    /// `orders_on_side` is the number of live orders on the order's side
    /// that are not already flagged this cycle.
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        order: &Order,
        current_price: f64,
        orders_on_side: usize,
        target_count: usize,
        trend: Trend,
        rng: &mut R,
    ) -> Option<CancelReason> {
        if orders_on_side <= self.min_order_count {
            return None;
        }

        let churn = rng.gen_bool(CHURN_PROBABILITY);
        let over_target_draw = rng.gen_bool(OVER_TARGET_PROBABILITY);
        let against_trend_draw = rng.gen_bool(AGAINST_TREND_PROBABILITY);

        let price = order.price.to_f64().unwrap_or(0.0);
        let stale = price_deviation(price, current_price) > MAX_PRICE_DEVIATION;
        let over_target = orders_on_side > target_count && over_target_draw;
        let against_trend = opposes_trend(order.side, trend) && against_trend_draw;

        if churn {
            Some(CancelReason::Churn)
        } else if stale {
            Some(CancelReason::StaleQuote)
        } else if over_target {
            Some(CancelReason::OverTarget)
        } else if against_trend {
            Some(CancelReason::AgainstTrend)
        } else {
            None
        }
    }

    pub fn should_cancel<R: Rng + ?Sized>(
        &self,
        order: &Order,
        current_price: f64,
        orders_on_side: usize,
        target_count: usize,
        trend: Trend,
        rng: &mut R,
    ) -> bool {
        self.evaluate(order, current_price, orders_on_side, target_count, trend, rng)
            .is_some()
    }
}

//! Pure per-cycle planning.
//!
//! The reconciliation loop is split into I/O (talking to the venue) and
//! the decisions below, which only touch `MarketState` and the RNG:
//! - [`advance`]: trend, targets, reference price for this cycle,
//! - [`select_cancels`]: which live orders to retire,
//! - [`build_quotes`]: which new quotes fill the shortfall.

use rand::Rng;

use crate::cancellation::{CancelReason, CancellationPolicy};
use crate::config::MarketConfig;
use crate::depth_target::{self, TargetUpdate};
use crate::order::{BookSnapshot, NewQuote, Order};
use crate::price_level::level_price;
use crate::price_process;
use crate::quantity::quantity;
use crate::side::Side;
use crate::state::{MarketState, Trend};

/// Outcome of the COMPUTE_TARGETS step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleTargets {
    pub reference_price: f64,
    pub trend: Trend,
    pub trend_switched: bool,
    pub target_order_count: usize,
    pub updates: TargetUpdate,
}

/// Refresh the trend regime, depth target, multiplier and reference price.
pub fn advance<R: Rng + ?Sized>(
    state: &mut MarketState,
    config: &MarketConfig,
    now_ms: i64,
    rng: &mut R,
) -> CycleTargets {
    let trend_switched = price_process::maybe_switch_trend(state, rng);
    let updates = depth_target::refresh(state, config, now_ms, rng);
    let reference_price = price_process::next_price(state, config, rng);

    CycleTargets {
        reference_price,
        trend: state.trend,
        trend_switched,
        target_order_count: state.target_order_count,
        updates,
    }
}

/// `max(0, target - current)`.
pub fn shortfall(target: usize, current: usize) -> usize {
    target.saturating_sub(current)
}

/// Flag live orders for cancellation.
///
/// The per-side count passed to the policy shrinks as orders on that side
/// are flagged, so one cycle can never take a side below the floor.
pub fn select_cancels<R: Rng + ?Sized>(
    snapshot: &BookSnapshot,
    policy: &CancellationPolicy,
    reference_price: f64,
    target_count: usize,
    trend: Trend,
    rng: &mut R,
) -> Vec<(Order, CancelReason)> {
    let mut remaining_bids = snapshot.bids.len();
    let mut remaining_asks = snapshot.asks.len();
    let mut flagged = Vec::new();

    for order in snapshot.iter() {
        let remaining = match order.side {
            Side::Buy => &mut remaining_bids,
            Side::Sell => &mut remaining_asks,
        };
        if let Some(reason) =
            policy.evaluate(order, reference_price, *remaining, target_count, trend, rng)
        {
            *remaining -= 1;
            flagged.push((order.clone(), reason));
        }
    }

    flagged
}

/// New quotes for the given per-side shortfalls, interleaved bid/ask by
/// level starting at level 0.
///
/// Bids whose price would not be positive are skipped.
pub fn build_quotes<R: Rng + ?Sized>(
    reference_price: f64,
    bid_shortfall: usize,
    ask_shortfall: usize,
    state: &MarketState,
    config: &MarketConfig,
    now_ms: i64,
    rng: &mut R,
) -> Vec<NewQuote> {
    let mut quotes = Vec::with_capacity(bid_shortfall + ask_shortfall);

    for level in 0..bid_shortfall.max(ask_shortfall) {
        for (side, needed) in [(Side::Buy, bid_shortfall), (Side::Sell, ask_shortfall)] {
            if level >= needed {
                continue;
            }
            let Some(price) = level_price(reference_price, level, side, state.trend, config)
            else {
                continue;
            };
            quotes.push(NewQuote {
                level,
                side,
                price,
                quantity: quantity(level, state, config, now_ms, rng),
            });
        }
    }

    quotes
}

//! Venue-side order representation.
//!
//! The venue owns every order. The engine only ever holds a transient,
//! polled snapshot of what is resting, so this type carries no lifecycle
//! state of its own:
//! - `order_id`, `market`, `account_id` identify it,
//! - `price`, `quantity` are fixed-point decimals,
//! - `side` is bid or ask.

use rust_decimal::Decimal;

use crate::side::Side;

/// A single resting order as reported by the venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_id: String,
    pub market: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub side: Side,
    pub account_id: String,
}

/// A quote the engine wants the venue to rest.
///
/// Produced by combining the level pricer and the quantity model; it has
/// no identifier until the venue accepts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuote {
    /// Book level (0 = closest to the reference price).
    pub level: usize,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
}

/// Snapshot of the account's live orders split by side.
#[derive(Debug, Clone, Default)]
pub struct BookSnapshot {
    pub bids: Vec<Order>,
    pub asks: Vec<Order>,
}

impl BookSnapshot {
    /// Partition a flat list of orders into bids and asks.
    ///
    /// Orders for any other market or account are dropped: they are not
    /// ours to count or cancel.
    pub fn partition(orders: Vec<Order>, market: &str, account_id: &str) -> Self {
        let (bids, asks) = orders
            .into_iter()
            .filter(|o| o.market == market && o.account_id == account_id)
            .partition(|o| o.side == Side::Buy);
        BookSnapshot { bids, asks }
    }

    pub fn count(&self, side: Side) -> usize {
        match side {
            Side::Buy => self.bids.len(),
            Side::Sell => self.asks.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    /// Iterate over every order, bids first.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.bids.iter().chain(self.asks.iter())
    }
}

//! Error types for the core model.
//!
//! The model itself is infallible: every price, size, target and
//! cancellation decision is plain numeric computation. The only thing
//! that can go wrong is being handed a configuration that would break
//! the model's invariants, which `MarketConfig::validate` reports here.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("base_price must be positive, got {0}")]
    NonPositiveBasePrice(f64),

    #[error("volatility must be non-negative, got {0}")]
    NegativeVolatility(f64),

    #[error("min_order_count ({min}) exceeds max_order_count ({max})")]
    InvertedOrderCounts { min: usize, max: usize },

    #[error("base_quantity must be positive, got {0}")]
    NonPositiveBaseQuantity(f64),

    /// The 0.1 size floor would round to zero.
    #[error("quantity_decimals must be at least 1")]
    ZeroQuantityDecimals,

    #[error("{field} must be at most {max}, got {value}")]
    TooManyDecimals {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

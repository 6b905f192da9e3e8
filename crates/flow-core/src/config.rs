//! Static per-market configuration.
//!
//! Supplied once at startup and immutable for the process lifetime.
//! Defaults reproduce the reference market (`TATA_INR` around 194).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::numeric::MAX_DECIMALS;

/// Market shape parameters for the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Anchor the reference price mean-reverts to.
    pub base_price: f64,

    /// Per-cycle volatility coefficient for the price process.
    pub volatility: f64,

    /// Floor on resting orders per side; also the lower bound of the target.
    pub min_order_count: usize,

    /// Upper bound of the target resting-order count per side.
    pub max_order_count: usize,

    pub base_quantity: f64,

    /// Carried for parity with the reference market; the size model
    /// does not currently scale by it.
    pub quantity_volatility: f64,

    pub price_decimals: u32,
    pub quantity_decimals: u32,

    /// Minimum time between quantity-multiplier updates.
    pub quantity_update_interval_ms: u64,

    /// Minimum time between target-count resamples.
    pub order_count_update_interval_ms: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_price: 194.0,
            volatility: 0.002,
            min_order_count: 60,
            max_order_count: 100,
            base_quantity: 5.0,
            quantity_volatility: 0.8,
            price_decimals: 1,
            quantity_decimals: 2,
            quantity_update_interval_ms: 1_000,
            order_count_update_interval_ms: 3_000,
        }
    }
}

impl MarketConfig {
    /// Check every field the model's invariants depend on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_price > 0.0) {
            return Err(ConfigError::NonPositiveBasePrice(self.base_price));
        }
        if !(self.volatility >= 0.0) {
            return Err(ConfigError::NegativeVolatility(self.volatility));
        }
        if self.min_order_count > self.max_order_count {
            return Err(ConfigError::InvertedOrderCounts {
                min: self.min_order_count,
                max: self.max_order_count,
            });
        }
        if !(self.base_quantity > 0.0) {
            return Err(ConfigError::NonPositiveBaseQuantity(self.base_quantity));
        }
        if self.quantity_decimals == 0 {
            return Err(ConfigError::ZeroQuantityDecimals);
        }
        for (field, value) in [
            ("price_decimals", self.price_decimals),
            ("quantity_decimals", self.quantity_decimals),
        ] {
            if value > MAX_DECIMALS {
                return Err(ConfigError::TooManyDecimals {
                    field,
                    value,
                    max: MAX_DECIMALS,
                });
            }
        }
        if self.quantity_update_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("quantity_update_interval_ms"));
        }
        if self.order_count_update_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("order_count_update_interval_ms"));
        }
        Ok(())
    }

    pub fn quantity_update_interval(&self) -> Duration {
        Duration::from_millis(self.quantity_update_interval_ms)
    }

    pub fn order_count_update_interval(&self) -> Duration {
        Duration::from_millis(self.order_count_update_interval_ms)
    }
}

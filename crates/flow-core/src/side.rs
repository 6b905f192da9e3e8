//! Side (Buy / Sell) of a quote.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Order side: Buy or Sell.
///
/// On the wire this is the lowercase string `"buy"` / `"sell"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Direction away from the reference price: `-1` for bids, `+1` for asks.
    pub fn direction(self) -> f64 {
        match self {
            Side::Buy => -1.0,
            Side::Sell => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// Try to parse from the wire string (`"buy"` / `"sell"`, case-insensitive).
    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! flow-core
//!
//! Pure order-flow model for the synthetic liquidity engine:
//! - venue order snapshots and sides
//! - per-market configuration and mutable simulator state
//! - reference price process, size model, depth targets
//! - level pricing and the cancellation policy
//! - per-cycle planning that ties them together
//!
//! Nothing here performs I/O; every stochastic function takes the
//! caller's RNG so a fixed seed replays a run exactly.

pub mod side;
pub mod order;
pub mod config;
pub mod state;
pub mod error;
pub mod rng;
pub mod numeric;
pub mod price_process;
pub mod quantity;
pub mod depth_target;
pub mod price_level;
pub mod cancellation;
pub mod planner;

pub use side::Side;
pub use order::{BookSnapshot, NewQuote, Order};
pub use config::MarketConfig;
pub use state::{MarketState, Trend};
pub use error::ConfigError;
pub use rng::SimRng;
pub use cancellation::{CancelReason, CancellationPolicy};
pub use planner::CycleTargets;

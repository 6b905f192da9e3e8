//! flow-engine
//!
//! Synthetic order-flow reconciliation: keeps one market's book on a
//! venue populated with plausible, moving quotes by repeatedly comparing
//! the desired book with the account's resting orders.

pub mod config;
pub mod logging;
pub mod reconcile;
pub mod types;

pub use config::{EngineConfig, EngineConfigError, LoopTiming, VenueSettings};
pub use reconcile::ReconciliationLoop;
pub use types::{CycleError, CycleReport, LoopPhase, RunSummary};

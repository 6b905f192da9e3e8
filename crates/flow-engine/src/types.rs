//! Shared types for the reconciliation loop.
//!
//! This module defines:
//! - `LoopPhase`: the step a cycle was in
//! - `CycleError`: a failed cycle, tagged with its phase
//! - `CycleReport`: what a successful cycle did
//! - `RunSummary`: totals when the loop stops

use std::fmt;

use thiserror::Error;

use flow_core::Trend;
use flow_venue::VenueError;

/// Steps of one reconciliation cycle.
///
/// `ComputeTargets -> FetchLive -> Cancel -> Create -> Sleep`, with
/// `Backoff` reachable from any step that fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    ComputeTargets,
    FetchLive,
    Cancel,
    Create,
    Sleep,
    Backoff,
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoopPhase::ComputeTargets => "compute_targets",
            LoopPhase::FetchLive => "fetch_live",
            LoopPhase::Cancel => "cancel",
            LoopPhase::Create => "create",
            LoopPhase::Sleep => "sleep",
            LoopPhase::Backoff => "backoff",
        })
    }
}

#[derive(Debug, Error)]
#[error("{phase} failed: {source}")]
pub struct CycleError {
    pub phase: LoopPhase,
    #[source]
    pub source: VenueError,
}

impl CycleError {
    pub fn new(phase: LoopPhase, source: VenueError) -> Self {
        CycleError { phase, source }
    }
}

/// Outcome of one successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub reference_price: f64,
    pub trend: Trend,
    pub target_order_count: usize,
    pub live_bids: usize,
    pub live_asks: usize,
    pub cancelled: usize,
    pub cancel_failures: usize,
    pub created: usize,
    pub create_failures: usize,
}

/// Totals over the life of a `run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub failures: u64,
}

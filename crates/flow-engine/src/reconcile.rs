//! The reconciliation loop.
//!
//! This task owns the `MarketState` and the RNG and is the only thing
//! that mutates them. Each cycle:
//!
//! 1. advances trend, depth target, multiplier and reference price,
//! 2. lists the account's open orders and splits them by side,
//! 3. flags orders with the cancellation policy and cancels them as one
//!    concurrent batch,
//! 4. fills each side's shortfall against the target with new quotes,
//!    created as one concurrent batch. The shortfall is measured against
//!    the count listed in step 2, so orders cancelled this cycle are
//!    replaced on the next one,
//! 5. sleeps `cycle_base_ms + U(0, cycle_jitter_ms)`.
//!
//! Batches are best-effort: a failed call is logged and its siblings
//! still run. Only a batch in which *every* call failed fails the cycle.
//! A failed cycle waits `backoff_ms` and starts again from step 1; the
//! loop itself only stops on shutdown or after `max_cycles`.

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use flow_core::planner::{self, CycleTargets};
use flow_core::{
    rng, BookSnapshot, CancelReason, CancellationPolicy, MarketConfig, MarketState, NewQuote,
    Order, Side, SimRng,
};
use flow_venue::{CreateOrder, VenueClient, VenueError};

use crate::config::{EngineConfig, LoopTiming, VenueSettings};
use crate::types::{CycleError, CycleReport, LoopPhase, RunSummary};

/// Result of one concurrent batch of venue calls.
#[derive(Debug, Default)]
struct BatchOutcome {
    succeeded: usize,
    failed: usize,
    first_error: Option<VenueError>,
}

impl BatchOutcome {
    fn record<T>(&mut self, result: Result<T, VenueError>) {
        match result {
            Ok(_) => self.succeeded += 1,
            Err(e) => {
                self.failed += 1;
                if self.first_error.is_none() {
                    self.first_error = Some(e);
                }
            }
        }
    }

    /// `Err` only when the batch was non-empty and nothing got through.
    fn into_result(mut self, phase: LoopPhase) -> Result<Self, CycleError> {
        if self.succeeded == 0 {
            if let Some(e) = self.first_error.take() {
                return Err(CycleError::new(phase, e));
            }
        }
        Ok(self)
    }
}

pub struct ReconciliationLoop<V> {
    venue: V,
    settings: VenueSettings,
    market: MarketConfig,
    timing: LoopTiming,
    cancel_on_shutdown: bool,
    max_cycles: Option<u64>,
    state: MarketState,
    policy: CancellationPolicy,
    rng: SimRng,
}

impl<V: VenueClient> ReconciliationLoop<V> {
    /// Build a loop with fresh state; the update timers start at `now_ms`.
    pub fn new(venue: V, config: EngineConfig, now_ms: i64) -> Self {
        let rng = match config.seed {
            Some(seed) => rng::seeded(seed),
            None => rng::from_entropy(),
        };
        ReconciliationLoop {
            venue,
            state: MarketState::new(&config.market, now_ms),
            policy: CancellationPolicy::new(config.market.min_order_count),
            settings: config.venue,
            market: config.market,
            timing: config.timing,
            cancel_on_shutdown: config.cancel_on_shutdown,
            max_cycles: config.max_cycles,
            rng,
        }
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    pub fn venue(&self) -> &V {
        &self.venue
    }

    /// Run cycles until `shutdown` fires or `max_cycles` succeed.
    ///
    /// Never returns an error: every cycle failure is logged and retried.
    pub async fn run(&mut self, shutdown: CancellationToken) -> RunSummary {
        let mut summary = RunSummary::default();

        info!(
            market = %self.settings.market,
            account = %self.settings.account_id,
            base_price = self.market.base_price,
            min_orders = self.market.min_order_count,
            max_orders = self.market.max_order_count,
            quantity_interval_ms = self.market.quantity_update_interval().as_millis() as u64,
            count_interval_ms = self.market.order_count_update_interval().as_millis() as u64,
            "reconciliation loop starting"
        );

        while !shutdown.is_cancelled() {
            let now_ms = Utc::now().timestamp_millis();

            let wait = match self.run_cycle(now_ms).await {
                Ok(report) => {
                    summary.cycles += 1;
                    info!(
                        cycle = summary.cycles,
                        price = report.reference_price,
                        trend = %report.trend,
                        target = report.target_order_count,
                        bids = report.live_bids,
                        asks = report.live_asks,
                        cancelled = report.cancelled,
                        cancel_failures = report.cancel_failures,
                        created = report.created,
                        create_failures = report.create_failures,
                        "cycle complete"
                    );
                    if self.max_cycles.is_some_and(|max| summary.cycles >= max) {
                        break;
                    }
                    let delay = self.next_cycle_delay();
                    debug!(phase = %LoopPhase::Sleep, delay_ms = delay.as_millis() as u64, "sleeping");
                    delay
                }
                Err(e) => {
                    summary.failures += 1;
                    error!(
                        phase = %e.phase,
                        error = %e.source,
                        transient = e.source.is_transient(),
                        next = %LoopPhase::Backoff,
                        backoff_ms = self.timing.backoff_ms,
                        "reconciliation cycle failed"
                    );
                    self.timing.backoff()
                }
            };

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        if self.cancel_on_shutdown {
            self.cancel_all().await;
        }

        info!(cycles = summary.cycles, failures = summary.failures, "reconciliation loop stopped");
        summary
    }

    /// One full COMPUTE_TARGETS -> FETCH_LIVE -> CANCEL -> CREATE pass.
    pub async fn run_cycle(&mut self, now_ms: i64) -> Result<CycleReport, CycleError> {
        let targets = planner::advance(&mut self.state, &self.market, now_ms, &mut self.rng);
        self.log_targets(&targets);

        let live = self
            .venue
            .list_open_orders(&self.settings.account_id, &self.settings.market)
            .await
            .map_err(|e| CycleError::new(LoopPhase::FetchLive, e))?;
        let snapshot =
            BookSnapshot::partition(live, &self.settings.market, &self.settings.account_id);

        let flagged = planner::select_cancels(
            &snapshot,
            &self.policy,
            targets.reference_price,
            targets.target_order_count,
            targets.trend,
            &mut self.rng,
        );
        let cancels = self.cancel_batch(&flagged).await.into_result(LoopPhase::Cancel)?;

        let bid_shortfall =
            planner::shortfall(targets.target_order_count, snapshot.count(Side::Buy));
        let ask_shortfall =
            planner::shortfall(targets.target_order_count, snapshot.count(Side::Sell));
        let quotes = planner::build_quotes(
            targets.reference_price,
            bid_shortfall,
            ask_shortfall,
            &self.state,
            &self.market,
            now_ms,
            &mut self.rng,
        );
        let creates = self.create_batch(&quotes).await.into_result(LoopPhase::Create)?;

        Ok(CycleReport {
            reference_price: targets.reference_price,
            trend: targets.trend,
            target_order_count: targets.target_order_count,
            live_bids: snapshot.count(Side::Buy),
            live_asks: snapshot.count(Side::Sell),
            cancelled: cancels.succeeded,
            cancel_failures: cancels.failed,
            created: creates.succeeded,
            create_failures: creates.failed,
        })
    }

    fn log_targets(&self, targets: &CycleTargets) {
        if targets.trend_switched {
            info!(trend = %targets.trend, "trend regime redrawn");
        }
        debug!(
            phase = %LoopPhase::ComputeTargets,
            price = targets.reference_price,
            target = targets.target_order_count,
            multiplier = self.state.quantity_multiplier,
            multiplier_updated = targets.updates.multiplier_updated,
            target_updated = targets.updates.target_updated,
            history_range = ?self.state.price_range(),
            "targets computed"
        );
    }

    fn next_cycle_delay(&mut self) -> Duration {
        let jitter = self.rng.gen_range(0..=self.timing.cycle_jitter_ms);
        Duration::from_millis(self.timing.cycle_base_ms.saturating_add(jitter))
    }

    async fn cancel_batch(&self, flagged: &[(Order, CancelReason)]) -> BatchOutcome {
        let market = &self.settings.market;
        let results = join_all(
            flagged
                .iter()
                .map(|(order, _)| self.venue.cancel_order(&order.order_id, market)),
        )
        .await;

        let mut outcome = BatchOutcome::default();
        for ((order, reason), result) in flagged.iter().zip(results) {
            match &result {
                Ok(_) => debug!(order_id = %order.order_id, side = %order.side, %reason, "cancelled"),
                Err(e) => warn!(
                    order_id = %order.order_id,
                    side = %order.side,
                    %reason,
                    error = %e,
                    "cancel failed"
                ),
            }
            outcome.record(result);
        }
        outcome
    }

    async fn create_batch(&self, quotes: &[NewQuote]) -> BatchOutcome {
        let requests: Vec<CreateOrder> = quotes
            .iter()
            .map(|q| CreateOrder {
                market: self.settings.market.clone(),
                price: q.price,
                quantity: q.quantity,
                side: q.side,
                account_id: self.settings.account_id.clone(),
            })
            .collect();

        let results = join_all(requests.iter().map(|r| self.venue.create_order(r))).await;

        let mut outcome = BatchOutcome::default();
        for (quote, result) in quotes.iter().zip(results) {
            if let Err(e) = &result {
                warn!(
                    side = %quote.side,
                    level = quote.level,
                    price = %quote.price,
                    quantity = %quote.quantity,
                    error = %e,
                    "create failed"
                );
            }
            outcome.record(result);
        }
        outcome
    }

    /// Best-effort cancel of every open order of the account in the market.
    async fn cancel_all(&self) {
        let live = match self
            .venue
            .list_open_orders(&self.settings.account_id, &self.settings.market)
            .await
        {
            Ok(live) => live,
            Err(e) => {
                warn!(error = %e, "could not list orders for shutdown cancel");
                return;
            }
        };

        let snapshot =
            BookSnapshot::partition(live, &self.settings.market, &self.settings.account_id);
        let flagged: Vec<(Order, CancelReason)> = snapshot
            .iter()
            .map(|o| (o.clone(), CancelReason::Shutdown))
            .collect();
        let outcome = self.cancel_batch(&flagged).await;
        info!(
            cancelled = outcome.succeeded,
            failed = outcome.failed,
            "cancelled resting orders on shutdown"
        );
    }
}

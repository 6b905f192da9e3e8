//! In-process venue.
//!
//! Keeps resting orders in memory and answers the three venue calls
//! immediately. Used for `--dry-run` and as the test double for the
//! reconciliation loop, so it also supports failure injection:
//! - `fail_next_lists(n)`: the next `n` list calls return a 503,
//! - `reject_creates(side)`: creates on that side are rejected,
//! - `reject_all_cancels(true)`: every cancel is rejected.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use flow_core::{Order, Side};

use crate::client::{CancelAck, CreateOrder, VenueClient};
use crate::error::VenueError;

#[derive(Debug, Default)]
struct Inner {
    /// Resting orders in arrival order.
    orders: Vec<Order>,
    rejected_create_sides: HashSet<Side>,
    list_call_times: Vec<Instant>,
}

#[derive(Debug, Default)]
pub struct InMemoryVenue {
    inner: Mutex<Inner>,
    next_order_id: AtomicU64,
    failing_lists: AtomicUsize,
    reject_cancels: AtomicBool,
    create_calls: AtomicUsize,
    cancel_calls: AtomicUsize,
}

impl InMemoryVenue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rest an order directly, bypassing failure injection.
    pub async fn seed_order(&self, order: Order) {
        self.inner.lock().await.orders.push(order);
    }

    /// Snapshot of everything resting, in arrival order.
    pub async fn open_orders(&self) -> Vec<Order> {
        self.inner.lock().await.orders.clone()
    }

    pub async fn count(&self, side: Side) -> usize {
        self.inner
            .lock()
            .await
            .orders
            .iter()
            .filter(|o| o.side == side)
            .count()
    }

    pub fn fail_next_lists(&self, n: usize) {
        self.failing_lists.store(n, Ordering::SeqCst);
    }

    pub async fn reject_creates(&self, side: Side) {
        self.inner.lock().await.rejected_create_sides.insert(side);
    }

    pub fn reject_all_cancels(&self, reject: bool) {
        self.reject_cancels.store(reject, Ordering::SeqCst);
    }

    /// When each list call arrived, failed ones included.
    pub async fn list_call_times(&self) -> Vec<Instant> {
        self.inner.lock().await.list_call_times.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn cancel_calls(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    fn next_id(&self) -> String {
        let id = self.next_order_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("mem-{id}")
    }

    /// Consume one injected list failure, if any are pending.
    fn take_list_failure(&self) -> bool {
        self.failing_lists
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl VenueClient for InMemoryVenue {
    async fn list_open_orders(
        &self,
        account_id: &str,
        market: &str,
    ) -> Result<Vec<Order>, VenueError> {
        let mut inner = self.inner.lock().await;
        inner.list_call_times.push(Instant::now());

        if self.take_list_failure() {
            return Err(VenueError::Status {
                status: 503,
                body: "injected list failure".to_string(),
            });
        }

        Ok(inner
            .orders
            .iter()
            .filter(|o| o.account_id == account_id && o.market == market)
            .cloned()
            .collect())
    }

    async fn create_order(&self, request: &CreateOrder) -> Result<Order, VenueError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().await;

        if inner.rejected_create_sides.contains(&request.side) {
            return Err(VenueError::Rejected(format!(
                "{} orders are not accepted",
                request.side
            )));
        }

        let order = Order {
            order_id: self.next_id(),
            market: request.market.clone(),
            price: request.price,
            quantity: request.quantity,
            side: request.side,
            account_id: request.account_id.clone(),
        };
        inner.orders.push(order.clone());
        Ok(order)
    }

    async fn cancel_order(&self, order_id: &str, market: &str) -> Result<CancelAck, VenueError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_cancels.load(Ordering::SeqCst) {
            return Err(VenueError::Rejected(format!("cancel of {order_id} refused")));
        }

        let mut inner = self.inner.lock().await;
        let before = inner.orders.len();
        inner
            .orders
            .retain(|o| !(o.order_id == order_id && o.market == market));

        if inner.orders.len() == before {
            return Err(VenueError::Rejected(format!("unknown order {order_id}")));
        }
        Ok(CancelAck {
            order_id: order_id.to_string(),
        })
    }
}

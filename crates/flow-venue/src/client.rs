//! The venue seam.
//!
//! The engine only needs three operations from a venue. Anything that
//! can list, create and cancel orders for one account can sit behind
//! this trait: the REST client in production, the in-memory venue for
//! dry runs and tests.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use flow_core::{Order, Side};

use crate::error::VenueError;

/// A new order to rest on the venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    pub market: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub side: Side,
    pub account_id: String,
}

/// Venue acknowledgement of a cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelAck {
    pub order_id: String,
}

#[async_trait]
pub trait VenueClient: Send + Sync {
    /// Every open order of `account_id` in `market`.
    async fn list_open_orders(&self, account_id: &str, market: &str)
        -> Result<Vec<Order>, VenueError>;

    /// Rest a new order and return it with its venue-assigned id.
    async fn create_order(&self, request: &CreateOrder) -> Result<Order, VenueError>;

    async fn cancel_order(&self, order_id: &str, market: &str) -> Result<CancelAck, VenueError>;
}

#[async_trait]
impl<T: VenueClient + ?Sized> VenueClient for Arc<T> {
    async fn list_open_orders(
        &self,
        account_id: &str,
        market: &str,
    ) -> Result<Vec<Order>, VenueError> {
        (**self).list_open_orders(account_id, market).await
    }

    async fn create_order(&self, request: &CreateOrder) -> Result<Order, VenueError> {
        (**self).create_order(request).await
    }

    async fn cancel_order(&self, order_id: &str, market: &str) -> Result<CancelAck, VenueError> {
        (**self).cancel_order(order_id, market).await
    }
}

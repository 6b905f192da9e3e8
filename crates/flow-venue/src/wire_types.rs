//! JSON bodies exchanged with the venue's REST order API.
//!
//! Prices and quantities leave the engine as decimal strings so no
//! binary float ever crosses the boundary. On the way in either a JSON
//! string or a JSON number is accepted.
//!
//! Endpoints (relative to the configured base URL):
//! - `GET    /api/v1/order/open?userId=..&market=..` -> `[WireOrder]`
//! - `POST   /api/v1/order` with `CreateOrderBody` -> `CreateOrderReply`
//! - `DELETE /api/v1/order` with `CancelOrderBody`

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use flow_core::{Order, Side};

use crate::error::VenueError;

pub const OPEN_ORDERS_PATH: &str = "/api/v1/order/open";
pub const ORDER_PATH: &str = "/api/v1/order";

/// Open order as listed by the venue.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrder {
    pub order_id: String,
    pub market: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub side: String,
    #[serde(alias = "accountId")]
    pub user_id: String,
}

impl WireOrder {
    pub fn into_order(self) -> Result<Order, VenueError> {
        let side = Side::from_wire(&self.side)
            .ok_or_else(|| VenueError::Decode(format!("unknown side {:?}", self.side)))?;
        Ok(Order {
            order_id: self.order_id,
            market: self.market,
            price: self.price,
            quantity: self.quantity,
            side,
            account_id: self.user_id,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody<'a> {
    pub market: &'a str,
    pub price: String,
    pub quantity: String,
    pub side: Side,
    pub user_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderReply {
    pub order_id: String,
    #[serde(default)]
    pub executed_qty: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderBody<'a> {
    pub order_id: &'a str,
    pub market: &'a str,
}

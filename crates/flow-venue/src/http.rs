//! REST implementation of [`VenueClient`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use flow_core::Order;

use crate::client::{CancelAck, CreateOrder, VenueClient};
use crate::error::VenueError;
use crate::wire_types::{
    CancelOrderBody, CreateOrderBody, CreateOrderReply, WireOrder, OPEN_ORDERS_PATH, ORDER_PATH,
};

#[derive(Debug, Clone)]
pub struct HttpVenueClient {
    client: Client,
    base_url: String,
}

impl HttpVenueClient {
    /// Build a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, VenueError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Read the body, map non-2xx to `Status`, then decode.
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, VenueError> {
    let text = read_checked(response).await?;
    Ok(serde_json::from_str(&text)?)
}

async fn read_checked(response: Response) -> Result<String, VenueError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(VenueError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}

#[async_trait]
impl VenueClient for HttpVenueClient {
    async fn list_open_orders(
        &self,
        account_id: &str,
        market: &str,
    ) -> Result<Vec<Order>, VenueError> {
        let response = self
            .client
            .get(self.url(OPEN_ORDERS_PATH))
            .query(&[("userId", account_id), ("market", market)])
            .send()
            .await?;

        let wire: Vec<WireOrder> = parse_response(response).await?;
        debug!(count = wire.len(), market, "listed open orders");
        wire.into_iter().map(WireOrder::into_order).collect()
    }

    async fn create_order(&self, request: &CreateOrder) -> Result<Order, VenueError> {
        let body = CreateOrderBody {
            market: &request.market,
            price: request.price.to_string(),
            quantity: request.quantity.to_string(),
            side: request.side,
            user_id: &request.account_id,
        };
        let response = self
            .client
            .post(self.url(ORDER_PATH))
            .json(&body)
            .send()
            .await?;

        let reply: CreateOrderReply = parse_response(response).await?;
        Ok(Order {
            order_id: reply.order_id,
            market: request.market.clone(),
            price: request.price,
            quantity: request.quantity,
            side: request.side,
            account_id: request.account_id.clone(),
        })
    }

    async fn cancel_order(&self, order_id: &str, market: &str) -> Result<CancelAck, VenueError> {
        let response = self
            .client
            .delete(self.url(ORDER_PATH))
            .json(&CancelOrderBody { order_id, market })
            .send()
            .await?;

        // The body is informational only; the status is the ack.
        read_checked(response).await?;
        Ok(CancelAck {
            order_id: order_id.to_string(),
        })
    }
}

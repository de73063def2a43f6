//! Order operations, including the single long-poll call the tracker loops
//! over.

use reqwest::Method;

use crate::error::{ClientError, Result};

use super::types::{NewOrder, Order, OrderStatus, TrackResponse};
use super::ApiClient;

impl ApiClient {
    pub async fn create_order(&self, order: NewOrder) -> Result<Order> {
        if order.delivery_address.trim().is_empty() {
            return Err(ClientError::Validation(
                "delivery address is required".to_string(),
            ));
        }
        if order.total_amount <= 0.0 {
            return Err(ClientError::Validation(
                "total amount must be positive".to_string(),
            ));
        }
        if order.items.iter().all(|item| item.trim().is_empty()) {
            return Err(ClientError::Validation(
                "at least one item is required".to_string(),
            ));
        }

        let body = serde_json::to_value(&order)?;
        let envelope = self.request(Method::POST, "/orders", Some(&body)).await?;
        Self::expect_data(envelope)
    }

    pub async fn order(&self, order_id: i64) -> Result<Order> {
        let envelope = self
            .request(Method::GET, &format!("/orders/{order_id}"), None)
            .await?;
        Self::expect_data(envelope)
    }

    pub async fn all_orders(&self) -> Result<Vec<Order>> {
        let envelope = self.request(Method::GET, "/orders/all", None).await?;
        Self::expect_data(envelope)
    }

    pub async fn customer_orders(&self, customer_id: i64) -> Result<Vec<Order>> {
        let envelope = self
            .request(Method::GET, &format!("/orders/customer/{customer_id}"), None)
            .await?;
        Self::expect_data(envelope)
    }

    /// One long-poll iteration. The server holds the request until the
    /// status moves past `last_status` or `timeout_secs` elapses; either way
    /// it answers with the current order.
    pub async fn track_once(
        &self,
        order_id: i64,
        last_status: Option<OrderStatus>,
        timeout_secs: u64,
    ) -> Result<TrackResponse> {
        let path = match last_status {
            Some(status) => format!(
                "/orders/{order_id}/track?last_status={}&timeout={timeout_secs}",
                status.as_str()
            ),
            None => format!("/orders/{order_id}/track?timeout={timeout_secs}"),
        };
        let envelope = self.request(Method::GET, &path, None).await?;
        let has_update = envelope.has_update.unwrap_or(true);
        let order: Order = Self::expect_data(envelope)?;
        Ok(TrackResponse { order, has_update })
    }

    pub async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<Order> {
        let body = serde_json::json!({ "status": status });
        let envelope = self
            .request(Method::PUT, &format!("/orders/{order_id}/status"), Some(&body))
            .await?;
        Self::expect_data(envelope)
    }
}

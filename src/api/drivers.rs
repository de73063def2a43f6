//! Driver-side reporting and the customer-facing location snapshot. The
//! simulated random walk that feeds these endpoints lives with the test
//! fixtures, not here.

use reqwest::Method;
use serde_json::json;

use crate::error::{ClientError, Result};

use super::types::DriverLocation;
use super::ApiClient;

impl ApiClient {
    pub async fn post_driver_location(
        &self,
        driver_id: i64,
        latitude: f64,
        longitude: f64,
        order_id: Option<i64>,
    ) -> Result<()> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ClientError::Validation(
                "coordinates out of range".to_string(),
            ));
        }
        let mut body = json!({ "latitude": latitude, "longitude": longitude });
        if let Some(order_id) = order_id {
            body["order_id"] = json!(order_id);
        }
        self.request(
            Method::POST,
            &format!("/drivers/{driver_id}/location"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    pub async fn set_driver_online(
        &self,
        driver_id: i64,
        is_online: bool,
        current_order_id: Option<i64>,
    ) -> Result<()> {
        let mut body = json!({ "is_online": is_online });
        if let Some(order_id) = current_order_id {
            body["current_order_id"] = json!(order_id);
        }
        self.request(
            Method::POST,
            &format!("/drivers/{driver_id}/online"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    /// Last known driver position for an order, the non-streaming variant of
    /// the location topic.
    pub async fn driver_location(
        &self,
        order_id: i64,
        customer_id: i64,
    ) -> Result<DriverLocation> {
        let envelope = self
            .request(
                Method::GET,
                &format!("/tracking/order/{order_id}/location?customer_id={customer_id}"),
                None,
            )
            .await?;
        Self::expect_data(envelope)
    }
}

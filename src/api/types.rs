//! Wire types for the REST surface.

use serde::{Deserialize, Serialize};

use crate::session::{Role, UserProfile};

/// The backend's response envelope. Most endpoints nest their payload under
/// `data`; the announcement and driver endpoints put it beside the flag
/// instead, so those keys are carried too and extracted per call site.
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub announcement: Option<serde_json::Value>,
    #[serde(default)]
    pub announcements: Option<serde_json::Value>,
    #[serde(default)]
    pub driver: Option<serde_json::Value>,
    #[serde(default)]
    pub has_update: Option<bool>,
}

impl Envelope {
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "request failed".to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// `data` payload of login/register.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

/// `data` payload of the refresh endpoint: the new access credential only.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshPayload {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Confirmed,
    Preparing,
    Ready,
    PickedUp,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses end tracking: no further transitions are expected.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub restaurant_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub customer_id: i64,
    pub items: Vec<String>,
    pub delivery_address: String,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

/// One long-poll response: the current order plus whether the server saw a
/// change during the hold window.
#[derive(Debug, Clone)]
pub struct TrackResponse {
    pub order: Order,
    pub has_update: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAnnouncement {
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// Driver coordinates as the tracking endpoints emit them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriverLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub driver_id: Option<i64>,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Canonical record for the global order feed. The feed publishes `order_id`
/// where the REST surface says `id`; normalization happens at ingestion
/// (`stream::topics`), so consumers only ever see this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderNotice {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub delivery_address: Option<String>,
    pub total_amount: Option<f64>,
    pub restaurant_name: Option<String>,
    pub created_at: Option<String>,
    pub items: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PickedUp).unwrap(),
            "\"picked_up\""
        );
        let status: OrderStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert!(status.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn order_parses_with_sparse_fields() {
        let order: Order =
            serde_json::from_str(r#"{"id":3,"customer_id":9,"status":"confirmed"}"#).unwrap();
        assert_eq!(order.id, 3);
        assert!(order.items.is_empty());
        assert_eq!(order.total_amount, None);
    }

    #[test]
    fn envelope_failure_message_prefers_message_field() {
        let env: Envelope =
            serde_json::from_str(r#"{"success":false,"message":"nope","error":"code"}"#).unwrap();
        assert_eq!(env.failure_message(), "nope");

        let env: Envelope =
            serde_json::from_str(r#"{"success":false,"error":"order_not_found"}"#).unwrap();
        assert_eq!(env.failure_message(), "order_not_found");
    }

    #[test]
    fn announcement_priority_defaults_to_normal() {
        let ann: Announcement =
            serde_json::from_str(r#"{"id":1,"title":"t","message":"m"}"#).unwrap();
        assert_eq!(ann.priority, Priority::Normal);
        assert!(ann.is_active);
    }
}

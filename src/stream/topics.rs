//! Per-topic payload normalization, the single place where server payload
//! variants are mapped to canonical records. Each rule is applied once per
//! message, never recursively; payloads that still don't conform are skipped
//! with a warning.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::api::types::{Announcement, DriverLocation, OrderNotice, OrderStatus};

/// Announcement stream: the broadcast path wraps the record as
/// `{"announcement": {...}}`, the replay path sends it bare, and a
/// `{"type":"connected"}` greeting may arrive first.
pub(crate) fn decode_announcement(data: &str) -> Option<Announcement> {
    let value: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(e) => {
            warn!("announcement stream sent non-JSON payload: {}", e);
            return None;
        }
    };

    let value = match value.get("announcement") {
        Some(inner) => inner.clone(),
        None => value,
    };

    if value.get("type").and_then(Value::as_str) == Some("connected") {
        return None;
    }

    match serde_json::from_value(value) {
        Ok(announcement) => Some(announcement),
        Err(e) => {
            warn!("skipping malformed announcement payload: {}", e);
            None
        }
    }
}

#[derive(Deserialize)]
struct RawOrderNotice {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    order_id: Option<i64>,
    #[serde(default)]
    customer_id: Option<i64>,
    #[serde(default)]
    status: Option<OrderStatus>,
    #[serde(default)]
    delivery_address: Option<String>,
    #[serde(default)]
    total_amount: Option<f64>,
    #[serde(default)]
    restaurant_name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    items: Vec<String>,
}

/// Global order feed: the feed publishes `order_id`, older payloads say
/// `id`. Either works; neither is a skip.
pub(crate) fn decode_order_notice(data: &str) -> Option<OrderNotice> {
    let raw: RawOrderNotice = match serde_json::from_str(data) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("skipping malformed order notice: {}", e);
            return None;
        }
    };

    let Some(id) = raw.id.or(raw.order_id) else {
        warn!("order notice carried neither id nor order_id, skipping");
        return None;
    };

    Some(OrderNotice {
        id,
        customer_id: raw.customer_id,
        status: raw.status,
        delivery_address: raw.delivery_address,
        total_amount: raw.total_amount,
        restaurant_name: raw.restaurant_name,
        created_at: raw.created_at,
        items: raw.items,
    })
}

/// Per-order location stream: plain coordinate records.
pub(crate) fn decode_location(data: &str) -> Option<DriverLocation> {
    match serde_json::from_str(data) {
        Ok(location) => Some(location),
        Err(e) => {
            warn!("skipping malformed location payload: {}", e);
            None
        }
    }
}

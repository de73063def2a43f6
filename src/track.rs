//! Per-order long-poll tracking.
//!
//! One spawned loop per tracked order, handing updates to the caller through
//! a channel. Iterations are strictly sequential: the next request goes out
//! only after the previous response was processed and the cooldown elapsed.
//! The loop ends on a terminal status, on the first error, or when the
//! caller drops the receiver.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info};

use crate::api::types::{Order, OrderStatus};
use crate::api::ApiClient;

#[derive(Debug, Clone)]
pub enum TrackUpdate {
    /// A non-terminal status observation.
    Status(Order),
    /// Terminal status reached; no further requests are issued.
    Completed(Order),
    /// Transport or parse failure; tracking stops without retrying.
    Failed(String),
}

pub struct OrderTracker {
    order_id: i64,
    updates: mpsc::Receiver<TrackUpdate>,
}

impl OrderTracker {
    pub fn order_id(&self) -> i64 {
        self.order_id
    }

    /// Next update, or `None` once the loop has ended and drained.
    pub async fn next(&mut self) -> Option<TrackUpdate> {
        self.updates.recv().await
    }

    pub fn into_stream(self) -> ReceiverStream<TrackUpdate> {
        ReceiverStream::new(self.updates)
    }
}

/// Start tracking an order. `initial_status` is the last status the caller
/// already knows; omitting it makes the first iteration return immediately
/// with the current one.
pub fn track_order(
    client: &ApiClient,
    order_id: i64,
    initial_status: Option<OrderStatus>,
) -> OrderTracker {
    let (tx, rx) = mpsc::channel(8);
    let client = client.clone();
    let timeout_secs = client.config().track_timeout_secs;
    let cooldown = client.config().track_cooldown;

    tokio::spawn(async move {
        let mut last_status = initial_status;
        info!("tracking order {}", order_id);

        loop {
            match client.track_once(order_id, last_status, timeout_secs).await {
                Ok(response) => {
                    let status = response.order.status;
                    last_status = Some(status);

                    if status.is_terminal() {
                        info!("order {} reached terminal status {}", order_id, status);
                        let _ = tx.send(TrackUpdate::Completed(response.order)).await;
                        break;
                    }

                    if tx.send(TrackUpdate::Status(response.order)).await.is_err() {
                        debug!("tracker for order {} dropped, stopping", order_id);
                        break;
                    }
                }
                Err(e) => {
                    error!("tracking order {} failed: {}", order_id, e);
                    let _ = tx.send(TrackUpdate::Failed(e.to_string())).await;
                    break;
                }
            }

            tokio::time::sleep(cooldown).await;
        }
    });

    OrderTracker {
        order_id,
        updates: rx,
    }
}

//! Typed Server-Sent-Events subscriptions.
//!
//! One persistent push connection per topic. Events are decoded and
//! normalized at ingestion, then delivered through a channel in transport
//! order. A dropped connection is reported through the liveness watch and is
//! not reconnected here; resubscribing is the caller's decision.

mod sse;
mod topics;

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::api::types::{Announcement, DriverLocation, OrderNotice};
use crate::config::ClientConfig;
use sse::{SseDecoder, SseEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    /// The transport failed or the server ended the stream.
    ClosedError,
    /// The subscription was closed from this side.
    ClosedIntentional,
}

/// Opens push connections against the backend's stream endpoints.
#[derive(Clone)]
pub struct StreamSubscriber {
    http: reqwest::Client,
    config: ClientConfig,
}

impl StreamSubscriber {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Restaurant announcements, replay-then-live.
    pub fn announcements(&self) -> Subscription<Announcement> {
        self.subscribe(
            self.config.endpoint("/announcements/stream"),
            "announcements",
            topics::decode_announcement,
        )
    }

    /// Global feed of newly created orders (employee dashboard).
    pub fn order_feed(&self) -> Subscription<OrderNotice> {
        self.subscribe(
            self.config.endpoint("/orders/stream"),
            "orders",
            topics::decode_order_notice,
        )
    }

    /// Driver coordinates for one order.
    pub fn order_location(&self, order_id: i64, customer_id: i64) -> Subscription<DriverLocation> {
        self.subscribe(
            self.config.endpoint(&format!(
                "/tracking/order/{order_id}/stream?customer_id={customer_id}"
            )),
            "location",
            topics::decode_location,
        )
    }

    fn subscribe<T: Send + 'static>(
        &self,
        url: String,
        topic: &'static str,
        decode: fn(&str) -> Option<T>,
    ) -> Subscription<T> {
        let (tx, rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let state_tx = Arc::new(state_tx);
        let last_event_id = Arc::new(Mutex::new(None));

        let http = self.http.clone();
        let task_state = state_tx.clone();
        let task_last_id = last_event_id.clone();

        let task = tokio::spawn(async move {
            let response = match http.get(&url).send().await {
                Ok(response) if response.status().is_success() => response,
                Ok(response) => {
                    error!("stream {} refused: HTTP {}", topic, response.status());
                    task_state.send_replace(ConnectionState::ClosedError);
                    return;
                }
                Err(e) => {
                    error!("stream {} failed to connect: {}", topic, e);
                    task_state.send_replace(ConnectionState::ClosedError);
                    return;
                }
            };

            info!("stream {} open", topic);
            task_state.send_replace(ConnectionState::Open);

            let events = sse_events(response);
            futures::pin_mut!(events);

            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        error!("stream {} transport error: {}", topic, e);
                        task_state.send_replace(ConnectionState::ClosedError);
                        return;
                    }
                };

                if let Some(id) = &event.id {
                    *task_last_id.lock().expect("last-id lock poisoned") = Some(id.clone());
                }
                // server heartbeat events carry no payload worth dispatching
                if event.event.as_deref() == Some("ping") {
                    continue;
                }

                if let Some(item) = decode(&event.data) {
                    if tx.send(item).await.is_err() {
                        debug!("stream {} receiver dropped, closing", topic);
                        task_state.send_replace(ConnectionState::ClosedIntentional);
                        return;
                    }
                }
            }

            // orderly end-of-stream still means the push channel is gone
            info!("stream {} ended", topic);
            task_state.send_replace(ConnectionState::ClosedError);
        });

        Subscription {
            topic,
            events: rx,
            state_rx,
            state_tx,
            last_event_id,
            task,
            closed: false,
        }
    }
}

fn sse_events(
    response: reqwest::Response,
) -> impl futures::Stream<Item = Result<SseEvent, reqwest::Error>> {
    async_stream::stream! {
        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(chunk) => {
                    for event in decoder.feed(&chunk) {
                        yield Ok(event);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    }
}

/// Handle to one open topic connection. Events arrive in transport order;
/// dropping or closing the handle tears the connection down.
pub struct Subscription<T> {
    topic: &'static str,
    events: mpsc::Receiver<T>,
    state_rx: watch::Receiver<ConnectionState>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    last_event_id: Arc<Mutex<Option<String>>>,
    task: JoinHandle<()>,
    closed: bool,
}

impl<T> Subscription<T> {
    pub fn topic(&self) -> &'static str {
        self.topic
    }

    /// Next decoded event, or `None` once the connection is gone and the
    /// channel has drained.
    pub async fn next(&mut self) -> Option<T> {
        self.events.recv().await
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// A watch for liveness-badge style UI: changes on open/close.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Last SSE event id seen on this connection, if the server sent any.
    /// Best-effort resume bookkeeping only.
    pub fn last_event_id(&self) -> Option<String> {
        self.last_event_id.lock().expect("last-id lock poisoned").clone()
    }

    /// Close the connection. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.task.abort();
        let already_closed = matches!(
            *self.state_rx.borrow(),
            ConnectionState::ClosedError | ConnectionState::ClosedIntentional
        );
        if !already_closed {
            self.state_tx.send_replace(ConnectionState::ClosedIntentional);
        }
        debug!("stream {} closed", self.topic);
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.close();
    }
}

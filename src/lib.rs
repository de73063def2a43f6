//! Client library for the FoodFast delivery backend.
//!
//! Four independent pieces, composed by the consumer:
//!
//! - [`api::ApiClient`] — authenticated REST calls with transparent
//!   one-shot credential refresh
//! - [`track`] — per-order long-polling until a terminal status
//! - [`stream`] — typed Server-Sent-Events subscriptions (announcements,
//!   order feed, driver location)
//! - [`chat`] — bidirectional support-chat channel with typing presence

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod session;
pub mod stream;
pub mod track;

pub use api::ApiClient;
pub use chat::ChatClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use session::{Session, SessionHandle, SessionStore};

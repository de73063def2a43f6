//! Typing-indicator debounce: "typing started" fires at most once per idle
//! period, "typing stopped" fires after the idle window passes with no
//! further input. Advisory broadcasts only, outside message ordering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{ClientError, Result};

use super::types::ClientEvent;

pub(crate) struct TypingTracker {
    outgoing: mpsc::Sender<ClientEvent>,
    idle: Duration,
    user: String,
    active: Arc<AtomicBool>,
    stop_task: Option<JoinHandle<()>>,
}

impl TypingTracker {
    pub fn new(outgoing: mpsc::Sender<ClientEvent>, idle: Duration, user: String) -> Self {
        Self {
            outgoing,
            idle,
            user,
            active: Arc::new(AtomicBool::new(false)),
            stop_task: None,
        }
    }

    /// Record one keystroke's worth of activity. Emits the start broadcast
    /// on the idle-to-typing edge and (re)arms the stop timer.
    pub async fn note_input(&mut self, chat_id: i64) -> Result<()> {
        if !self.active.swap(true, Ordering::SeqCst) {
            self.outgoing
                .send(ClientEvent::Typing {
                    chat_id,
                    user: self.user.clone(),
                    is_typing: true,
                })
                .await
                .map_err(|_| ClientError::Closed)?;
        }

        if let Some(task) = self.stop_task.take() {
            task.abort();
        }

        let outgoing = self.outgoing.clone();
        let active = self.active.clone();
        let user = self.user.clone();
        let idle = self.idle;
        self.stop_task = Some(tokio::spawn(async move {
            tokio::time::sleep(idle).await;
            active.store(false, Ordering::SeqCst);
            let _ = outgoing
                .send(ClientEvent::Typing {
                    chat_id,
                    user,
                    is_typing: false,
                })
                .await;
        }));

        Ok(())
    }

    /// Forget any pending indicator, e.g. when switching chats.
    pub fn reset(&mut self) {
        if let Some(task) = self.stop_task.take() {
            task.abort();
        }
        self.active.store(false, Ordering::SeqCst);
    }
}

impl Drop for TypingTracker {
    fn drop(&mut self) {
        self.reset();
    }
}

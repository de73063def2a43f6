//! Bidirectional support-chat channel.
//!
//! One WebSocket connection per client, split into a writer task fed by a
//! channel and a reader task that forwards parsed server events. The caller
//! drives [`ChatClient::next_event`]; each event updates the client's view
//! of the conversation (log, roster, typing peers) before it is returned, so
//! handler execution for event N always completes before N+1 is seen.

pub mod types;
mod typing;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{Role, SessionHandle};

use types::{ChatMessage, ChatSummary, ClientEvent, ServerEvent};
use typing::TypingTracker;

/// What the conversation just did, surfaced after the client's own state has
/// been updated.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Server greeting received.
    Connected,
    /// Customer handshake completed: chat id assigned, log replaced with the
    /// history snapshot.
    SessionReady { chat_id: i64 },
    /// Employee roster refreshed.
    RosterUpdated(Vec<ChatSummary>),
    /// A chat was opened by explicit selection; log replaced.
    ChatOpened { chat_id: i64 },
    /// A message was appended to the active log.
    MessageReceived(ChatMessage),
    /// Server acknowledged one of our sends.
    MessageDelivered { chat_id: i64, message_id: i64 },
    /// A customer opened a brand-new chat (employee side).
    NewChat { chat_id: i64, customer: String },
    /// The set of peers currently typing changed.
    TypingChanged(Vec<String>),
    /// The channel is gone; no more events will follow.
    Disconnected,
}

pub struct ChatClient {
    role: Role,
    user: String,
    chat_id: Option<i64>,
    log: Vec<ChatMessage>,
    roster: Vec<ChatSummary>,
    typing_peers: Vec<String>,
    draft: String,
    connected: Arc<AtomicBool>,
    events: mpsc::Receiver<ServerEvent>,
    outgoing: mpsc::Sender<ClientEvent>,
    typing: TypingTracker,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
    disconnect_seen: bool,
}

impl ChatClient {
    /// Connect and perform the role-appropriate handshake: customers
    /// identify themselves and wait for their assigned chat, employees
    /// subscribe to the roster of open chats.
    pub async fn connect(config: &ClientConfig, session: &SessionHandle) -> Result<Self> {
        let user = session
            .read()
            .await
            .user
            .clone()
            .ok_or_else(|| ClientError::Validation("not logged in".to_string()))?;
        let role = user.role;
        let name = user.display_name().to_string();

        let ws = match timeout(config.connect_timeout, connect_async(config.ws_url.as_str())).await {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(e)) => return Err(ClientError::Ws(e.to_string())),
            Err(_) => {
                return Err(ClientError::Ws(format!(
                    "connect timeout after {:?}",
                    config.connect_timeout
                )))
            }
        };
        info!("chat channel connected to {} as {} ({})", config.ws_url, name, role);

        let (mut sink, mut stream) = ws.split();
        let (out_tx, mut out_rx) = mpsc::channel::<ClientEvent>(32);
        let (in_tx, in_rx) = mpsc::channel::<ServerEvent>(32);
        let connected = Arc::new(AtomicBool::new(true));

        let writer = tokio::spawn(async move {
            while let Some(event) = out_rx.recv().await {
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("failed to encode chat event: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader_connected = connected.clone();
        let reader = tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => {
                                if in_tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("unrecognized chat event: {} ({})", e, text),
                        }
                    }
                    Ok(Message::Close(_)) => {
                        info!("chat channel closed by server");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("chat channel error: {}", e);
                        break;
                    }
                }
            }
            reader_connected.store(false, Ordering::SeqCst);
        });

        let handshake = match role {
            Role::Customer => ClientEvent::CustomerHandshake { user: name.clone() },
            Role::Employee => ClientEvent::AgentSubscribe {},
        };
        out_tx
            .send(handshake)
            .await
            .map_err(|_| ClientError::Closed)?;

        let typing = TypingTracker::new(out_tx.clone(), config.typing_idle, name.clone());

        Ok(Self {
            role,
            user: name,
            chat_id: None,
            log: Vec::new(),
            roster: Vec::new(),
            typing_peers: Vec::new(),
            draft: String::new(),
            connected,
            events: in_rx,
            outgoing: out_tx,
            typing,
            reader,
            writer,
            disconnect_seen: false,
        })
    }

    /// Wait for the next conversation event. Returns `None` once
    /// [`ChatEvent::Disconnected`] has been delivered.
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        loop {
            let Some(event) = self.events.recv().await else {
                if self.disconnect_seen {
                    return None;
                }
                self.disconnect_seen = true;
                self.connected.store(false, Ordering::SeqCst);
                return Some(ChatEvent::Disconnected);
            };

            match event {
                ServerEvent::Connected { .. } => return Some(ChatEvent::Connected),
                ServerEvent::CustomerChat {
                    chat_id, history, ..
                } => {
                    // snapshot replaces the log, no merging
                    self.chat_id = Some(chat_id);
                    self.log = history;
                    debug!("chat {} ready with {} messages", chat_id, self.log.len());
                    return Some(ChatEvent::SessionReady { chat_id });
                }
                ServerEvent::ChatsList { chats } => {
                    self.roster = chats.clone();
                    return Some(ChatEvent::RosterUpdated(chats));
                }
                ServerEvent::ChatOpened { chat_id, history } => {
                    self.chat_id = Some(chat_id);
                    self.log = history;
                    self.typing_peers.clear();
                    return Some(ChatEvent::ChatOpened { chat_id });
                }
                ServerEvent::Message(message) => {
                    // employees receive every room they ever joined; only the
                    // active chat's traffic belongs in the visible log
                    if self.role == Role::Employee
                        && message.chat_id.is_some()
                        && message.chat_id != self.chat_id
                    {
                        debug!("ignoring message for inactive chat {:?}", message.chat_id);
                        continue;
                    }
                    self.log.push(message.clone());
                    return Some(ChatEvent::MessageReceived(message));
                }
                ServerEvent::Delivered {
                    chat_id,
                    message_id,
                } => {
                    return Some(ChatEvent::MessageDelivered {
                        chat_id,
                        message_id,
                    })
                }
                ServerEvent::NewChat { chat_id, customer } => {
                    return Some(ChatEvent::NewChat { chat_id, customer })
                }
                ServerEvent::TypingStatus { chat_id, users } => {
                    if chat_id.is_some() && chat_id != self.chat_id {
                        continue;
                    }
                    self.typing_peers = users.clone();
                    return Some(ChatEvent::TypingChanged(users));
                }
            }
        }
    }

    /// Send a message to the active chat. Rejected locally, in this order,
    /// when the text is empty, no chat id has been assigned, or the channel
    /// is not connected.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::Validation("message text is empty".to_string()));
        }
        let chat_id = self
            .chat_id
            .ok_or_else(|| ClientError::Validation("no active chat".to_string()))?;
        if !self.is_connected() {
            return Err(ClientError::Closed);
        }

        self.outgoing
            .send(ClientEvent::SendMessage {
                chat_id,
                text: text.to_string(),
                role: self.role,
                user: self.user.clone(),
            })
            .await
            .map_err(|_| ClientError::Closed)?;
        self.draft.clear();
        Ok(())
    }

    /// Switch the active chat (employee side). The current log and any
    /// unsent draft are discarded; the new log arrives as
    /// [`ChatEvent::ChatOpened`].
    pub async fn open_chat(&mut self, chat_id: i64) -> Result<()> {
        if self.role != Role::Employee {
            return Err(ClientError::Validation(
                "only employees can switch chats".to_string(),
            ));
        }
        if !self.is_connected() {
            return Err(ClientError::Closed);
        }
        self.draft.clear();
        self.log.clear();
        self.typing.reset();
        self.outgoing
            .send(ClientEvent::OpenChat { chat_id })
            .await
            .map_err(|_| ClientError::Closed)
    }

    /// Ask the server for a fresh roster (employee side).
    pub async fn refresh_chats(&self) -> Result<()> {
        if self.role != Role::Employee {
            return Err(ClientError::Validation(
                "only employees have a chat roster".to_string(),
            ));
        }
        self.outgoing
            .send(ClientEvent::GetChats {})
            .await
            .map_err(|_| ClientError::Closed)
    }

    /// Record typing activity; broadcasts are debounced. A no-op until a
    /// chat id is assigned.
    pub async fn notify_typing(&mut self) -> Result<()> {
        let Some(chat_id) = self.chat_id else {
            return Ok(());
        };
        if !self.is_connected() {
            return Err(ClientError::Closed);
        }
        self.typing.note_input(chat_id).await
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn chat_id(&self) -> Option<i64> {
        self.chat_id
    }

    /// The visible message log, in arrival order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.log
    }

    pub fn roster(&self) -> &[ChatSummary] {
        &self.roster
    }

    pub fn typing_peers(&self) -> &[String] {
        &self.typing_peers
    }

    /// Whether a message renders on this client's side of the conversation.
    pub fn is_mine(&self, message: &ChatMessage) -> bool {
        message.role == self.role
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Tear the channel down.
    pub async fn close(self) {
        self.connected.store(false, Ordering::SeqCst);
        self.reader.abort();
        // the tracker and the handle each hold a sender; once both are gone
        // the writer drains, closes the socket, and exits
        drop(self.typing);
        drop(self.outgoing);
        let _ = self.writer.await;
        debug!("chat channel closed");
    }
}

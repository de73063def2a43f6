//! Support-chat wire protocol: named JSON events in both directions,
//! internally tagged by `event`.

use serde::{Deserialize, Serialize};

use crate::session::Role;

/// One chat message as the server stores and relays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub sender_user_id: Option<i64>,
    #[serde(default)]
    pub sender: Option<String>,
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Roster entry for the employee-side chat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub chat_id: i64,
    pub customer: String,
    #[serde(default)]
    pub created_ts: Option<String>,
    #[serde(default)]
    pub last_text: Option<String>,
    #[serde(default)]
    pub last_ts: Option<String>,
}

/// Client-to-server events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    CustomerHandshake {
        user: String,
    },
    AgentSubscribe {},
    GetChats {},
    OpenChat {
        chat_id: i64,
    },
    SendMessage {
        chat_id: i64,
        text: String,
        role: Role,
        user: String,
    },
    Typing {
        chat_id: i64,
        user: String,
        is_typing: bool,
    },
}

/// Server-to-client events.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected {
        #[serde(default)]
        message: Option<String>,
    },
    /// Handshake reply: the assigned chat id plus the history snapshot.
    CustomerChat {
        chat_id: i64,
        #[serde(default)]
        history: Vec<ChatMessage>,
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        new_chat: bool,
    },
    ChatsList {
        #[serde(default)]
        chats: Vec<ChatSummary>,
    },
    ChatOpened {
        chat_id: i64,
        #[serde(default)]
        history: Vec<ChatMessage>,
    },
    Message(ChatMessage),
    Delivered {
        chat_id: i64,
        message_id: i64,
    },
    NewChat {
        chat_id: i64,
        customer: String,
    },
    TypingStatus {
        #[serde(default)]
        chat_id: Option<i64>,
        #[serde(default)]
        users: Vec<String>,
    },
}

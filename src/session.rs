//! Session context: the credential pair plus the authenticated identity.
//!
//! The session is shared state, but deliberately not global: it lives in a
//! [`SessionHandle`] that is injected into the clients that need it. The only
//! writer outside login/logout is the HTTP client's refresh path.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    #[serde(alias = "agent")]
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Employee => "employee",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated identity, as the account endpoints return it.
/// Timestamps stay ISO-8601 strings; the backend owns their precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_active() -> bool {
    true
}

impl UserProfile {
    /// Display name used by the chat channel: the email local part.
    pub fn display_name(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// One page-lifetime worth of authentication state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn authenticated(access: String, refresh: String, user: UserProfile) -> Self {
        Self {
            access_token: Some(access),
            refresh_token: Some(refresh),
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }

    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.user = None;
    }
}

/// Shared, injected session context.
pub type SessionHandle = Arc<RwLock<Session>>;

pub fn session_handle(session: Session) -> SessionHandle {
    Arc::new(RwLock::new(session))
}

/// Durable storage for the session: two credential fields and the serialized
/// identity, read back at startup to reconstruct the [`Session`].
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON-file store, the durable-page-storage equivalent for a native client.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        let session = serde_json::from_str(&raw)?;
        debug!("restored session from {}", self.path.display());
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::Storage(e.to_string()))?;
        }
        let raw = serde_json::to_string(session)?;
        std::fs::write(&self.path, raw).map_err(|e| ClientError::Storage(e.to_string()))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(e.to_string())),
        }
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    inner: std::sync::Mutex<Option<Session>>,
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.inner.lock().expect("store poisoned").clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.inner.lock().expect("store poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().expect("store poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> UserProfile {
        UserProfile {
            id: 7,
            email: "customer@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: None,
            role: Role::Customer,
            is_active: true,
            created_at: Some("2024-01-01T00:00:00".to_string()),
            updated_at: None,
        }
    }

    #[test]
    fn display_name_is_email_local_part() {
        assert_eq!(test_user().display_name(), "customer");
    }

    #[test]
    fn role_parses_agent_alias() {
        let role: Role = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(role, Role::Employee);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"employee\"");
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));

        assert!(store.load().unwrap().is_none());

        let session =
            Session::authenticated("access".to_string(), "refresh".to_string(), test_user());
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn profile_defaults_for_missing_fields() {
        let user: UserProfile = serde_json::from_str(
            r#"{"id":1,"email":"e@x.com","first_name":"E","last_name":"X","role":"employee"}"#,
        )
        .unwrap();
        assert!(user.is_active);
        assert_eq!(user.role, Role::Employee);
    }
}

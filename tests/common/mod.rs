#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use wiremock::MockServer;

use foodfast_client::api::ApiClient;
use foodfast_client::config::ClientConfig;
use foodfast_client::session::{
    session_handle, MemoryStore, Role, Session, SessionHandle, UserProfile,
};

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn customer_profile() -> UserProfile {
    UserProfile {
        id: 7,
        email: "customer@azure.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        phone: None,
        role: Role::Customer,
        is_active: true,
        created_at: Some("2024-05-01T08:00:00".to_string()),
        updated_at: None,
    }
}

pub fn employee_profile() -> UserProfile {
    UserProfile {
        id: 2,
        email: "emp@azure.com".to_string(),
        first_name: "Sam".to_string(),
        last_name: "Agent".to_string(),
        phone: None,
        role: Role::Employee,
        is_active: true,
        created_at: Some("2024-05-01T08:00:00".to_string()),
        updated_at: None,
    }
}

pub struct TestContext {
    pub server: MockServer,
    pub client: ApiClient,
    pub session: SessionHandle,
    pub store: Arc<MemoryStore>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_session(Session::default()).await
    }

    pub async fn with_session(session: Session) -> Self {
        init_logging();
        let server = MockServer::start().await;
        let mut config = ClientConfig::for_base_url(&server.uri()).expect("mock server uri");
        // keep long-poll tests fast
        config.track_cooldown = Duration::from_millis(20);

        let handle = session_handle(session);
        let store = Arc::new(MemoryStore::default());
        let client = ApiClient::new(config, handle.clone(), store.clone());
        Self {
            server,
            client,
            session: handle,
            store,
        }
    }

    pub async fn with_customer_session() -> Self {
        Self::with_session(Session::authenticated(
            "access-1".to_string(),
            "refresh-1".to_string(),
            customer_profile(),
        ))
        .await
    }
}

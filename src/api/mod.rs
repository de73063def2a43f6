//! Authenticated HTTP client.
//!
//! One `reqwest::Client` per instance, a shared [`SessionHandle`] for the
//! credential pair, and a [`SessionStore`] that mirrors it durably. The only
//! retry this client ever performs is the single refresh-and-replay on a 401;
//! every other non-success outcome is returned to the caller as-is.

pub mod account;
pub mod announcements;
pub mod drivers;
pub mod orders;
pub mod types;

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{Session, SessionHandle, SessionStore};
use types::{Envelope, RefreshPayload};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: SessionHandle,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: SessionHandle, store: Arc<dyn SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session,
            store,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    pub async fn current_session(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Issue a request with the current access credential. On a 401 with a
    /// refresh credential present, refresh once and replay the original
    /// request once; a second 401 is returned like any other failure.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Envelope> {
        let url = self.config.endpoint(path);
        let access = self.session.read().await.access_token.clone();
        let response = self.execute(&method, &url, body, access.as_deref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let refresh = self.session.read().await.refresh_token.clone();
            if let Some(refresh) = refresh {
                self.refresh_access(&refresh).await?;
                let access = self.session.read().await.access_token.clone();
                debug!("replaying {} {} with refreshed credential", method, path);
                let retried = self.execute(&method, &url, body, access.as_deref()).await?;
                return Self::decode(retried).await;
            }
        }

        Self::decode(response).await
    }

    async fn execute(
        &self,
        method: &Method,
        url: &str,
        body: Option<&serde_json::Value>,
        access: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = access {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Parse the envelope from any status; the body's own `success` flag
    /// decides the outcome, matching how the backend reports errors.
    async fn decode(response: reqwest::Response) -> Result<Envelope> {
        let status = response.status();
        let envelope: Envelope = response.json().await?;
        if !envelope.success {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: envelope.failure_message(),
            });
        }
        Ok(envelope)
    }

    /// Single refresh attempt. Success persists the new access credential;
    /// any failure wipes the stored credentials and surfaces the fatal
    /// [`ClientError::SessionExpired`].
    async fn refresh_access(&self, refresh: &str) -> Result<()> {
        info!("access credential rejected, attempting refresh");
        let url = self.config.endpoint("/account/refresh");

        let outcome: Result<String> = async {
            let response = self.http.post(&url).bearer_auth(refresh).send().await?;
            let envelope = Self::decode(response).await?;
            let payload: RefreshPayload =
                serde_json::from_value(envelope.data.unwrap_or_default())?;
            Ok(payload.access_token)
        }
        .await;

        match outcome {
            Ok(access) => {
                let mut session = self.session.write().await;
                session.access_token = Some(access);
                self.store.save(&session)?;
                info!("credential refresh succeeded");
                Ok(())
            }
            Err(e) => {
                error!("credential refresh denied: {}", e);
                self.session.write().await.clear();
                self.store.clear()?;
                Err(ClientError::SessionExpired)
            }
        }
    }

    /// Extract and deserialize the `data` payload of a successful envelope.
    /// A missing payload surfaces as a parse error on `null`.
    pub(crate) fn expect_data<T: serde::de::DeserializeOwned>(envelope: Envelope) -> Result<T> {
        let data = envelope.data.unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    /// Like `expect_data` but for payloads one level deeper, e.g. the
    /// account endpoints' `data.user`.
    pub(crate) fn expect_nested<T: serde::de::DeserializeOwned>(
        envelope: Envelope,
        key: &str,
    ) -> Result<T> {
        let inner = envelope
            .data
            .as_ref()
            .and_then(|data| data.get(key))
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(inner)?)
    }

    pub(crate) async fn persist_session(&self) -> Result<()> {
        let session = self.session.read().await;
        self.store.save(&session)
    }

    pub(crate) fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }
}

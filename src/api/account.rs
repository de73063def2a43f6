//! Account operations: register, login, profile, logout, and session
//! restore at startup.

use reqwest::Method;
use serde_json::json;
use tracing::{info, warn};

use crate::error::{ClientError, Result};
use crate::session::UserProfile;

use super::types::{AuthPayload, NewAccount, ProfileUpdate};
use super::ApiClient;

impl ApiClient {
    pub async fn register(&self, account: NewAccount) -> Result<UserProfile> {
        if account.email.trim().is_empty() || account.password.is_empty() {
            return Err(ClientError::Validation(
                "email and password are required".to_string(),
            ));
        }
        if account.password.len() < 6 {
            return Err(ClientError::Validation(
                "password must be at least 6 characters".to_string(),
            ));
        }
        if account.first_name.trim().is_empty() {
            return Err(ClientError::Validation("name is required".to_string()));
        }

        let body = serde_json::to_value(&account)?;
        let envelope = self
            .request(Method::POST, "/account/register", Some(&body))
            .await?;
        let payload: AuthPayload = Self::expect_data(envelope)?;
        self.install_auth(payload).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let body = json!({ "email": email, "password": password });
        let envelope = self
            .request(Method::POST, "/account/login", Some(&body))
            .await?;
        let payload: AuthPayload = Self::expect_data(envelope)?;
        info!("logged in as {} ({})", payload.user.email, payload.user.role);
        self.install_auth(payload).await
    }

    async fn install_auth(&self, payload: AuthPayload) -> Result<UserProfile> {
        {
            let mut session = self.session().write_owned().await;
            session.access_token = Some(payload.access_token);
            session.refresh_token = Some(payload.refresh_token);
            session.user = Some(payload.user.clone());
        }
        self.persist_session().await?;
        Ok(payload.user)
    }

    /// Drop the session and its durable copy. Purely local; the backend
    /// keeps no logout state.
    pub async fn logout(&self) -> Result<()> {
        self.session().write().await.clear();
        self.store().clear()?;
        info!("logged out");
        Ok(())
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        let envelope = self.request(Method::GET, "/account/profile", None).await?;
        Self::expect_nested(envelope, "user")
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile> {
        let body = serde_json::to_value(&update)?;
        let envelope = self
            .request(Method::PUT, "/account/profile", Some(&body))
            .await?;
        let user: UserProfile = Self::expect_nested(envelope, "user")?;
        self.session().write().await.user = Some(user.clone());
        self.persist_session().await?;
        Ok(user)
    }

    /// Rebuild the session from durable storage. If credentials survived but
    /// the identity did not, the profile endpoint fills it back in; a denied
    /// refresh during that fetch is fatal, anything else just leaves the
    /// identity empty. Returns whether a stored session was found.
    pub async fn restore(&self) -> Result<bool> {
        let Some(stored) = self.store().load()? else {
            return Ok(false);
        };
        let needs_identity = stored.user.is_none() && stored.is_authenticated();
        *self.session().write().await = stored;

        if needs_identity {
            match self.profile().await {
                Ok(user) => {
                    self.session().write().await.user = Some(user);
                    self.persist_session().await?;
                }
                Err(ClientError::SessionExpired) => return Err(ClientError::SessionExpired),
                Err(e) => warn!("could not restore identity from profile: {}", e),
            }
        }
        Ok(true)
    }
}

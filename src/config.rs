use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};

/// Client configuration. `Default` targets a local backend; `from_env`
/// overlays `FOODFAST_*` variables for deployed environments.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// HTTP base, e.g. `http://localhost:5000`. API paths are appended
    /// under `/api/v1`.
    pub base_url: String,
    /// WebSocket endpoint for the support-chat channel.
    pub ws_url: String,
    /// Server-side hold time requested on each long-poll iteration.
    pub track_timeout_secs: u64,
    /// Client-side pause between long-poll iterations.
    pub track_cooldown: Duration,
    /// Inactivity window after which a typing indicator is retracted.
    pub typing_idle: Duration,
    /// Connect timeout for the chat channel.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            ws_url: "ws://localhost:5000/chat".to_string(),
            track_timeout_secs: 45,
            track_cooldown: Duration::from_secs(2),
            typing_idle: Duration::from_millis(800),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Build a config from the environment, falling back to defaults.
    /// Reads `FOODFAST_API_URL` and `FOODFAST_WS_URL`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(base) = std::env::var("FOODFAST_API_URL") {
            config.base_url = base;
        }
        if let Ok(ws) = std::env::var("FOODFAST_WS_URL") {
            config.ws_url = ws;
        }
        config.validate()?;
        Ok(config)
    }

    /// Point both endpoints at `base_url`, deriving the chat URL by scheme
    /// swap. Convenient for tests against a mock server.
    pub fn for_base_url(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        let ws_scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        let host = url
            .host_str()
            .ok_or_else(|| ClientError::InvalidUrl(format!("no host in {base_url}")))?;
        let ws_url = match url.port() {
            Some(port) => format!("{ws_scheme}://{host}:{port}/chat"),
            None => format!("{ws_scheme}://{host}/chat"),
        };
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ws_url,
            ..Self::default()
        })
    }

    fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "base url must use http:// or https://, got: {}",
                url.scheme()
            )));
        }
        let ws = Url::parse(&self.ws_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if ws.scheme() != "ws" && ws.scheme() != "wss" {
            return Err(ClientError::InvalidUrl(format!(
                "chat url must use ws:// or wss://, got: {}",
                ws.scheme()
            )));
        }
        Ok(())
    }

    /// Absolute URL for an API path (`path` starts with `/`, without the
    /// `/api/v1` prefix).
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url.trim_end_matches('/'), path)
    }
}

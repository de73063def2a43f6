use thiserror::Error;

/// Everything that can go wrong talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure: unreachable host, aborted body, bad TLS, or a
    /// response body that is not the JSON envelope at all.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with `success: false`.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Credential refresh was denied. Fatal for the current session: stored
    /// credentials have already been cleared when this is returned.
    #[error("session expired: credential refresh was denied")]
    SessionExpired,

    /// Rejected locally before any network I/O.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("websocket error: {0}")]
    Ws(String),

    #[error("malformed payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// The connection this operation needs is no longer open.
    #[error("connection closed")]
    Closed,

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("session storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

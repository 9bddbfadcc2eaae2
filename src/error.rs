// Error types shared by the library modules. The binary and the UI layer
// wrap these in `anyhow` with extra context; the library keeps them typed
// so callers can tell bad input apart from a failed request.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PushError {
    /// Rejected before any request is made: bad URL, missing file,
    /// unknown push type.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Pushbullet returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PushError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub type Result<T, E = PushError> = std::result::Result<T, E>;

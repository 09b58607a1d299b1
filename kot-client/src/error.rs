//! Client error types

use http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response from the backend (connect, DNS, timeout, TLS)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Session expired or token rejected (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-2xx response carrying a business error
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session store unreadable or missing the server address
    #[error("Session error: {0}")]
    Session(String),
}

impl ClientError {
    /// Whether the caller must force a re-login
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error body shape used by the backend (`{"message": ...}` or `{"error": ...}`)
#[derive(Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Map a non-2xx status and its body text to a [`ClientError`]
pub(crate) fn error_from_status(status: StatusCode, text: String) -> ClientError {
    if status == StatusCode::UNAUTHORIZED {
        return ClientError::Unauthorized;
    }

    let message = serde_json::from_str::<ApiErrorResponse>(&text)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .unwrap_or(text);

    match status {
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        _ => ClientError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

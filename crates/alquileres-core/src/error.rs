use thiserror::Error;

use crate::http_client::HttpError;

/// Failures reading or writing a storage scope.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file '{path}' is not a valid JSON object: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("value for '{key}' could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored value under '{key}' could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by login, re-authentication and the authenticated gateway.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login request exceeded the {timeout_ms} ms timeout")]
    Timeout { timeout_ms: u64 },

    #[error("login rejected by backend (status {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("credential encoding failed: {0}")]
    Encoding(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("another login is already in progress")]
    LoginInProgress,

    #[error("user profile unavailable (status {status})")]
    ProfileUnavailable { status: u16 },

    #[error("unexpected response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Timeouts and transport failures may succeed on a later attempt.
    pub const fn retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport(_))
    }
}

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid credential scheme '{value}', expected one of plain, tagged, csrf")]
    InvalidScheme { value: String },

    #[error("invalid value '{value}' for {name}: expected a positive integer")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must not be empty")]
    Empty { name: &'static str },
}

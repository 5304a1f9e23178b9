use libdesk_core::{ApiErrorBody, ErrorCategory};
use thiserror::Error;

/// Errors surfaced by the session client and the feature APIs.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response was received (connection refused, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The server still answered 401 after the refresh-and-retry budget was
    /// used up, or rejected the supplied login credentials.
    #[error("Unauthorized: {}", .body.display_message())]
    Unauthorized { body: ApiErrorBody },

    /// The session could not be renewed; stored credentials were cleared.
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Forbidden: {}", .body.display_message())]
    Forbidden { body: ApiErrorBody },

    #[error("Not found: {}", .body.display_message())]
    NotFound { body: ApiErrorBody },

    #[error("Conflict: {}", .body.display_message())]
    Conflict { body: ApiErrorBody },

    /// Any other 4xx response.
    #[error("Request rejected (HTTP {status}): {}", .body.display_message())]
    Validation { status: u16, body: ApiErrorBody },

    #[error("Server error (HTTP {status}): {}", .body.display_message())]
    Server { status: u16, body: ApiErrorBody },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: ApiErrorBody) -> Self {
        match status {
            401 => Self::Unauthorized { body },
            403 => Self::Forbidden { body },
            404 => Self::NotFound { body },
            409 => Self::Conflict { body },
            400..=499 => Self::Validation { status, body },
            _ => Self::Server { status, body },
        }
    }

    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::Network(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status behind this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } | Self::SessionExpired => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) | Self::Store(_) | Self::Config(_) => None,
        }
    }

    /// Error payload returned by the server, if any.
    pub fn body(&self) -> Option<&ApiErrorBody> {
        match self {
            Self::Unauthorized { body }
            | Self::Forbidden { body }
            | Self::NotFound { body }
            | Self::Conflict { body }
            | Self::Validation { body, .. }
            | Self::Server { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Authentication failed for good: either rejected after the retry or
    /// the session could not be renewed.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::SessionExpired)
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Get error category for logging and user messaging.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::Network,
            Self::Unauthorized { .. } | Self::SessionExpired => ErrorCategory::Authorization,
            Self::Forbidden { .. }
            | Self::NotFound { .. }
            | Self::Conflict { .. }
            | Self::Validation { .. } => ErrorCategory::Validation,
            Self::Server { .. } => ErrorCategory::Server,
            Self::Decode(_) => ErrorCategory::Serialization,
            Self::Store(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Configuration,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Errors from a credential store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Access and refresh tokens must be written together.
    #[error("Refusing to store a partial token pair")]
    IncompletePair,

    #[error("Cannot determine home directory")]
    NoHomeDirectory,
}

/// Convenience result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

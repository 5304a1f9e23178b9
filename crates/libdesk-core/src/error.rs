use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error types for libdesk domain values
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid loan status: {0}")]
    InvalidLoanStatus(String),

    #[error("Date parsing error: {0}")]
    DateError(#[from] time::error::Parse),
}

impl CoreError {
    /// Create a new InvalidRole error
    pub fn invalid_role(role: impl Into<String>) -> Self {
        Self::InvalidRole(role.into())
    }

    /// Create a new InvalidLoanStatus error
    pub fn invalid_loan_status(status: impl Into<String>) -> Self {
        Self::InvalidLoanStatus(status.into())
    }
}

/// Error categories shared by every libdesk crate for classification and
/// user-facing messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// No response was received (connect failure, timeout).
    Network,
    /// Credentials missing, rejected, or no longer refreshable.
    Authorization,
    /// 4xx responses other than 401.
    Validation,
    /// 5xx responses.
    Server,
    Serialization,
    Storage,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Authorization => write!(f, "authorization"),
            Self::Validation => write!(f, "validation"),
            Self::Server => write!(f, "server"),
            Self::Serialization => write!(f, "serialization"),
            Self::Storage => write!(f, "storage"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Error payload returned by the library API on failures.
///
/// The server answers most failures with `{"error": "..."}`; validation
/// failures sometimes add `message` and `status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ApiErrorBody {
    /// Extract an error payload from an arbitrary JSON body.
    ///
    /// Falls back to the raw text when the body is not the usual shape.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match serde_json::from_value::<ApiErrorBody>(value.clone()) {
            Ok(body) if !body.error.is_empty() || body.message.is_some() => body,
            _ => Self {
                error: match value {
                    serde_json::Value::Null => String::new(),
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                message: None,
                status: None,
            },
        }
    }

    /// Best human-readable description of the failure.
    pub fn display_message(&self) -> &str {
        if !self.error.is_empty() {
            &self.error
        } else {
            self.message.as_deref().unwrap_or("")
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

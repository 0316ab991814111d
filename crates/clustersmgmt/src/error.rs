//! Error types for clusters_mgmt API calls.
//!
//! Errors are categorized so callers can tell a missing resource apart from a
//! transport failure or a rejected request, and give appropriate feedback.

use std::fmt;

/// Result type alias for clusters_mgmt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport-level failure (connection, TLS, timeout).
    Network,
    /// The requested resource does not exist (HTTP 404).
    NotFound,
    /// The request was rejected (other 4xx).
    Client,
    /// The server failed to handle the request (5xx).
    Server,
    /// The response body could not be decoded.
    Format,
    /// The client itself is misconfigured.
    Config,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Resource not found",
            Self::Client => "Request rejected by the API",
            Self::Server => "API server error",
            Self::Format => "Unexpected API response",
            Self::Config => "Invalid client configuration",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check connectivity to the API URL and try again",
            Self::NotFound => "Verify the identifier is correct and the resource still exists",
            Self::Client => "Check the declared attributes and your token's permissions",
            Self::Server => "The API may be degraded, try again later",
            Self::Format => "The API URL may not point at a clusters_mgmt service",
            Self::Config => "Check the configured URL and token",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors returned by a [`Backend`](crate::Backend).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// HTTP request failed, either in transport or with a non-success status.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if a response was received.
        status: Option<u16>,
    },

    /// The addressed resource does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Human-readable description of what was looked up.
        resource: String,
    },

    /// The response body did not match the expected shape.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// The client configuration is unusable.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// Create a not-found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Name the resource a not-found error refers to. Other errors pass through.
    #[must_use]
    pub fn with_resource(self, resource: impl Into<String>) -> Self {
        match self {
            Self::NotFound { .. } => Self::not_found(resource),
            other => other,
        }
    }

    /// HTTP status associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            Self::NotFound { .. } => Some(404),
            Self::InvalidResponse(_) | Self::Config(_) => None,
        }
    }

    /// Whether the API reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http { status: None, .. } => ErrorCategory::Network,
            Self::Http {
                status: Some(code), ..
            } if *code >= 500 => ErrorCategory::Server,
            Self::Http { .. } => ErrorCategory::Client,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidResponse(_) => ErrorCategory::Format,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(404) => Self::not_found("resource"),
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {code}"),
                status: Some(code),
            },
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

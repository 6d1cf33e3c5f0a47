//! Error types for the LDX Insight client

use std::time::Duration;

use thiserror::Error;

use crate::session::CookieError;

/// Main error type for the LDX Insight client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Server answered with a non-2xx/3xx status that was not recovered
    #[error("HTTP error (status {status}): {body}")]
    Http {
        /// Response status code
        status: u16,
        /// Response body, lossily decoded as UTF-8
        body: String,
    },

    /// The one-shot token refresh failed; the session has been cleared
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// An authentication endpoint answered 401; the session has been cleared
    /// and the user sent to the login page
    #[error("Authentication required (status {status})")]
    AuthenticationRequired {
        /// Response status code
        status: u16,
        /// Response body, lossily decoded as UTF-8
        body: String,
    },

    /// No response was received (connection refused, DNS, TLS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Response body could not be decoded
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Session cookie could not be read or written
    #[error("Session storage error: {0}")]
    Storage(#[from] CookieError),

    /// Local file I/O failed (saving a download)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Create an HTTP status error
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a refresh failure error
    pub fn refresh_failed(msg: impl Into<String>) -> Self {
        Self::RefreshFailed(msg.into())
    }

    /// Create an authentication required error
    pub fn authentication_required(status: u16, body: impl Into<String>) -> Self {
        Self::AuthenticationRequired {
            status,
            body: body.into(),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// HTTP status carried by this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::AuthenticationRequired { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Whether the caller should send the user back through login
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::RefreshFailed(_) | Self::AuthenticationRequired { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        assert_eq!(ClientError::http(404, "missing").status(), Some(404));
        assert_eq!(
            ClientError::authentication_required(401, "").status(),
            Some(401)
        );
        assert_eq!(ClientError::network("refused").status(), None);
        assert_eq!(ClientError::Timeout(Duration::from_secs(20)).status(), None);
    }

    #[test]
    fn test_requires_login() {
        assert!(ClientError::refresh_failed("expired").requires_login());
        assert!(ClientError::authentication_required(401, "").requires_login());
        assert!(!ClientError::http(401, "").requires_login());
        assert!(!ClientError::http(500, "").requires_login());
    }

    #[test]
    fn test_display() {
        let err = ClientError::Timeout(Duration::from_secs(20));
        assert_eq!(err.to_string(), "Request timed out after 20s");

        let err = ClientError::http(503, "maintenance");
        assert_eq!(err.to_string(), "HTTP error (status 503): maintenance");
    }
}

//! Error taxonomy for API requests
//!
//! Every variant is terminal for the action that produced it; nothing is retried.

use thiserror::Error;

/// Hint shown to the operator when the transport layer fails
pub const NETWORK_HINT: &str =
    "Network error. Check if the server is running and the URL is correct.";

/// Errors raised while preparing, sending or decoding an API request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Base URL missing or malformed
    #[error("{0}")]
    Configuration(String),

    /// A credential required by the auth mode is not configured
    #[error("{0}")]
    AuthConfiguration(String),

    /// The server answered with a non-2xx status
    #[error("{message}")]
    Http { message: String, status: u16 },

    /// Connection refused, DNS failure, timeout, broken body stream
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed operator input caught before any network call
    #[error("{0}")]
    Validation(String),

    /// Response advertised JSON but the body did not parse
    #[error("Failed to decode JSON response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ApiError::Configuration(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        ApiError::AuthConfiguration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn http(message: impl Into<String>, status: u16) -> Self {
        ApiError::Http {
            message: message.into(),
            status,
        }
    }

    /// Short label attached to action failure logs
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Configuration(_) => "configuration",
            ApiError::AuthConfiguration(_) => "auth-configuration",
            ApiError::Http { .. } => "http",
            ApiError::Network(_) => "network",
            ApiError::Validation(_) => "validation",
            ApiError::Decode(_) => "decode",
        }
    }

    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text for the user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => NETWORK_HINT.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Network(format!("request timed out: {e}"))
        } else if e.is_connect() {
            ApiError::Network(format!("connection failed: {e}"))
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message_is_verbatim() {
        let err = ApiError::http("not found", 404);
        assert_eq!(err.to_string(), "not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.kind(), "http");
    }

    #[test]
    fn test_network_error_uses_hint() {
        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), NETWORK_HINT);
        assert_eq!(err.status(), None);
    }
}

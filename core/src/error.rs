//! Error types for the tracker API client.
//!
//! # Design
//! Every failure path of a call ends in exactly one `ClientError`. Timeouts
//! and caller cancellations get their own variants so a UI can say "request
//! timed out" instead of "request failed". Failed HTTP statuses keep the
//! status code next to the extracted detail so callers can branch on 404
//! versus 500 without parsing the message.

use std::time::Duration;

use thiserror::Error;

use crate::extract::http_error_message;

#[derive(Debug, Error)]
pub enum ClientError {
    /// DNS, connect, TLS or body-read failure from the transport.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },

    #[error("request was cancelled")]
    Cancelled,

    /// The server answered with a status outside 2xx.
    #[error("{}", http_error_message(*status, detail))]
    Http { status: u16, detail: String },

    /// The response claimed JSON but was malformed, or did not fit the
    /// expected type.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("invalid multipart form: {0}")]
    Multipart(#[source] reqwest::Error),

    #[error("invalid configuration value for {key}: {value:?}")]
    Config { key: String, value: String },
}

impl ClientError {
    /// HTTP status of a failed response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Detail extracted from a failed response body.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Http { detail, .. } => Some(detail),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// Timed out or cancelled by the caller.
    pub fn is_cancellation(&self) -> bool {
        self.is_timeout() || self.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_includes_detail() {
        let err = ClientError::Http {
            status: 404,
            detail: "Board not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 – Board not found");
        assert!(err.is_not_found());
        assert_eq!(err.detail(), Some("Board not found"));
    }

    #[test]
    fn http_error_display_without_detail() {
        let err = ClientError::Http {
            status: 500,
            detail: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP 500");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn cancellation_flavors() {
        let timeout = ClientError::Timeout {
            after: Duration::from_millis(250),
        };
        assert_eq!(timeout.to_string(), "request timed out after 250ms");
        assert!(timeout.is_cancellation());
        assert!(!timeout.is_cancelled());
        assert!(ClientError::Cancelled.is_cancellation());
        assert_eq!(ClientError::Cancelled.status(), None);
    }
}

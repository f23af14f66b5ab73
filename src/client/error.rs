//! Transport error type for the posting/reading client.
//!
//! There is no retry layer anywhere in this system: failures are logged and
//! the next scheduled invocation is the de facto retry. The error therefore
//! carries context for the log line rather than retry categorization.

use std::fmt;

use thiserror::Error;

/// A failure talking to the social network.
#[derive(Debug, Error)]
pub struct TransportError {
    /// HTTP status code, when the request got far enough to have one.
    pub status: Option<u16>,

    /// Human-readable description.
    pub message: String,

    /// The underlying HTTP client error, if any.
    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "transport error (HTTP {}): {}", code, self.message),
            None => write!(f, "transport error: {}", self.message),
        }
    }
}

impl TransportError {
    /// Wraps a reqwest error, capturing its status code when present.
    pub fn from_http(err: reqwest::Error) -> Self {
        TransportError {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// An API-level failure (non-success status with a readable body).
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        TransportError {
            status: Some(status),
            message: message.into(),
            source: None,
        }
    }

    /// A failure with no HTTP context (e.g. a closed stream).
    pub fn message(message: impl Into<String>) -> Self {
        TransportError {
            status: None,
            message: message.into(),
            source: None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::from_http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_when_present() {
        let err = TransportError::api(429, "rate limited");
        assert_eq!(err.to_string(), "transport error (HTTP 429): rate limited");

        let err = TransportError::message("stream closed");
        assert_eq!(err.to_string(), "transport error: stream closed");
    }
}

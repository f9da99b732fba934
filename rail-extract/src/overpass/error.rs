//! Overpass client error types.

use std::time::Duration;

/// Errors from a single Overpass request attempt.
///
/// These never escape [`QueryClient::execute`](super::QueryClient::execute):
/// the client retries, fails over, and finally reports "no result".
#[derive(Debug, thiserror::Error)]
pub enum OverpassError {
    /// HTTP request failed (connection, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The attempt exceeded its wall-clock budget
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Response body was not a valid Overpass JSON document. `body` holds
    /// the start of the response, which is often an HTML error page.
    #[error("JSON parse error: {message}")]
    Json { message: String, body: String },

    /// Failure reported by a non-HTTP transport
    #[error("transport error: {0}")]
    Transport(String),
}

impl OverpassError {
    /// Leading part of an unparseable response body, if any.
    pub fn body_snippet(&self) -> Option<&str> {
        match self {
            OverpassError::Json { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = OverpassError::Timeout(Duration::from_secs(180));
        assert_eq!(err.to_string(), "request timed out after 180s");

        let err = OverpassError::Json {
            message: "expected value".into(),
            body: "<html>".into(),
        };
        assert_eq!(err.to_string(), "JSON parse error: expected value");
        assert_eq!(err.body_snippet(), Some("<html>"));

        let err = OverpassError::Transport("connection reset".into());
        assert_eq!(err.to_string(), "transport error: connection reset");
        assert_eq!(err.body_snippet(), None);
    }
}

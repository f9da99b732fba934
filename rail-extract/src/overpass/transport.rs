//! HTTP transport for Overpass queries.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};

use super::error::OverpassError;

/// Raw reply to a query: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    /// A 200 reply with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// A reply with the given status and an empty body.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Sends one query body to one endpoint.
///
/// This abstraction allows the retry and failover logic to be tested
/// without network access. Non-2xx statuses are replies, not errors.
pub trait Transport {
    fn post(
        &self,
        endpoint: &str,
        body: &str,
    ) -> impl Future<Output = Result<HttpReply, OverpassError>>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given user agent and request timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, OverpassError> {
        let mut headers = HeaderMap::new();

        let agent = HeaderValue::from_str(user_agent)
            .map_err(|_| OverpassError::Transport("invalid user agent".to_string()))?;
        headers.insert(USER_AGENT, agent);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    async fn post(&self, endpoint: &str, body: &str) -> Result<HttpReply, OverpassError> {
        let response = self.http.post(endpoint).body(body.to_owned()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_creation() {
        let transport = HttpTransport::new("rail-extract/0.1", Duration::from_secs(180));
        assert!(transport.is_ok());
    }

    #[test]
    fn rejects_invalid_user_agent() {
        let transport = HttpTransport::new("bad\nagent", Duration::from_secs(1));
        assert!(matches!(transport, Err(OverpassError::Transport(_))));
    }

    #[test]
    fn reply_helpers() {
        assert_eq!(HttpReply::ok("{}").status, 200);
        assert_eq!(HttpReply::status(429).body, "");
    }
}

//! In-memory transport for testing without network access.
//!
//! Replies come from a handler closure that sees the endpoint and query
//! body, so tests can route different queries to different canned
//! responses. Every call is recorded for later inspection.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::error::OverpassError;
use super::transport::{HttpReply, Transport};

type Handler = dyn Fn(&str, &str) -> Result<HttpReply, OverpassError>;

/// Mock transport driven by a handler closure.
pub struct MockTransport {
    handler: Box<Handler>,
    latency: Option<Duration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockTransport {
    /// Create a mock that answers every call with `handler(endpoint, body)`.
    pub fn new(
        handler: impl Fn(&str, &str) -> Result<HttpReply, OverpassError> + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            latency: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that returns the given replies in order, then 500s.
    pub fn scripted(replies: Vec<Result<HttpReply, OverpassError>>) -> Self {
        let queue = Mutex::new(VecDeque::from(replies));
        Self::new(move |_, _| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(HttpReply::status(500)))
        })
    }

    /// Delay every reply by `latency` (use with a paused tokio clock).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// All `(endpoint, body)` pairs seen so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    async fn post(&self, endpoint: &str, body: &str) -> Result<HttpReply, OverpassError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), body.to_string()));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        (self.handler)(endpoint, body)
    }
}

/// Build an Overpass JSON body from element JSON snippets.
pub fn elements_body(elements: &[String]) -> String {
    format!(r#"{{"elements": [{}]}}"#, elements.join(","))
}

/// JSON for a way with `out geom` geometry.
pub fn way_json(id: i64, railway: Option<&str>, points: &[(f64, f64)]) -> String {
    let geometry: Vec<String> = points
        .iter()
        .map(|(lat, lon)| format!(r#"{{"lat": {lat}, "lon": {lon}}}"#))
        .collect();
    let tags = match railway {
        Some(kind) => format!(r#"{{"railway": "{kind}"}}"#),
        None => "{}".to_string(),
    };
    format!(
        r#"{{"type": "way", "id": {id}, "tags": {tags}, "geometry": [{}]}}"#,
        geometry.join(",")
    )
}

/// JSON for a node with the given tags.
pub fn node_json(id: i64, lat: f64, lon: f64, tags: &[(&str, &str)]) -> String {
    let tags: Vec<String> = tags
        .iter()
        .map(|(k, v)| format!(r#""{k}": "{v}""#))
        .collect();
    format!(
        r#"{{"type": "node", "id": {id}, "lat": {lat}, "lon": {lon}, "tags": {{{}}}}}"#,
        tags.join(",")
    )
}

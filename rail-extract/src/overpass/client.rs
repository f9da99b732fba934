//! Overpass query client with endpoint failover.
//!
//! Each query is tried against an ordered list of endpoints. Within one
//! endpoint, attempts are retried with a delay; rate limiting backs off
//! linearly, and a server error abandons the endpoint at once. When every
//! endpoint is exhausted the client reports "no result" instead of an error,
//! so one failed tile never aborts a whole run.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::error::OverpassError;
use super::transport::{HttpReply, Transport};
use super::types::OverpassResponse;

/// Public Overpass instances, primary first.
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter",
];

/// Default attempts per endpoint.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default wall-clock budget per attempt.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Default base for rate-limit backoff.
const DEFAULT_BASE_BACKOFF: Duration = Duration::from_secs(10);

/// Default pause after a failed attempt.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Configuration for the query client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint URLs, tried in order
    pub endpoints: Vec<String>,
    /// Attempts per endpoint before moving on
    pub max_retries: u32,
    /// Hard timeout for a single attempt
    pub timeout: Duration,
    /// Rate-limit wait is `base_backoff * (attempt + 1)`
    pub base_backoff: Duration,
    /// Pause after a transport failure or unexpected status
    pub retry_delay: Duration,
}

impl ClientConfig {
    /// Create a config with the public endpoints and default timings.
    pub fn new() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            base_backoff: DEFAULT_BASE_BACKOFF,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Replace the endpoint list.
    pub fn with_endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    /// Set attempts per endpoint.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the rate-limit backoff base.
    pub fn with_base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// Set the delay after failed attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Server-side query timeout, matched to the client budget.
    pub fn server_timeout_secs(&self) -> u64 {
        self.timeout.as_secs().max(1)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What one attempt produced.
#[derive(Debug)]
enum Attempt {
    Success(OverpassResponse),
    RateLimited,
    ServerError(u16),
    Rejected(u16),
    Failed(OverpassError),
}

/// Overpass client.
///
/// Issues at most one request at a time; callers await each query in turn.
#[derive(Debug, Clone)]
pub struct QueryClient<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> QueryClient<T> {
    /// Create a client over the given transport.
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a query, failing over across endpoints.
    ///
    /// Returns `None` once every endpoint has been exhausted. Callers should
    /// treat that as "no features" and carry on.
    pub async fn execute(&self, query: &str) -> Option<OverpassResponse> {
        let max = self.config.max_retries;

        for endpoint in &self.config.endpoints {
            let label = endpoint_label(endpoint);

            for attempt in 0..max {
                info!("querying {label} (attempt {}/{max})", attempt + 1);
                let last = attempt + 1 == max;

                match self.attempt(endpoint, query).await {
                    Attempt::Success(response) => {
                        if let Some(remark) = &response.remark {
                            warn!("{label} returned partial data: {remark}");
                        }
                        debug!("{label} returned {} elements", response.elements.len());
                        return Some(response);
                    }
                    Attempt::RateLimited => {
                        let wait = self.config.base_backoff * (attempt + 1);
                        warn!("{label} rate limited");
                        if !last {
                            info!("backing off for {wait:?}");
                            tokio::time::sleep(wait).await;
                        }
                    }
                    Attempt::ServerError(status) => {
                        warn!("{label} returned {status}, trying next endpoint");
                        break;
                    }
                    Attempt::Rejected(status) => {
                        warn!("{label} returned unexpected status {status}");
                        if !last {
                            tokio::time::sleep(self.config.retry_delay).await;
                        }
                    }
                    Attempt::Failed(err) => {
                        warn!("{label} request failed: {err}");
                        if let Some(body) = err.body_snippet() {
                            debug!("{label} response began: {body}");
                        }
                        if !last {
                            tokio::time::sleep(self.config.retry_delay).await;
                        }
                    }
                }
            }
        }

        warn!("all Overpass endpoints exhausted");
        None
    }

    /// One request with a hard timeout, classified.
    async fn attempt(&self, endpoint: &str, query: &str) -> Attempt {
        let reply = match tokio::time::timeout(
            self.config.timeout,
            self.transport.post(endpoint, query),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => return Attempt::Failed(err),
            Err(_) => return Attempt::Failed(OverpassError::Timeout(self.config.timeout)),
        };

        classify(reply)
    }
}

/// How much of an unparseable body is kept for the log.
const BODY_SNIPPET_CHARS: usize = 200;

/// Map a reply to an attempt outcome, parsing the body on success.
fn classify(reply: HttpReply) -> Attempt {
    match reply.status {
        200..=299 => match serde_json::from_str::<OverpassResponse>(&reply.body) {
            Ok(response) => Attempt::Success(response),
            Err(e) => Attempt::Failed(OverpassError::Json {
                message: e.to_string(),
                body: reply.body.chars().take(BODY_SNIPPET_CHARS).collect(),
            }),
        },
        429 => Attempt::RateLimited,
        status if status >= 500 => Attempt::ServerError(status),
        status => Attempt::Rejected(status),
    }
}

/// Host part of an endpoint URL, for log lines.
fn endpoint_label(endpoint: &str) -> &str {
    let rest = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest);
    rest.split('/').next().unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overpass::mock::MockTransport;
    use tokio::time::Instant;

    const EMPTY: &str = r#"{"elements": []}"#;
    const ONE_NODE: &str = r#"{"elements": [{"type": "node", "id": 7, "lat": 1.0, "lon": 2.0}]}"#;

    fn config() -> ClientConfig {
        ClientConfig::new()
            .with_endpoints(["https://primary.test/api", "https://mirror.test/api"])
            .with_base_backoff(Duration::from_secs(10))
            .with_retry_delay(Duration::from_secs(2))
            .with_timeout(Duration::from_secs(180))
    }

    #[test]
    fn config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoints.len(), DEFAULT_ENDPOINTS.len());
        assert_eq!(config.endpoints[0], "https://overpass-api.de/api/interpreter");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(180));
        assert_eq!(config.server_timeout_secs(), 180);
    }

    #[test]
    fn config_builder() {
        let config = ClientConfig::new()
            .with_endpoints(["http://localhost:12345/api/interpreter"])
            .with_max_retries(5)
            .with_timeout(Duration::from_secs(60))
            .with_base_backoff(Duration::from_millis(100))
            .with_retry_delay(Duration::from_millis(50));

        assert_eq!(config.endpoints, ["http://localhost:12345/api/interpreter"]);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.base_backoff, Duration::from_millis(100));
        assert_eq!(config.retry_delay, Duration::from_millis(50));
    }

    #[test]
    fn labels_are_hosts() {
        assert_eq!(
            endpoint_label("https://overpass-api.de/api/interpreter"),
            "overpass-api.de"
        );
        assert_eq!(endpoint_label("localhost:8080/x"), "localhost:8080");
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt() {
        let transport = MockTransport::scripted(vec![Ok(HttpReply::ok(ONE_NODE))]);
        let client = QueryClient::new(transport, config());

        let start = Instant::now();
        let response = client.execute("node(1);out;").await.unwrap();

        assert_eq!(response.elements.len(), 1);
        assert_eq!(response.elements[0].id, 7);
        assert_eq!(start.elapsed(), Duration::ZERO);
        let calls = client.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://primary.test/api");
        assert_eq!(calls[0].1, "node(1);out;");
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_backs_off_then_retries_same_endpoint() {
        let transport = MockTransport::scripted(vec![
            Ok(HttpReply::status(429)),
            Ok(HttpReply::ok(ONE_NODE)),
        ]);
        let client = QueryClient::new(transport, config());

        let start = Instant::now();
        let response = client.execute("q").await.unwrap();

        assert_eq!(response.elements[0].id, 7);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
        let endpoints: Vec<_> = client.transport().calls().into_iter().map(|c| c.0).collect();
        assert_eq!(endpoints, ["https://primary.test/api", "https://primary.test/api"]);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_backoff_grows_linearly() {
        let transport = MockTransport::scripted(vec![
            Ok(HttpReply::status(429)),
            Ok(HttpReply::status(429)),
            Ok(HttpReply::ok(EMPTY)),
        ]);
        let client = QueryClient::new(transport, config());

        let start = Instant::now();
        assert!(client.execute("q").await.is_some());
        // 10s after the first 429, 20s after the second
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn server_error_moves_to_next_endpoint_immediately() {
        let transport = MockTransport::scripted(vec![
            Ok(HttpReply::status(503)),
            Ok(HttpReply::ok(EMPTY)),
        ]);
        let client = QueryClient::new(transport, config());

        let start = Instant::now();
        assert!(client.execute("q").await.is_some());

        assert_eq!(start.elapsed(), Duration::ZERO);
        let endpoints: Vec<_> = client.transport().calls().into_iter().map(|c| c.0).collect();
        assert_eq!(endpoints, ["https://primary.test/api", "https://mirror.test/api"]);
    }

    #[tokio::test(start_paused = true)]
    async fn all_endpoints_failing_returns_none() {
        let transport = MockTransport::new(|_, _| Ok(HttpReply::status(500)));
        let client = QueryClient::new(transport, config());

        assert!(client.execute("q").await.is_none());
        // One attempt per endpoint, no retries on 5xx
        assert_eq!(client.transport().call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_retry_then_fail_over() {
        let transport = MockTransport::scripted(vec![
            Err(OverpassError::Transport("reset".into())),
            Err(OverpassError::Transport("reset".into())),
            Err(OverpassError::Transport("reset".into())),
            Ok(HttpReply::ok(EMPTY)),
        ]);
        let client = QueryClient::new(transport, config());

        let start = Instant::now();
        assert!(client.execute("q").await.is_some());

        // Delays after the first two failures only
        assert_eq!(start.elapsed(), Duration::from_secs(4));
        let endpoints: Vec<_> = client.transport().calls().into_iter().map(|c| c.0).collect();
        assert_eq!(
            endpoints,
            [
                "https://primary.test/api",
                "https://primary.test/api",
                "https://primary.test/api",
                "https://mirror.test/api",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_status_retries_after_delay() {
        let transport = MockTransport::scripted(vec![
            Ok(HttpReply::status(400)),
            Ok(HttpReply::ok(EMPTY)),
        ]);
        let client = QueryClient::new(transport, config());

        let start = Instant::now();
        assert!(client.execute("q").await.is_some());
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        assert_eq!(client.transport().call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_json_counts_as_failed_attempt() {
        let transport = MockTransport::scripted(vec![
            Ok(HttpReply::ok("<html>busy</html>")),
            Ok(HttpReply::ok(ONE_NODE)),
        ]);
        let client = QueryClient::new(transport, config());

        let response = client.execute("q").await.unwrap();
        assert_eq!(response.elements.len(), 1);
        assert_eq!(client.transport().call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempt_is_abandoned_at_timeout() {
        let transport = MockTransport::new(|_, _| Ok(HttpReply::ok(ONE_NODE)))
            .with_latency(Duration::from_secs(600));
        let client = QueryClient::new(
            transport,
            config()
                .with_endpoints(["https://only.test/api"])
                .with_max_retries(1),
        );

        let start = Instant::now();
        assert!(client.execute("q").await.is_none());
        assert_eq!(start.elapsed(), Duration::from_secs(180));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_rate_limit_falls_through_without_final_wait() {
        let transport = MockTransport::new(|endpoint, _| {
            if endpoint.contains("primary") {
                Ok(HttpReply::status(429))
            } else {
                Ok(HttpReply::ok(EMPTY))
            }
        });
        let client = QueryClient::new(transport, config());

        let start = Instant::now();
        assert!(client.execute("q").await.is_some());
        // Waits 10s and 20s; the third 429 moves on directly
        assert_eq!(start.elapsed(), Duration::from_secs(30));
        assert_eq!(client.transport().call_count(), 4);
    }

    #[test]
    fn classify_statuses() {
        assert!(matches!(classify(HttpReply::status(429)), Attempt::RateLimited));
        assert!(matches!(
            classify(HttpReply::status(504)),
            Attempt::ServerError(504)
        ));
        assert!(matches!(classify(HttpReply::status(403)), Attempt::Rejected(403)));
        assert!(matches!(classify(HttpReply::ok(EMPTY)), Attempt::Success(_)));
        assert!(matches!(
            classify(HttpReply::ok("nope")),
            Attempt::Failed(OverpassError::Json { .. })
        ));
    }

    #[test]
    fn unparseable_body_is_kept_truncated() {
        let page = format!("<html>{}</html>", "x".repeat(500));
        match classify(HttpReply::ok(page)) {
            Attempt::Failed(err) => {
                let snippet = err.body_snippet().unwrap();
                assert!(snippet.starts_with("<html>"));
                assert_eq!(snippet.chars().count(), BODY_SNIPPET_CHARS);
            }
            _ => panic!("expected a failed attempt"),
        }
    }
}

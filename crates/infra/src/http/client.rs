use std::sync::Arc;
use std::time::Duration;

use hrlink_domain::{HrLinkError, TransportError, TransportErrorKind};
use reqwest::{Client as ReqwestClient, Method, Request, RequestBuilder, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::backoff::{Backoff, RetryPolicy, Sleeper, TokioSleeper};
use crate::errors::InfraError;

/// Longest vendor error body forwarded to callers
const MAX_ERROR_DETAIL_CHARS: usize = 1_000;

/// HTTP client with built-in retry, timeout and cancellation support.
///
/// Only 2xx responses are returned. 4xx answers (other than 429) fail
/// immediately as `VendorClient`; 429, 5xx and connection failures are
/// retried with exponential backoff until the attempt budget is spent.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("policy", &self.policy)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, HrLinkError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Token that aborts in-flight requests and backoff waits when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Execute the provided request builder with retry semantics and return
    /// the body of the first successful answer.
    ///
    /// Reading the body is part of each attempt: a connection that drops or
    /// times out mid-body counts as a `ConnectionFailure` and is retried.
    ///
    /// # Errors
    /// - `VendorClient` for non-retryable vendor answers
    /// - `Transport(Exhausted)` once `max_attempts` transient failures were
    ///   observed, with the final cause and status attached
    /// - `Transport(Cancelled)` when the cancellation token fires
    pub async fn send_bytes(&self, builder: RequestBuilder) -> Result<Vec<u8>, HrLinkError> {
        let mut backoff = Backoff::new(self.policy);

        loop {
            let attempt = backoff.begin_attempt();

            let cloned_builder = builder.try_clone().ok_or_else(|| {
                HrLinkError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder.build().map_err(|err| {
                let infra: InfraError = err.into();
                HrLinkError::from(infra)
            })?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, %method, path = url.path(), "sending HTTP request");

            let outcome = tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    return Err(TransportError::cancelled(attempt).into());
                }
                outcome = self.attempt(request) => outcome,
            };

            let failure = match outcome {
                Attempt::Body(body) => return Ok(body),
                Attempt::Rejected(err) => return Err(err),
                Attempt::Transient(failure) => {
                    debug!(
                        attempt,
                        %method,
                        path = url.path(),
                        cause = %failure.kind,
                        detail = %failure.detail,
                        "HTTP attempt failed"
                    );
                    failure.with_attempts(attempt)
                }
            };

            let Some(delay) = backoff.next_delay() else {
                warn!(
                    attempts = attempt,
                    last_cause = %failure.kind,
                    status = failure.status,
                    path = url.path(),
                    "Vendor retries exhausted"
                );
                return Err(TransportError::exhausted(failure, attempt).into());
            };

            debug!(
                attempt,
                cause = %failure.kind,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "retrying vendor request after backoff"
            );

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    return Err(TransportError::cancelled(attempt).into());
                }
                () = self.sleeper.sleep(delay) => {}
            }
        }
    }

    /// One request/response exchange, body included.
    async fn attempt(&self, request: Request) -> Attempt {
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) if should_retry_error(&err) => {
                return Attempt::Transient(TransportError::new(
                    TransportErrorKind::ConnectionFailure,
                    err.to_string(),
                ));
            }
            Err(err) => {
                let infra: InfraError = err.into();
                return Attempt::Rejected(infra.into());
            }
        };

        let status = response.status();
        debug!(%status, "received HTTP response");

        if status.is_success() {
            return match response.bytes().await {
                Ok(body) => Attempt::Body(body.to_vec()),
                Err(err) => Attempt::Transient(TransportError::new(
                    TransportErrorKind::ConnectionFailure,
                    format!("response body interrupted: {err}"),
                )),
            };
        }

        match classify_status(status) {
            Some(kind) => Attempt::Transient(
                TransportError::new(kind, format!("HTTP {status}")).with_status(status.as_u16()),
            ),
            None => Attempt::Rejected(HrLinkError::VendorClient {
                status: status.as_u16(),
                detail: error_detail(response).await,
            }),
        }
    }
}

/// Outcome of a single attempt inside the retry loop.
enum Attempt {
    Body(Vec<u8>),
    /// Worth another try after backoff
    Transient(TransportError),
    /// Final, returned to the caller as is
    Rejected(HrLinkError),
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    timeout: Duration,
    policy: RetryPolicy,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
    sleeper: Arc<dyn Sleeper>,
    cancel: Option<CancellationToken>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            policy: RetryPolicy::default(),
            user_agent: None,
            default_headers: None,
            sleeper: Arc::new(TokioSleeper),
            cancel: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.policy.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.policy.base_delay = backoff;
        self
    }

    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.policy.max_delay = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn build(self) -> Result<HttpClient, HrLinkError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            HrLinkError::from(infra)
        })?;

        let mut policy = self.policy;
        policy.max_attempts = policy.max_attempts.max(1);

        Ok(HttpClient {
            client,
            policy,
            sleeper: self.sleeper,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// Transient failure kind for a non-success status, `None` when the status
/// must not be retried.
fn classify_status(status: StatusCode) -> Option<TransportErrorKind> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        Some(TransportErrorKind::RateLimited)
    } else if status.is_server_error() {
        Some(TransportErrorKind::ServerError)
    } else {
        None
    }
}

async fn error_detail(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.trim().is_empty() => {
            body.trim().chars().take(MAX_ERROR_DETAIL_CHARS).collect()
        }
        _ => status.canonical_reason().unwrap_or("vendor rejected the request").to_string(),
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::Method;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::backoff::RecordingSleeper;

    fn client_with(sleeper: &RecordingSleeper, attempts: u32) -> HttpClient {
        HttpClient::builder()
            .base_backoff(Duration::from_millis(10))
            .max_backoff(Duration::from_secs(1))
            .max_attempts(attempts)
            .sleeper(Arc::new(sleeper.clone()))
            .build()
            .expect("http client")
    }

    /// Raw server that promises a 500 byte JSON body, sends 10 bytes and
    /// hangs up. Returns its URL and a count of accepted connections.
    async fn truncating_server() -> (String, Arc<AtomicUsize>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { break };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let head = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 500\r\n\r\n";
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(b"{\"data\": [").await;
                let _ = socket.shutdown().await;
            }
        });

        (url, connections)
    }

    #[tokio::test]
    async fn returns_successful_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 3);
        let body =
            client.send_bytes(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(body, b"ok");
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn retries_rate_limits_with_increasing_delays() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                let current = attempts_clone.fetch_add(1, Ordering::SeqCst);
                if current < 2 {
                    ResponseTemplate::new(429)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 3);
        client.send_bytes(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        let delays = sleeper.delays();
        assert_eq!(delays.len(), 2);
        assert!(delays[0] < delays[1], "delays should grow: {delays:?}");
    }

    #[tokio::test]
    async fn persistent_server_errors_exhaust_the_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 4);
        let err = client.send_bytes(client.request(Method::GET, server.uri())).await.unwrap_err();

        match err {
            HrLinkError::Transport(transport) => {
                assert_eq!(transport.kind, TransportErrorKind::Exhausted);
                assert_eq!(transport.last_cause, Some(TransportErrorKind::ServerError));
                assert_eq!(transport.status, Some(500));
                assert_eq!(transport.attempts, 4);
            }
            other => panic!("expected exhausted transport error, got {other:?}"),
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 4);
        assert_eq!(sleeper.delays().len(), 3);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{\"error\":\"no such path\"}"))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 3);
        let err = client.send_bytes(client.request(Method::GET, server.uri())).await.unwrap_err();

        match err {
            HrLinkError::VendorClient { status, detail } => {
                assert_eq!(status, 404);
                assert!(detail.contains("no such path"));
            }
            other => panic!("expected vendor client error, got {other:?}"),
        }
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn retries_on_network_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED
        let url = format!("http://{addr}");

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 2);

        let err = client.send_bytes(client.request(Method::GET, &url)).await.unwrap_err();
        match err {
            HrLinkError::Transport(transport) => {
                assert_eq!(transport.kind, TransportErrorKind::Exhausted);
                assert_eq!(transport.last_cause, Some(TransportErrorKind::ConnectionFailure));
                assert_eq!(transport.status, None);
            }
            other => panic!("expected exhausted transport error, got {other:?}"),
        }
        assert_eq!(sleeper.delays().len(), 1);
    }

    #[tokio::test]
    async fn truncated_body_is_retried_as_connection_failure() {
        let (url, connections) = truncating_server().await;

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 3);
        let err = client.send_bytes(client.request(Method::GET, &url)).await.unwrap_err();

        match err {
            HrLinkError::Transport(transport) => {
                assert_eq!(transport.kind, TransportErrorKind::Exhausted);
                assert_eq!(transport.last_cause, Some(TransportErrorKind::ConnectionFailure));
                assert_eq!(transport.attempts, 3);
            }
            other => panic!("expected exhausted transport error, got {other:?}"),
        }
        assert_eq!(connections.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.delays().len(), 2);
    }

    #[tokio::test]
    async fn cancellation_aborts_backoff_wait() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(503)).mount(&server).await;

        let token = CancellationToken::new();
        let client = HttpClient::builder()
            .base_backoff(Duration::from_secs(60))
            .max_backoff(Duration::from_secs(60))
            .max_attempts(3)
            .cancellation_token(token.clone())
            .build()
            .expect("http client");

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        });

        let started = std::time::Instant::now();
        let err = client.send_bytes(client.request(Method::GET, server.uri())).await.unwrap_err();
        canceller.await.unwrap();

        assert_eq!(err.transport_kind(), Some(TransportErrorKind::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

        let client = HttpClient::builder().build().expect("http client");
        client.cancellation_token().cancel();

        let err = client.send_bytes(client.request(Method::GET, server.uri())).await.unwrap_err();
        assert_eq!(err.transport_kind(), Some(TransportErrorKind::Cancelled));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

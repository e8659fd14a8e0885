//! Sesame HTTP transport
//!
//! Executes [`VendorRequest`]s against the configured Sesame host through the
//! retrying [`HttpClient`] and unwraps the `{"data", "meta"}` envelope into a
//! [`RawPage`].

use std::time::Duration;

use async_trait::async_trait;
use hrlink_core::{RawPage, VendorRequest, VendorTransport};
use hrlink_domain::{HrLinkError, Result, RetryConfig, VendorConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use url::Url;

use super::wire::Envelope;
use crate::errors::InfraError;
use crate::http::{HttpClient, RetryPolicy};

/// Query parameter Sesame reads the page number from
const PAGE_PARAM: &str = "page";

#[derive(Debug, Clone)]
pub struct SesameTransport {
    http: HttpClient,
    base_url: Url,
}

impl SesameTransport {
    pub fn new(http: HttpClient, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| HrLinkError::from(InfraError::from(e)))?;
        Ok(Self { http, base_url })
    }

    /// Build a transport whose client sends the configured API key on every
    /// call.
    ///
    /// # Errors
    /// Returns `HrLinkError::Config` when the base URL or API key cannot be
    /// used.
    pub fn from_config(
        vendor: &VendorConfig,
        retry: &RetryConfig,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(vendor.timeout_secs))
            .retry_policy(RetryPolicy::from(retry))
            .user_agent(concat!("hrlink/", env!("CARGO_PKG_VERSION")))
            .default_headers(auth_headers(vendor)?)
            .cancellation_token(cancel)
            .build()?;

        Self::new(http, &vendor.base_url)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.http.cancellation_token()
    }

    /// Absolute URL for `path`, with `resource_id` appended as an escaped
    /// path segment.
    fn url_for(&self, path: &str, resource_id: Option<&str>) -> Result<Url> {
        let joined =
            format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path.trim_start_matches('/'));
        let mut url = Url::parse(&joined).map_err(|e| HrLinkError::from(InfraError::from(e)))?;

        if let Some(id) = resource_id {
            url.path_segments_mut()
                .map_err(|()| HrLinkError::Config(format!("vendor base URL {} cannot hold a path", self.base_url)))?
                .pop_if_empty()
                .push(id);
        }
        Ok(url)
    }
}

/// Default headers carrying the bearer credential, marked sensitive so it
/// never appears in debug output.
pub fn auth_headers(vendor: &VendorConfig) -> Result<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", vendor.api_key.expose()))
        .map_err(|_| HrLinkError::Config("vendor.api_key contains invalid header characters".into()))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[async_trait]
impl VendorTransport for SesameTransport {
    #[instrument(skip(self, request), fields(resource = %request.resource, path = %request.path, cursor = ?request.cursor))]
    async fn execute(&self, request: &VendorRequest) -> Result<RawPage> {
        let mut query: Vec<(&str, &str)> =
            request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        if let Some(cursor) = &request.cursor {
            query.push((PAGE_PARAM, cursor.as_str()));
        }

        let url = self.url_for(&request.path, request.resource_id.as_deref())?;
        let builder = self.http.request(Method::GET, url).query(&query);

        let bytes = self.http.send_bytes(builder).await?;
        let envelope: Envelope =
            serde_json::from_slice(&bytes).map_err(|e| HrLinkError::from(InfraError::from(e)))?;

        let records = match envelope.data {
            Some(Value::Array(items)) => items,
            Some(Value::Object(object)) => vec![Value::Object(object)],
            Some(other) => {
                return Err(HrLinkError::InvalidPayload(format!(
                    "vendor data for {} is neither an object nor a list: {other}",
                    request.resource
                )))
            }
            None => {
                return Err(HrLinkError::InvalidPayload(format!(
                    "vendor response for {} has no data field",
                    request.resource
                )))
            }
        };

        let meta = envelope.meta.unwrap_or_default();
        let page_number = meta
            .current_page
            .or_else(|| request.cursor.as_deref().and_then(|c| c.parse().ok()))
            .unwrap_or(1);

        Ok(RawPage { records, next_cursor: meta.next_cursor(), page_number })
    }
}

#[cfg(test)]
mod tests {
    use hrlink_domain::{ResourceKind, TransportErrorKind};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn transport(server: &MockServer) -> SesameTransport {
        let vendor = VendorConfig::new(server.uri(), "test-key");
        let retry = RetryConfig { max_attempts: 2, base_delay_ms: 1, max_delay_ms: 5 };
        SesameTransport::from_config(&vendor, &retry, CancellationToken::new()).unwrap()
    }

    #[tokio::test]
    async fn sends_bearer_key_and_reads_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/core/v3/employees"))
            .and(header("authorization", "Bearer test-key"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "E1"}, {"id": "E2"}],
                "meta": {"currentPage": 2, "lastPage": 3}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = VendorRequest::get(ResourceKind::Employees, "/core/v3/employees")
            .with_cursor(Some("2".into()));
        let page = transport(&server).execute(&request).await.unwrap();

        assert_eq!(page.records.len(), 2);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.next_cursor.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn object_data_becomes_single_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/core/v3/info"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"company": {"id": "C1", "name": "Acme"}}})),
            )
            .mount(&server)
            .await;

        let request = VendorRequest::get(ResourceKind::AccountInfo, "/core/v3/info");
        let page = transport(&server).execute(&request).await.unwrap();

        assert_eq!(page.records.len(), 1);
        assert_eq!(page.next_cursor, None);
        assert_eq!(page.page_number, 1);
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let request = VendorRequest::get(ResourceKind::Employees, "/core/v3/employees");
        let err = transport(&server).execute(&request).await.unwrap_err();
        assert!(matches!(err, HrLinkError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn missing_data_is_invalid_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {}})))
            .mount(&server)
            .await;

        let request = VendorRequest::get(ResourceKind::Employees, "/core/v3/employees");
        let err = transport(&server).execute(&request).await.unwrap_err();
        assert!(matches!(err, HrLinkError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn server_errors_surface_as_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .expect(2)
            .mount(&server)
            .await;

        let request = VendorRequest::get(ResourceKind::Employees, "/core/v3/employees");
        let err = transport(&server).execute(&request).await.unwrap_err();
        assert_eq!(err.transport_kind(), Some(TransportErrorKind::Exhausted));
    }

    #[test]
    fn auth_header_is_sensitive() {
        let headers = auth_headers(&VendorConfig::new("https://example.test", "k")).unwrap();
        let value = headers.get(AUTHORIZATION).unwrap();
        assert!(value.is_sensitive());
        assert!(!format!("{value:?}").contains('k'));
    }

    #[test]
    fn url_join_tolerates_slashes() {
        let http = HttpClient::new().unwrap();
        let transport = SesameTransport::new(http, "https://api.example.test/").unwrap();
        let url = transport.url_for("/core/v3/info", None).unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/core/v3/info");
    }

    #[test]
    fn resource_id_is_an_escaped_path_segment() {
        let http = HttpClient::new().unwrap();
        let transport = SesameTransport::new(http, "https://api.example.test").unwrap();

        let url = transport.url_for("/core/v3/employees", Some("E1")).unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/core/v3/employees/E1");

        let url = transport.url_for("/core/v3/employees", Some("a/b c")).unwrap();
        assert_eq!(url.path(), "/core/v3/employees/a%2Fb%20c");
    }

    #[tokio::test]
    async fn lookup_requests_hit_the_record_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/core/v3/employees/E7"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "E7"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request =
            VendorRequest::get(ResourceKind::Employees, "/core/v3/employees").with_resource_id("E7");
        let page = transport(&server).execute(&request).await.unwrap();

        assert_eq!(page.records, vec![json!({"id": "E7"})]);
    }

    #[tokio::test]
    async fn truncated_body_is_retried_then_exhausted() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let connections = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = connections.clone();
        tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 500\r\n\r\n{\"data\": [")
                    .await;
                let _ = socket.shutdown().await;
            }
        });

        let vendor = VendorConfig::new(base, "test-key");
        let retry = RetryConfig { max_attempts: 3, base_delay_ms: 1, max_delay_ms: 5 };
        let transport = SesameTransport::from_config(&vendor, &retry, CancellationToken::new()).unwrap();

        let request = VendorRequest::get(ResourceKind::Employees, "/core/v3/employees");
        let err = transport.execute(&request).await.unwrap_err();

        match err {
            HrLinkError::Transport(transport) => {
                assert_eq!(transport.kind, TransportErrorKind::Exhausted);
                assert_eq!(transport.last_cause, Some(TransportErrorKind::ConnectionFailure));
            }
            other => panic!("expected exhausted transport error, got {other:?}"),
        }
        assert_eq!(connections.load(std::sync::atomic::Ordering::SeqCst), 3);
    }
}

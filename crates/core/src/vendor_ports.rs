//! Vendor transport port
//!
//! The transport is the only seam that touches the network. Everything the
//! integration client needs from the vendor goes through
//! [`VendorTransport::execute`]; the sequential pagination loop is provided
//! on top of it so every adapter gets the same page-limit and cursor rules.

use std::collections::HashSet;

use async_trait::async_trait;
use hrlink_domain::{HrLinkError, ResourceKind, Result, TransportError, TransportErrorKind};
use serde_json::Value;

/// A vendor-shaped GET request, produced from a caller filter by a request
/// builder. Query pairs keep their order; repeated keys are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRequest {
    pub resource: ResourceKind,
    pub path: String,
    /// Single-record lookup: appended to `path` as one escaped segment
    pub resource_id: Option<String>,
    pub query: Vec<(String, String)>,
    /// Continuation cursor, sent by the transport in the vendor's own format
    pub cursor: Option<String>,
}

impl VendorRequest {
    pub fn get(resource: ResourceKind, path: impl Into<String>) -> Self {
        Self { resource, path: path.into(), resource_id: None, query: Vec::new(), cursor: None }
    }

    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }

    /// All values sent for `key`, in order.
    pub fn query_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// One vendor page before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub records: Vec<Value>,
    /// Present when the vendor has more data for the same request
    pub next_cursor: Option<String>,
    /// 1-based vendor page number, used to locate skipped records
    pub page_number: u32,
}

#[async_trait]
pub trait VendorTransport: Send + Sync {
    /// Execute a single vendor call, retrying transient failures.
    async fn execute(&self, request: &VendorRequest) -> Result<RawPage>;

    /// Follow continuation cursors until the vendor reports no more data.
    ///
    /// Pages are fetched strictly one after another and returned in vendor
    /// order.
    ///
    /// # Errors
    /// - `Transport(PaginationLimitExceeded)` when `max_pages` pages were
    ///   fetched and the vendor still signals more
    /// - `InvalidPayload` when the vendor hands back a cursor that was
    ///   already followed
    /// - any error from [`execute`](Self::execute)
    async fn fetch_pages(&self, request: VendorRequest, max_pages: u32) -> Result<Vec<RawPage>> {
        let mut seen: HashSet<String> = request.cursor.iter().cloned().collect();
        let mut pages: Vec<RawPage> = Vec::new();
        let mut current = request;

        loop {
            let page = self.execute(&current).await?;
            let next = page.next_cursor.clone();
            pages.push(page);

            let Some(cursor) = next else {
                break;
            };

            if !seen.insert(cursor.clone()) {
                return Err(HrLinkError::InvalidPayload(format!(
                    "vendor repeated pagination cursor {cursor} for {}",
                    current.resource
                )));
            }

            if pages.len() >= max_pages as usize {
                tracing::warn!(
                    resource = %current.resource,
                    max_pages,
                    "Vendor still reports more pages after the configured limit"
                );
                return Err(TransportError::new(
                    TransportErrorKind::PaginationLimitExceeded,
                    format!("more than {max_pages} pages for {}", current.resource),
                )
                .into());
            }

            tracing::debug!(resource = %current.resource, cursor = %cursor, "Following page cursor");
            current = current.with_cursor(Some(cursor));
        }

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Replays scripted pages and records the cursor of every call.
    struct ScriptedTransport {
        pages: Mutex<VecDeque<Result<RawPage>>>,
        cursors: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedTransport {
        fn new(pages: Vec<Result<RawPage>>) -> Self {
            Self { pages: Mutex::new(pages.into()), cursors: Mutex::new(Vec::new()) }
        }

        fn cursors(&self) -> Vec<Option<String>> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VendorTransport for ScriptedTransport {
        async fn execute(&self, request: &VendorRequest) -> Result<RawPage> {
            self.cursors.lock().unwrap().push(request.cursor.clone());
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(HrLinkError::Internal("script exhausted".into())))
        }
    }

    fn page(number: u32, ids: &[&str], next: Option<&str>) -> Result<RawPage> {
        Ok(RawPage {
            records: ids.iter().map(|id| json!({ "id": id })).collect(),
            next_cursor: next.map(str::to_string),
            page_number: number,
        })
    }

    fn request() -> VendorRequest {
        VendorRequest::get(ResourceKind::Employees, "/core/v3/employees")
    }

    #[tokio::test]
    async fn follows_cursors_in_order() {
        let transport = ScriptedTransport::new(vec![
            page(1, &["a", "b"], Some("2")),
            page(2, &["c"], Some("3")),
            page(3, &["d"], None),
        ]);

        let pages = transport.fetch_pages(request(), 10).await.unwrap();

        let ids: Vec<_> =
            pages.iter().flat_map(|p| p.records.iter()).map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("b"), json!("c"), json!("d")]);
        assert_eq!(
            transport.cursors(),
            vec![None, Some("2".to_string()), Some("3".to_string())]
        );
    }

    #[tokio::test]
    async fn stops_at_page_limit() {
        let transport = ScriptedTransport::new(vec![
            page(1, &["a"], Some("2")),
            page(2, &["b"], Some("3")),
            page(3, &["c"], None),
        ]);

        let err = transport.fetch_pages(request(), 2).await.unwrap_err();

        assert_eq!(err.transport_kind(), Some(TransportErrorKind::PaginationLimitExceeded));
        assert_eq!(transport.cursors().len(), 2);
    }

    #[tokio::test]
    async fn exactly_max_pages_is_allowed() {
        let transport =
            ScriptedTransport::new(vec![page(1, &["a"], Some("2")), page(2, &["b"], None)]);

        let pages = transport.fetch_pages(request(), 2).await.unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[tokio::test]
    async fn repeated_cursor_is_invalid_payload() {
        let transport = ScriptedTransport::new(vec![
            page(1, &["a"], Some("2")),
            page(2, &["b"], Some("2")),
        ]);

        let err = transport.fetch_pages(request(), 10).await.unwrap_err();
        assert!(matches!(err, HrLinkError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn failure_mid_stream_is_propagated() {
        let transport = ScriptedTransport::new(vec![
            page(1, &["a"], Some("2")),
            Err(HrLinkError::VendorClient { status: 403, detail: "forbidden".into() }),
        ]);

        let err = transport.fetch_pages(request(), 10).await.unwrap_err();
        assert!(matches!(err, HrLinkError::VendorClient { status: 403, .. }));
    }

    #[test]
    fn query_values_keep_order() {
        let request = request()
            .with_query("employeeIds[in]", "E2")
            .with_query("limit", "10")
            .with_query("employeeIds[in]", "E1");
        assert_eq!(request.query_values("employeeIds[in]").collect::<Vec<_>>(), vec!["E2", "E1"]);
    }
}

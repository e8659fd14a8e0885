//! Sesame integration client
//!
//! Implements [`HrDirectory`] on top of any [`VendorTransport`]. Each
//! operation validates the caller's filter, builds the vendor request,
//! fetches one page or all pages, and normalizes the result.

use std::sync::Arc;

use async_trait::async_trait;
use hrlink_core::{HrDirectory, RawPage, VendorTransport};
use hrlink_domain::{
    AccountInfo, Config, Employee, Fetched, Filter, HrLinkError, Page, PaginationConfig,
    Result, TimeEntry, WorkEntry, WorkedHoursRecord,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::normalizer::{normalize_page_with, VendorRecord};
use super::request;
use super::transport::SesameTransport;

#[derive(Clone)]
pub struct SesameClient {
    transport: Arc<dyn VendorTransport>,
    max_pages: u32,
}

impl SesameClient {
    pub fn new(transport: Arc<dyn VendorTransport>, pagination: &PaginationConfig) -> Self {
        Self { transport, max_pages: pagination.max_pages.max(1) }
    }

    /// Client backed by the Sesame HTTP transport described by `config`.
    ///
    /// # Errors
    /// Returns `HrLinkError::Config` for an invalid configuration.
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self> {
        config.validate()?;
        let transport = SesameTransport::from_config(&config.vendor, &config.retry, cancel)?;
        Ok(Self::new(Arc::new(transport), &config.pagination))
    }

    /// Fetch and normalize records of type `R`.
    ///
    /// Without a page request every vendor page is fetched and concatenated,
    /// and the result carries no cursor. With a page request exactly one
    /// vendor page is fetched and the vendor's cursor is handed back.
    ///
    /// Filters that fan out into several vendor requests are executed one
    /// after another, in identifier order. A record lookup the vendor answers
    /// with 404 contributes no records.
    async fn list<R: VendorRecord>(&self, filter: &Filter) -> Result<Page<R>> {
        filter.validate()?;
        let vendor_requests = request::build(R::RESOURCE, filter)?;

        let mut raw_pages: Vec<RawPage> = Vec::new();
        let mut next_cursor: Option<String> = None;

        for vendor_request in vendor_requests {
            let lookup = vendor_request.resource_id.clone();

            let fetched = if filter.page.is_some() {
                self.transport.execute(&vendor_request).await.map(|page| {
                    next_cursor = page.next_cursor.clone();
                    vec![page]
                })
            } else {
                self.transport.fetch_pages(vendor_request, self.max_pages).await
            };

            match fetched {
                Ok(pages) => raw_pages.extend(pages),
                Err(HrLinkError::VendorClient { status: 404, .. }) if lookup.is_some() => {
                    debug!(resource = %R::RESOURCE, id = ?lookup, "Vendor has no record for lookup");
                }
                Err(err) => return Err(err),
            }
        }

        let page_count = raw_pages.len();
        let mut result = Page::default();
        for raw in raw_pages {
            let page = normalize_page_with::<R>(raw, filter);
            result.records.extend(page.records);
            result.diagnostics.merge(page.diagnostics);
        }
        result.next_cursor = next_cursor;

        debug!(
            resource = %R::RESOURCE,
            pages = page_count,
            records = result.records.len(),
            skipped = result.diagnostics.skipped_count(),
            "Normalized vendor records"
        );
        Ok(result)
    }
}

impl std::fmt::Debug for SesameClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SesameClient").field("max_pages", &self.max_pages).finish_non_exhaustive()
    }
}

#[async_trait]
impl HrDirectory for SesameClient {
    #[instrument(skip(self))]
    async fn account_info(&self) -> Result<Fetched<AccountInfo>> {
        let page = self.list::<AccountInfo>(&Filter::default()).await?;
        let Page { records, diagnostics, .. } = page;

        match records.into_iter().next() {
            Some(record) => Ok(Fetched { record, diagnostics }),
            None => {
                let reason = diagnostics
                    .skipped
                    .first()
                    .map(|s| s.reason.label())
                    .unwrap_or("empty response");
                Err(HrLinkError::InvalidPayload(format!(
                    "vendor account info is unusable: {reason}"
                )))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_employees(&self, filter: &Filter) -> Result<Page<Employee>> {
        self.list(filter).await
    }

    #[instrument(skip(self))]
    async fn get_employee(&self, id: &str) -> Result<Fetched<Employee>> {
        if id.trim().is_empty() {
            return Err(HrLinkError::Validation("employee id must not be empty".into()));
        }

        let filter = Filter::new().with_employee_ids([id]);
        let Page { records, diagnostics, .. } = self.list::<Employee>(&filter).await?;

        let count = records.len();
        let mut matches = records.into_iter();
        match (matches.next(), count) {
            (Some(record), 1) => Ok(Fetched { record, diagnostics }),
            (None, _) => Err(HrLinkError::NotFound(format!("employee {id}"))),
            (Some(_), count) => Err(HrLinkError::AmbiguousResult { id: id.to_string(), count }),
        }
    }

    #[instrument(skip(self))]
    async fn list_worked_hours(&self, filter: &Filter) -> Result<Page<WorkedHoursRecord>> {
        self.list(filter).await
    }

    #[instrument(skip(self))]
    async fn list_work_entries(&self, filter: &Filter) -> Result<Page<WorkEntry>> {
        self.list(filter).await
    }

    #[instrument(skip(self))]
    async fn list_time_entries(&self, filter: &Filter) -> Result<Page<TimeEntry>> {
        self.list(filter).await
    }
}

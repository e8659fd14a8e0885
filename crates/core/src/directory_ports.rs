//! HR directory port
//!
//! The operations internal callers may perform against the HR vendor,
//! expressed purely in domain types. The exposure layer depends on this
//! trait only.

use async_trait::async_trait;
use hrlink_domain::{
    AccountInfo, Employee, Fetched, Filter, Page, Result, TimeEntry, WorkEntry, WorkedHoursRecord,
};

#[async_trait]
pub trait HrDirectory: Send + Sync {
    /// Company the configured credentials belong to
    async fn account_info(&self) -> Result<Fetched<AccountInfo>>;

    async fn list_employees(&self, filter: &Filter) -> Result<Page<Employee>>;

    /// Single employee by vendor identifier.
    ///
    /// # Errors
    /// `NotFound` when no employee matches, `AmbiguousResult` when the vendor
    /// returns more than one record for the identifier.
    async fn get_employee(&self, id: &str) -> Result<Fetched<Employee>>;

    async fn list_worked_hours(&self, filter: &Filter) -> Result<Page<WorkedHoursRecord>>;

    async fn list_work_entries(&self, filter: &Filter) -> Result<Page<WorkEntry>>;

    async fn list_time_entries(&self, filter: &Filter) -> Result<Page<TimeEntry>>;
}

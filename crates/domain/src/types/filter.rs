//! Caller-shaped query filter
//!
//! A [`Filter`] describes what the caller wants, independently of how the
//! vendor expects it to be asked. Every bound is optional; an absent bound is
//! unbounded on that axis.
//!
//! Date range and employee identifiers are enforced twice: by the vendor and
//! again while normalizing. The remaining criteria ([`EmployeeCriteria`],
//! [`UpdatedWindow`], deletion scope, check details, ordering) are passed to
//! the vendor only.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{HrLinkError, Result};
use crate::types::employee::EmploymentStatus;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: u32 = 500;

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    /// Returns `HrLinkError::Validation` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(HrLinkError::Validation(format!(
                "date range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Caller-driven pagination: resume from `cursor`, ask for `size` records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub size: Option<u32>,
}

/// Employee attributes the vendor can search on.
///
/// `status` also restricts time entries to employees in that state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeCriteria {
    pub status: Option<EmploymentStatus>,
    pub email: Option<String>,
    pub code: Option<String>,
    /// National identity document number
    pub dni: Option<String>,
    pub department_ids: Option<Vec<String>>,
    pub office_ids: Option<Vec<String>>,
}

impl EmployeeCriteria {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn validate(&self) -> Result<()> {
        if let Some(status) = &self.status {
            if status.is_unknown() {
                return Err(HrLinkError::Validation(format!(
                    "unsupported employee status '{status}'"
                )));
            }
        }

        for (field, value) in [("email", &self.email), ("code", &self.code), ("dni", &self.dni)] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(HrLinkError::Validation(format!("{field} must not be empty")));
            }
        }

        for (field, ids) in
            [("department_ids", &self.department_ids), ("office_ids", &self.office_ids)]
        {
            if let Some(ids) = ids {
                validate_identifiers(field, ids)?;
            }
        }
        Ok(())
    }
}

/// Bounds on the vendor's last-modified timestamp, both inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedWindow {
    pub from: Option<DateTime<FixedOffset>>,
    pub to: Option<DateTime<FixedOffset>>,
}

impl UpdatedWindow {
    fn validate(&self) -> Result<()> {
        match (self.from, self.to) {
            (None, None) => Err(HrLinkError::Validation(
                "updated-at window needs at least one bound".into(),
            )),
            (Some(from), Some(to)) if from > to => Err(HrLinkError::Validation(format!(
                "updated-at window start {} is after end {}",
                from.to_rfc3339(),
                to.to_rfc3339()
            ))),
            _ => Ok(()),
        }
    }
}

/// Which clock records to return with respect to soft deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionScope {
    All,
    NotDeleted,
    Deleted,
}

impl DeletionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::NotDeleted => "not_deleted",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for DeletionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeletionScope {
    type Err = HrLinkError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "not_deleted" => Ok(Self::NotDeleted),
            "deleted" => Ok(Self::Deleted),
            other => Err(HrLinkError::Validation(format!(
                "only_return must be one of all, not_deleted, deleted; got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub date_range: Option<DateRange>,
    pub employee_ids: Option<Vec<String>>,
    #[serde(default)]
    pub employee: EmployeeCriteria,
    pub updated_at: Option<UpdatedWindow>,
    pub only_return: Option<DeletionScope>,
    /// Ask for the clock checks behind each worked-hours row
    pub with_checks: Option<bool>,
    /// Vendor sort expression, e.g. `"lastName asc"`
    pub order_by: Option<String>,
    pub page: Option<PageRequest>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_employee_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.employee_ids =
            Some(ids.into_iter().map(|id| id.into().trim().to_string()).collect());
        self
    }

    pub fn with_employee_criteria(mut self, criteria: EmployeeCriteria) -> Self {
        self.employee = criteria;
        self
    }

    pub fn with_updated_at(mut self, window: UpdatedWindow) -> Self {
        self.updated_at = Some(window);
        self
    }

    pub fn with_only_return(mut self, scope: DeletionScope) -> Self {
        self.only_return = Some(scope);
        self
    }

    pub fn with_checks(mut self, with_checks: bool) -> Self {
        self.with_checks = Some(with_checks);
        self
    }

    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// Check the filter before it is turned into a vendor request.
    ///
    /// # Errors
    /// Returns `HrLinkError::Validation` for an inverted date range or
    /// updated-at window, an empty or whitespace-padded identifier, an empty
    /// criterion, an unknown employee status, or a page size outside
    /// `1..=MAX_PAGE_SIZE`.
    pub fn validate(&self) -> Result<()> {
        if let Some(range) = &self.date_range {
            // DateRange fields can also arrive through deserialization
            DateRange::new(range.start, range.end)?;
        }

        if let Some(ids) = &self.employee_ids {
            validate_identifiers("employee", ids)?;
        }

        self.employee.validate()?;

        if let Some(window) = &self.updated_at {
            window.validate()?;
        }

        if matches!(&self.order_by, Some(order) if order.trim().is_empty()) {
            return Err(HrLinkError::Validation("order_by must not be empty".into()));
        }

        if let Some(page) = &self.page {
            if let Some(size) = page.size {
                if size == 0 || size > MAX_PAGE_SIZE {
                    return Err(HrLinkError::Validation(format!(
                        "page size must be between 1 and {MAX_PAGE_SIZE}, got {size}"
                    )));
                }
            }
            if matches!(&page.cursor, Some(cursor) if cursor.trim().is_empty()) {
                return Err(HrLinkError::Validation("cursor must not be empty".into()));
            }
        }

        Ok(())
    }

    /// Whether `employee_id` passes the identifier bound.
    pub fn accepts_employee(&self, employee_id: &str) -> bool {
        self.employee_ids.as_ref().map_or(true, |ids| ids.iter().any(|id| id == employee_id))
    }

    /// Whether `date` passes the date bound.
    pub fn accepts_date(&self, date: NaiveDate) -> bool {
        self.date_range.map_or(true, |range| range.contains(date))
    }

    /// Cursor supplied by the caller, when driving pagination themselves.
    pub fn cursor(&self) -> Option<&str> {
        self.page.as_ref().and_then(|p| p.cursor.as_deref())
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page.as_ref().and_then(|p| p.size)
    }
}

fn validate_identifiers(field: &str, ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        return Err(HrLinkError::Validation(format!("{field} identifier list must not be empty")));
    }
    for id in ids {
        if id.trim().is_empty() {
            return Err(HrLinkError::Validation(format!("{field} identifiers must not be empty")));
        }
        // Vendor ids are compared trimmed
        if id.trim() != id {
            return Err(HrLinkError::Validation(format!(
                "{field} identifier '{id}' has surrounding whitespace"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, HrLinkError::Validation(_)));
    }

    #[test]
    fn single_day_range_is_valid() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert!(range.contains(date(2024, 1, 1)));
        assert!(!range.contains(date(2024, 1, 2)));
    }

    #[test]
    fn deserialized_inverted_range_fails_validation() {
        let filter: Filter = serde_json::from_str(
            r#"{"date_range": {"start": "2024-03-01", "end": "2024-01-01"}}"#,
        )
        .unwrap();
        assert!(matches!(filter.validate(), Err(HrLinkError::Validation(_))));
    }

    #[test]
    fn empty_identifier_list_is_rejected() {
        let filter = Filter::new().with_employee_ids(Vec::<String>::new());
        assert!(filter.validate().is_err());

        let filter = Filter::new().with_employee_ids(["E1", " "]);
        assert!(filter.validate().is_err());
    }

    #[test]
    fn builder_trims_identifiers() {
        let filter = Filter::new().with_employee_ids([" E1", "E2 "]);
        assert_eq!(filter.employee_ids, Some(vec!["E1".to_string(), "E2".to_string()]));
        assert!(filter.validate().is_ok());
        assert!(filter.accepts_employee("E1"));
    }

    #[test]
    fn padded_identifier_is_rejected_when_set_directly() {
        let filter = Filter { employee_ids: Some(vec![" E1".into()]), ..Filter::default() };
        let err = filter.validate().unwrap_err();
        assert!(err.to_string().contains("surrounding whitespace"), "{err}");
    }

    #[test]
    fn employee_criteria_are_checked() {
        let unknown = EmployeeCriteria {
            status: Some(EmploymentStatus::from_vendor("retired")),
            ..EmployeeCriteria::default()
        };
        assert!(Filter::new().with_employee_criteria(unknown).validate().is_err());

        let blank_email =
            EmployeeCriteria { email: Some("  ".into()), ..EmployeeCriteria::default() };
        assert!(Filter::new().with_employee_criteria(blank_email).validate().is_err());

        let no_offices = EmployeeCriteria { office_ids: Some(vec![]), ..EmployeeCriteria::default() };
        assert!(Filter::new().with_employee_criteria(no_offices).validate().is_err());

        let ok = EmployeeCriteria {
            status: Some(EmploymentStatus::Active),
            department_ids: Some(vec!["D1".into()]),
            ..EmployeeCriteria::default()
        };
        assert!(!ok.is_empty());
        assert!(Filter::new().with_employee_criteria(ok).validate().is_ok());
    }

    #[test]
    fn updated_window_needs_an_ordered_bound() {
        let at = |raw: &str| DateTime::parse_from_rfc3339(raw).unwrap();

        let empty = Filter::new().with_updated_at(UpdatedWindow::default());
        assert!(empty.validate().is_err());

        let inverted = Filter::new().with_updated_at(UpdatedWindow {
            from: Some(at("2024-02-01T00:00:00Z")),
            to: Some(at("2024-01-01T00:00:00Z")),
        });
        assert!(inverted.validate().is_err());

        let open_ended = Filter::new()
            .with_updated_at(UpdatedWindow { from: Some(at("2024-01-01T00:00:00+01:00")), to: None });
        assert!(open_ended.validate().is_ok());
    }

    #[test]
    fn deletion_scope_parses_vendor_spellings() {
        assert_eq!("not_deleted".parse::<DeletionScope>().unwrap(), DeletionScope::NotDeleted);
        assert_eq!(" ALL ".parse::<DeletionScope>().unwrap(), DeletionScope::All);
        assert!("gone".parse::<DeletionScope>().is_err());
        assert_eq!(DeletionScope::Deleted.to_string(), "deleted");
    }

    #[test]
    fn blank_order_by_is_rejected() {
        assert!(Filter::new().with_order_by(" ").validate().is_err());
        assert!(Filter::new().with_order_by("lastName asc").validate().is_ok());
    }

    #[test]
    fn page_size_bounds() {
        let page = |size| PageRequest { cursor: None, size: Some(size) };
        assert!(Filter::new().with_page(page(0)).validate().is_err());
        assert!(Filter::new().with_page(page(501)).validate().is_err());
        assert!(Filter::new().with_page(page(1)).validate().is_ok());
        assert!(Filter::new().with_page(page(500)).validate().is_ok());
    }

    #[test]
    fn unbounded_filter_accepts_everything() {
        let filter = Filter::new();
        assert!(filter.validate().is_ok());
        assert!(filter.accepts_employee("anyone"));
        assert!(filter.accepts_date(date(1999, 12, 31)));
    }

    #[test]
    fn bounded_filter_rejects_outsiders() {
        let filter = Filter::new()
            .with_employee_ids(["E1", "E2"])
            .with_date_range(DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap());
        assert!(filter.accepts_employee("E2"));
        assert!(!filter.accepts_employee("E3"));
        assert!(!filter.accepts_date(date(2024, 2, 1)));
    }
}

//! Inbound request shapes and their translation into domain filters

use chrono::{DateTime, FixedOffset, NaiveDate};
use hrlink_domain::{
    DateRange, DeletionScope, EmployeeCriteria, EmploymentStatus, Filter, HrLinkError,
    PageRequest, Result, UpdatedWindow,
};
use serde::Deserialize;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Query string of `GET /api/v1/employees`
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeQuery {
    /// Comma separated vendor identifiers
    pub ids: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
    pub code: Option<String>,
    pub dni: Option<String>,
    /// Comma separated
    pub department_ids: Option<String>,
    /// Comma separated
    pub office_ids: Option<String>,
    pub order_by: Option<String>,
    pub cursor: Option<String>,
    pub page_size: Option<u32>,
}

impl EmployeeQuery {
    pub fn into_filter(self) -> Result<Filter> {
        let mut filter = Filter::new();
        if let Some(ids) = self.ids {
            filter = filter.with_employee_ids(split_list(&ids));
        }

        filter = filter.with_employee_criteria(EmployeeCriteria {
            status: self.status.as_deref().map(EmploymentStatus::from_vendor),
            email: self.email,
            code: self.code,
            dni: self.dni,
            department_ids: self.department_ids.as_deref().map(split_list),
            office_ids: self.office_ids.as_deref().map(split_list),
        });
        if let Some(order_by) = self.order_by {
            filter = filter.with_order_by(order_by);
        }
        if let Some(page) = page_request(self.cursor, self.page_size) {
            filter = filter.with_page(page);
        }
        filter.validate()?;
        Ok(filter)
    }
}

/// Fields shared by the JSON bodies of the report endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub employee_ids: Option<Vec<String>>,
    pub cursor: Option<String>,
    pub page_size: Option<u32>,
}

impl ReportRequest {
    /// Filter for an endpoint where the date range is mandatory.
    pub fn into_ranged_filter(self) -> Result<Filter> {
        if self.from_date.is_none() {
            return Err(HrLinkError::Validation("from_date is required".into()));
        }
        if self.to_date.is_none() {
            return Err(HrLinkError::Validation("to_date is required".into()));
        }
        self.into_filter()
    }

    pub fn into_filter(self) -> Result<Filter> {
        let mut filter = Filter::new();

        match (self.from_date.as_deref(), self.to_date.as_deref()) {
            (Some(from), Some(to)) => {
                let range = DateRange::new(parse_date("from_date", from)?, parse_date("to_date", to)?)?;
                filter = filter.with_date_range(range);
            }
            (None, None) => {}
            _ => {
                return Err(HrLinkError::Validation(
                    "from_date and to_date must be supplied together".into(),
                ))
            }
        }

        if let Some(ids) = self.employee_ids {
            filter = filter.with_employee_ids(ids);
        }
        if let Some(page) = page_request(self.cursor, self.page_size) {
            filter = filter.with_page(page);
        }

        filter.validate()?;
        Ok(filter)
    }
}

/// Body of `POST /api/v1/worked-hours`
#[derive(Debug, Default, Deserialize)]
pub struct WorkedHoursRequest {
    #[serde(flatten)]
    pub report: ReportRequest,
    pub with_checks: Option<bool>,
}

impl WorkedHoursRequest {
    pub fn into_filter(self) -> Result<Filter> {
        let mut filter = self.report.into_ranged_filter()?;
        if let Some(with_checks) = self.with_checks {
            filter = filter.with_checks(with_checks);
        }
        Ok(filter)
    }
}

/// Body of `POST /api/v1/work-entries`
#[derive(Debug, Default, Deserialize)]
pub struct WorkEntriesRequest {
    #[serde(flatten)]
    pub report: ReportRequest,
    /// RFC 3339 timestamp, inclusive
    pub updated_at_from: Option<String>,
    /// RFC 3339 timestamp, inclusive
    pub updated_at_to: Option<String>,
    /// `all`, `not_deleted` or `deleted`
    pub only_return: Option<String>,
    pub order_by: Option<String>,
}

impl WorkEntriesRequest {
    pub fn into_filter(self) -> Result<Filter> {
        let mut filter = self.report.into_filter()?;

        if self.updated_at_from.is_some() || self.updated_at_to.is_some() {
            let from = self
                .updated_at_from
                .as_deref()
                .map(|raw| parse_timestamp("updated_at_from", raw))
                .transpose()?;
            let to = self
                .updated_at_to
                .as_deref()
                .map(|raw| parse_timestamp("updated_at_to", raw))
                .transpose()?;
            filter = filter.with_updated_at(UpdatedWindow { from, to });
        }
        if let Some(scope) = self.only_return {
            filter = filter.with_only_return(scope.parse::<DeletionScope>()?);
        }
        if let Some(order_by) = self.order_by {
            filter = filter.with_order_by(order_by);
        }

        filter.validate()?;
        Ok(filter)
    }
}

/// Body of `POST /api/v1/time-entries`
#[derive(Debug, Default, Deserialize)]
pub struct TimeEntriesRequest {
    #[serde(flatten)]
    pub report: ReportRequest,
    /// `active` or `inactive`
    pub employee_status: Option<String>,
}

impl TimeEntriesRequest {
    pub fn into_filter(self) -> Result<Filter> {
        let mut filter = self.report.into_filter()?;
        if let Some(status) = self.employee_status.as_deref() {
            let status = match EmploymentStatus::from_vendor(status) {
                known @ (EmploymentStatus::Active | EmploymentStatus::Inactive) => known,
                other => {
                    return Err(HrLinkError::Validation(format!(
                        "employee_status must be active or inactive, got '{other}'"
                    )))
                }
            };
            filter = filter
                .with_employee_criteria(EmployeeCriteria { status: Some(status), ..EmployeeCriteria::default() });
        }
        Ok(filter)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

fn page_request(cursor: Option<String>, size: Option<u32>) -> Option<PageRequest> {
    if cursor.is_none() && size.is_none() {
        return None;
    }
    Some(PageRequest { cursor, size })
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        HrLinkError::Validation(format!("{field} must be a YYYY-MM-DD date, got '{value}'"))
    })
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.trim()).map_err(|_| {
        HrLinkError::Validation(format!("{field} must be an RFC 3339 timestamp, got '{value}'"))
    })
}

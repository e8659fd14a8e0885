//! Filter → Sesame request translation
//!
//! Pure and deterministic: the same resource and filter always produce the
//! same requests, with identifier order preserved. Absent filter fields add
//! no parameter, and fields a resource does not understand are left out.
//! The caller's cursor is carried on the request; the transport sends it as
//! Sesame's `page` parameter.
//!
//! Sesame filters by employee differently per resource:
//! - employees: one `/core/v3/employees/{id}` lookup per identifier
//! - worked hours: repeated `employeeIds[in]` on a single request
//! - work entries and time entries: a single `employeeId`, so one request
//!   per identifier

use chrono::SecondsFormat;
use hrlink_core::VendorRequest;
use hrlink_domain::{Filter, HrLinkError, ResourceKind, Result};

pub const ACCOUNT_INFO_PATH: &str = "/core/v3/info";
pub const EMPLOYEES_PATH: &str = "/core/v3/employees";
pub const WORKED_HOURS_PATH: &str = "/schedule/v1/reports/worked-hours";
pub const WORK_ENTRIES_PATH: &str = "/schedule/v1/work-entries";
pub const TIME_ENTRIES_PATH: &str = "/project/v1/time-entries";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Build the Sesame requests for `resource` restricted by `filter`.
///
/// Most filters yield one request. Identifier filters on employees, work
/// entries and time entries yield one request per identifier, executed in
/// order by the caller.
///
/// # Errors
/// Returns `HrLinkError::Validation` when a caller page request would span
/// several vendor requests, or when employee lookups by identifier are
/// mixed with attribute criteria.
pub fn build(resource: ResourceKind, filter: &Filter) -> Result<Vec<VendorRequest>> {
    let requests = match resource {
        ResourceKind::AccountInfo => vec![VendorRequest::get(resource, ACCOUNT_INFO_PATH)],
        ResourceKind::Employees => employees(filter)?,
        ResourceKind::WorkedHours => vec![worked_hours(filter)],
        ResourceKind::WorkEntries => per_employee(filter, |id| work_entries(filter, id)),
        ResourceKind::TimeEntries => per_employee(filter, |id| time_entries(filter, id)),
    };

    if filter.page.is_some() && requests.len() > 1 {
        return Err(HrLinkError::Validation(format!(
            "page requests for {resource} accept at most one employee identifier"
        )));
    }
    Ok(requests)
}

fn employees(filter: &Filter) -> Result<Vec<VendorRequest>> {
    if let Some(ids) = &filter.employee_ids {
        if !filter.employee.is_empty() {
            return Err(HrLinkError::Validation(
                "employee identifiers cannot be combined with employee attribute filters".into(),
            ));
        }
        if filter.page.is_some() {
            return Err(HrLinkError::Validation(
                "employee lookups by identifier are not paginated".into(),
            ));
        }
        return Ok(ids
            .iter()
            .map(|id| VendorRequest::get(ResourceKind::Employees, EMPLOYEES_PATH).with_resource_id(id))
            .collect());
    }

    let criteria = &filter.employee;
    let mut request = VendorRequest::get(ResourceKind::Employees, EMPLOYEES_PATH);
    request = push_opt(request, "code", criteria.code.as_deref());
    request = push_opt(request, "dni", criteria.dni.as_deref());
    request = push_opt(request, "email", criteria.email.as_deref());
    for id in criteria.department_ids.iter().flatten() {
        request = request.with_query("departmentIds", id.as_str());
    }
    for id in criteria.office_ids.iter().flatten() {
        request = request.with_query("officeIds", id.as_str());
    }
    request = push_limit(request, filter);
    request = push_opt(request, "orderBy", filter.order_by.as_deref());
    request = push_opt(request, "status", criteria.status.as_ref().map(|s| s.as_str()));

    Ok(vec![with_cursor(request, filter)])
}

fn worked_hours(filter: &Filter) -> VendorRequest {
    let mut request = VendorRequest::get(ResourceKind::WorkedHours, WORKED_HOURS_PATH);
    for id in filter.employee_ids.iter().flatten() {
        request = request.with_query("employeeIds[in]", id.as_str());
    }
    if let Some(with_checks) = filter.with_checks {
        request = request.with_query("withChecks", with_checks.to_string());
    }
    request = push_dates(request, filter);
    request = push_limit(request, filter);
    with_cursor(request, filter)
}

fn work_entries(filter: &Filter, employee_id: Option<&str>) -> VendorRequest {
    let mut request = VendorRequest::get(ResourceKind::WorkEntries, WORK_ENTRIES_PATH);
    request = push_opt(request, "employeeId", employee_id);
    request = push_dates(request, filter);
    if let Some(window) = &filter.updated_at {
        let stamp = |at: chrono::DateTime<chrono::FixedOffset>| {
            at.to_rfc3339_opts(SecondsFormat::Secs, true)
        };
        request = push_opt(request, "updatedAt[gte]", window.from.map(stamp).as_deref());
        request = push_opt(request, "updatedAt[lte]", window.to.map(stamp).as_deref());
    }
    request = push_opt(request, "onlyReturn", filter.only_return.map(|s| s.as_str()));
    request = push_limit(request, filter);
    request = push_opt(request, "orderBy", filter.order_by.as_deref());
    with_cursor(request, filter)
}

fn time_entries(filter: &Filter, employee_id: Option<&str>) -> VendorRequest {
    let mut request = VendorRequest::get(ResourceKind::TimeEntries, TIME_ENTRIES_PATH);
    request = push_opt(request, "employeeId", employee_id);
    request = push_dates(request, filter);
    request =
        push_opt(request, "employeeStatus", filter.employee.status.as_ref().map(|s| s.as_str()));
    request = push_limit(request, filter);
    with_cursor(request, filter)
}

/// One request per identifier, or a single unrestricted one.
fn per_employee(
    filter: &Filter,
    build_one: impl Fn(Option<&str>) -> VendorRequest,
) -> Vec<VendorRequest> {
    match &filter.employee_ids {
        Some(ids) => ids.iter().map(|id| build_one(Some(id.as_str()))).collect(),
        None => vec![build_one(None)],
    }
}

fn push_opt(request: VendorRequest, key: &str, value: Option<&str>) -> VendorRequest {
    match value {
        Some(value) => request.with_query(key, value),
        None => request,
    }
}

fn push_dates(request: VendorRequest, filter: &Filter) -> VendorRequest {
    match filter.date_range {
        Some(range) => request
            .with_query("from", range.start().format(DATE_FORMAT).to_string())
            .with_query("to", range.end().format(DATE_FORMAT).to_string()),
        None => request,
    }
}

fn push_limit(request: VendorRequest, filter: &Filter) -> VendorRequest {
    match filter.page_size() {
        Some(size) => request.with_query("limit", size.to_string()),
        None => request,
    }
}

fn with_cursor(request: VendorRequest, filter: &Filter) -> VendorRequest {
    request.with_cursor(filter.cursor().map(str::to_string))
}

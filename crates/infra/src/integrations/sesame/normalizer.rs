//! Sesame JSON → domain records
//!
//! Each raw record is decoded into its wire struct and converted on its own.
//! Records that cannot be decoded or lack a required field are dropped and
//! reported as [`SkippedRecord`]s; the rest of the page is kept.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use hrlink_core::RawPage;
use hrlink_domain::{
    AccountInfo, Diagnostics, Employee, EmploymentStatus, Filter, HoursBreakdown, Page,
    ResourceKind, SkipReason, SkippedRecord, TimeEntry, WorkEntry, WorkEntryKind,
    WorkedHoursRecord,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::wire::{
    IntervalType, WireEmployee, WireInfo, WireStamp, WireTimeEntry, WireWorkEntry, WireWorkedHours,
};

/// Custom field slugs Sesame uses for an employee's area
const AREA_FIELD_SLUGS: &[&str] = &["cf_area", "cf_rea"];

/// A domain record that can be read from one Sesame record.
pub trait VendorRecord: Sized {
    type Wire: DeserializeOwned;

    const RESOURCE: ResourceKind;

    /// Convert one decoded vendor record. Work entries expand one vendor
    /// interval into several events, hence the `Vec`.
    fn from_wire(wire: Self::Wire) -> Result<Vec<Self>, SkipReason>;

    /// Employee identifier used for identifier filtering
    fn employee_key(&self) -> Option<&str>;

    /// Calendar date used for date-range filtering
    fn date_key(&self) -> Option<NaiveDate>;
}

/// Normalize a raw page without applying any filter.
pub fn normalize_page<R: VendorRecord>(raw: RawPage) -> Page<R> {
    normalize_page_with(raw, &Filter::default())
}

/// Normalize a raw page, dropping records outside `filter` as
/// `outside_filter` diagnostics.
pub fn normalize_page_with<R: VendorRecord>(raw: RawPage, filter: &Filter) -> Page<R> {
    let RawPage { records: raw_records, next_cursor, page_number } = raw;
    let mut records = Vec::with_capacity(raw_records.len());
    let mut diagnostics = Diagnostics::new();

    let mut skip = |position: usize, reason: SkipReason| {
        warn!(
            resource = %R::RESOURCE,
            page = page_number,
            position,
            reason = reason.label(),
            "Skipping vendor record"
        );
        diagnostics.push(SkippedRecord { resource: R::RESOURCE, page: page_number, position, reason });
    };

    for (position, value) in raw_records.into_iter().enumerate() {
        let converted = decode::<R::Wire>(value).and_then(R::from_wire);
        let items = match converted {
            Ok(items) => items,
            Err(reason) => {
                skip(position, reason);
                continue;
            }
        };

        for item in items {
            if let Some(detail) = outside_filter(&item, filter) {
                skip(position, SkipReason::OutsideFilter { detail });
            } else {
                records.push(item);
            }
        }
    }

    Page { records, next_cursor, diagnostics }
}

fn decode<W: DeserializeOwned>(value: Value) -> Result<W, SkipReason> {
    if !value.is_object() {
        return Err(SkipReason::Malformed { detail: "record is not a JSON object".into() });
    }
    serde_json::from_value(value).map_err(|e| SkipReason::Malformed { detail: e.to_string() })
}

fn outside_filter<R: VendorRecord>(record: &R, filter: &Filter) -> Option<String> {
    if let Some(employee) = record.employee_key() {
        if !filter.accepts_employee(employee) {
            return Some(format!("employee {employee} was not requested"));
        }
    }
    if let Some(date) = record.date_key() {
        if !filter.accepts_date(date) {
            return Some(format!("date {date} is outside the requested range"));
        }
    }
    None
}

fn missing(field: &str) -> SkipReason {
    SkipReason::MissingIdentifier { field: field.to_string() }
}

fn invalid(field: &str, detail: impl Into<String>) -> SkipReason {
    SkipReason::InvalidField { field: field.to_string(), detail: detail.into() }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse a vendor timestamp, keeping its UTC offset. Timestamps without an
/// offset are read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%z") {
        return Some(ts);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

fn required_timestamp(stamp: Option<WireStamp>, field: &str) -> Result<DateTime<FixedOffset>, SkipReason> {
    let raw = stamp.and_then(|s| s.date).ok_or_else(|| invalid(field, "missing"))?;
    parse_timestamp(&raw).ok_or_else(|| invalid(field, format!("unparseable timestamp {raw:?}")))
}

fn optional_timestamp(
    stamp: Option<WireStamp>,
    field: &str,
) -> Result<Option<DateTime<FixedOffset>>, SkipReason> {
    match stamp.and_then(|s| s.date).filter(|d| !d.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| invalid(field, format!("unparseable timestamp {raw:?}"))),
    }
}

/// Accepts `YYYY-MM-DD` or a timestamp whose local date is used.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|ts| ts.date_naive()))
}

impl VendorRecord for AccountInfo {
    type Wire = WireInfo;

    const RESOURCE: ResourceKind = ResourceKind::AccountInfo;

    fn from_wire(wire: WireInfo) -> Result<Vec<Self>, SkipReason> {
        let WireInfo { id, name, company, plan } = wire;
        let (company_id, company_name) =
            company.map(|c| (c.id, c.name)).unwrap_or((None, None));

        let account_id = company_id.or(id).ok_or_else(|| missing("company.id"))?;
        let name = non_blank(company_name).or_else(|| non_blank(name)).unwrap_or_default();
        let tier = match plan {
            Some(Value::String(plan)) => non_blank(Some(plan)),
            Some(Value::Object(plan)) => {
                non_blank(plan.get("name").and_then(Value::as_str).map(str::to_string))
            }
            _ => None,
        };

        Ok(vec![AccountInfo { account_id, name, tier }])
    }

    fn employee_key(&self) -> Option<&str> {
        None
    }

    fn date_key(&self) -> Option<NaiveDate> {
        None
    }
}

impl VendorRecord for Employee {
    type Wire = WireEmployee;

    const RESOURCE: ResourceKind = ResourceKind::Employees;

    fn from_wire(wire: WireEmployee) -> Result<Vec<Self>, SkipReason> {
        let id = wire.id.ok_or_else(|| missing("id"))?;

        let display_name = [wire.first_name.as_deref(), wire.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let department = wire.department.and_then(|d| non_blank(d.name)).or_else(|| {
            wire.custom_fields.unwrap_or_default().into_iter().find_map(|field| {
                let slug = field.slug?;
                if !AREA_FIELD_SLUGS.contains(&slug.as_str()) {
                    return None;
                }
                match field.value? {
                    Value::String(value) => non_blank(Some(value)),
                    Value::Null => None,
                    other => Some(other.to_string()),
                }
            })
        });

        let status = EmploymentStatus::from_vendor(wire.status.as_deref().unwrap_or_default());

        Ok(vec![Employee {
            id,
            display_name,
            email: non_blank(wire.email),
            department,
            status,
        }])
    }

    fn employee_key(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn date_key(&self) -> Option<NaiveDate> {
        None
    }
}

impl VendorRecord for WorkedHoursRecord {
    type Wire = WireWorkedHours;

    const RESOURCE: ResourceKind = ResourceKind::WorkedHours;

    fn from_wire(wire: WireWorkedHours) -> Result<Vec<Self>, SkipReason> {
        let employee_id = wire
            .employee_id
            .or_else(|| wire.employee.and_then(|e| e.id))
            .ok_or_else(|| missing("employeeId"))?;

        let raw_date = wire.date.ok_or_else(|| invalid("date", "missing"))?;
        let date =
            parse_date(&raw_date).ok_or_else(|| invalid("date", format!("unparseable date {raw_date:?}")))?;

        let worked_seconds =
            wire.seconds_worked.ok_or_else(|| invalid("secondsWorked", "missing"))?;
        if worked_seconds < 0 {
            return Err(invalid("secondsWorked", format!("negative value {worked_seconds}")));
        }

        let breakdown = wire
            .seconds_to_work
            .map(|expected| HoursBreakdown::from_expected(worked_seconds, expected));

        Ok(vec![WorkedHoursRecord { employee_id, date, worked_seconds, breakdown }])
    }

    fn employee_key(&self) -> Option<&str> {
        Some(&self.employee_id)
    }

    fn date_key(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

/// Event kinds for the start and end boundary of a vendor interval type.
fn boundary_kinds(entry_type: &str) -> (WorkEntryKind, WorkEntryKind) {
    match IntervalType::from_vendor(entry_type) {
        IntervalType::Work => (WorkEntryKind::ClockIn, WorkEntryKind::ClockOut),
        IntervalType::Pause => (WorkEntryKind::BreakStart, WorkEntryKind::BreakEnd),
        IntervalType::Unknown(raw) => {
            (WorkEntryKind::Unknown(raw.clone()), WorkEntryKind::Unknown(raw))
        }
    }
}

impl VendorRecord for WorkEntry {
    type Wire = WireWorkEntry;

    const RESOURCE: ResourceKind = ResourceKind::WorkEntries;

    fn from_wire(wire: WireWorkEntry) -> Result<Vec<Self>, SkipReason> {
        let employee_id =
            wire.employee.and_then(|e| e.id).ok_or_else(|| missing("employee.id"))?;
        let started = required_timestamp(wire.work_entry_in, "workEntryIn.date")?;
        let ended = optional_timestamp(wire.work_entry_out, "workEntryOut.date")?;

        let (start_kind, end_kind) = boundary_kinds(wire.work_entry_type.as_deref().unwrap_or_default());

        let mut events = vec![WorkEntry {
            employee_id: employee_id.clone(),
            timestamp: started,
            kind: start_kind,
            source_id: wire.id.clone(),
        }];
        if let Some(ended) = ended {
            events.push(WorkEntry {
                employee_id,
                timestamp: ended,
                kind: end_kind,
                source_id: wire.id,
            });
        }
        Ok(events)
    }

    fn employee_key(&self) -> Option<&str> {
        Some(&self.employee_id)
    }

    fn date_key(&self) -> Option<NaiveDate> {
        Some(self.timestamp.date_naive())
    }
}

impl VendorRecord for TimeEntry {
    type Wire = WireTimeEntry;

    const RESOURCE: ResourceKind = ResourceKind::TimeEntries;

    fn from_wire(wire: WireTimeEntry) -> Result<Vec<Self>, SkipReason> {
        let employee_id =
            wire.employee.and_then(|e| e.id).ok_or_else(|| missing("employee.id"))?;
        let started = required_timestamp(wire.time_entry_in, "timeEntryIn.date")?;
        let ended = optional_timestamp(wire.time_entry_out, "timeEntryOut.date")?;

        let duration_seconds = match (wire.worked_seconds, ended) {
            (Some(seconds), _) => seconds,
            (None, Some(ended)) => (ended - started).num_seconds(),
            (None, None) => {
                return Err(invalid("timeEntryOut.date", "missing and no workedSeconds reported"))
            }
        };
        if duration_seconds < 0 {
            return Err(invalid("timeEntryOut.date", "entry ends before it starts"));
        }

        let (project_id, project_name) =
            wire.project.map(|p| (p.id, non_blank(p.name))).unwrap_or((None, None));

        let tags = wire
            .tags
            .map(|tags| tags.data.into_iter().filter_map(|tag| non_blank(tag.name)).collect())
            .unwrap_or_default();

        Ok(vec![TimeEntry {
            id: wire.id,
            employee_id,
            project_id,
            project_name,
            date: started.date_naive(),
            duration_seconds,
            comment: non_blank(wire.comment),
            tags,
        }])
    }

    fn employee_key(&self) -> Option<&str> {
        Some(&self.employee_id)
    }

    fn date_key(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

//! Result containers and per-record diagnostics

use std::fmt;

use serde::{Deserialize, Serialize};

/// Vendor resource a request or a skipped record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    AccountInfo,
    Employees,
    WorkedHours,
    WorkEntries,
    TimeEntries,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountInfo => "account_info",
            Self::Employees => "employees",
            Self::WorkedHours => "worked_hours",
            Self::WorkEntries => "work_entries",
            Self::TimeEntries => "time_entries",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a vendor record was left out of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingIdentifier { field: String },
    InvalidField { field: String, detail: String },
    Malformed { detail: String },
    OutsideFilter { detail: String },
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingIdentifier { .. } => "missing_identifier",
            Self::InvalidField { .. } => "invalid_field",
            Self::Malformed { .. } => "malformed",
            Self::OutsideFilter { .. } => "outside_filter",
        }
    }
}

/// A vendor record that was dropped, with its position in the vendor stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub resource: ResourceKind,
    /// 1-based vendor page number
    pub page: u32,
    /// 0-based index within that page
    pub position: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub skipped: Vec<SkippedRecord>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: SkippedRecord) {
        self.skipped.push(record);
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.skipped.extend(other.skipped);
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Number of skipped records with the given reason label.
    pub fn count_reason(&self, label: &str) -> usize {
        self.skipped.iter().filter(|s| s.reason.label() == label).count()
    }
}

/// One page of normalized records.
///
/// `next_cursor` is present exactly when the vendor has more data for the
/// same filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub next_cursor: Option<String>,
    pub diagnostics: Diagnostics,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { records: Vec::new(), next_cursor: None, diagnostics: Diagnostics::default() }
    }
}

/// A single record together with what was skipped while looking for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fetched<T> {
    pub record: T,
    pub diagnostics: Diagnostics,
}

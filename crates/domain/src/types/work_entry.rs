//! Clock events ("fichajes")

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkEntryKind {
    ClockIn,
    ClockOut,
    BreakStart,
    BreakEnd,
    Unknown(String),
}

/// A single clock event for an employee.
///
/// Events are ordered by `timestamp` within an employee. A well-formed day
/// alternates clock-in/clock-out with optional break pairs in between, but
/// that ordering is not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkEntry {
    pub employee_id: String,
    /// Vendor timestamp with its original UTC offset
    pub timestamp: DateTime<FixedOffset>,
    pub kind: WorkEntryKind,
    /// Vendor identifier of the interval this event was read from
    pub source_id: Option<String>,
}

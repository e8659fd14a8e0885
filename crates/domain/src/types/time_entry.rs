use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Time allocated by an employee to a project or task ("imputación").
///
/// Several entries may share `(employee_id, date)` when a day is split
/// across tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Option<String>,
    pub employee_id: String,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub date: NaiveDate,
    pub duration_seconds: i64,
    pub comment: Option<String>,
    pub tags: Vec<String>,
}

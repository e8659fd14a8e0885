//! Employee records and employment status

use serde::{Deserialize, Serialize};

use crate::impl_vendor_enum;

/// Employment status as reported by the vendor.
///
/// Unrecognised vendor values are kept in `Unknown` so new statuses degrade
/// instead of breaking normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Active,
    Inactive,
    Pending,
    Unknown(String),
}

impl_vendor_enum!(EmploymentStatus {
    Active => "active",
    Inactive => "inactive" | "disabled",
    Pending => "pending" | "invited",
});

/// Employee as exposed to internal consumers.
///
/// `id` is the vendor-assigned identifier and the join key used by worked
/// hours, work entries and time entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub department: Option<String>,
    pub status: EmploymentStatus,
}

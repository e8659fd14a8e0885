//! Daily worked-hours report rows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Split of a day's worked time into contracted and extra time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursBreakdown {
    pub regular_seconds: i64,
    pub overtime_seconds: i64,
}

impl HoursBreakdown {
    /// Derive the breakdown from worked and expected seconds.
    ///
    /// Regular time never exceeds the expected time; anything above it is
    /// overtime. Negative inputs are treated as zero.
    pub fn from_expected(worked_seconds: i64, expected_seconds: i64) -> Self {
        let worked = worked_seconds.max(0);
        let expected = expected_seconds.max(0);
        let regular = worked.min(expected);
        Self { regular_seconds: regular, overtime_seconds: worked - regular }
    }
}

/// Worked time for one employee on one calendar date.
///
/// Uniquely keyed by `(employee_id, date)`. Totals are independent of the
/// sum of same-day time entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkedHoursRecord {
    pub employee_id: String,
    pub date: NaiveDate,
    pub worked_seconds: i64,
    pub breakdown: Option<HoursBreakdown>,
}

impl WorkedHoursRecord {
    pub fn key(&self) -> (&str, NaiveDate) {
        (self.employee_id.as_str(), self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_splits_overtime() {
        let b = HoursBreakdown::from_expected(30_000, 28_800);
        assert_eq!(b.regular_seconds, 28_800);
        assert_eq!(b.overtime_seconds, 1_200);
    }

    #[test]
    fn breakdown_under_expected_has_no_overtime() {
        let b = HoursBreakdown::from_expected(3_600, 28_800);
        assert_eq!(b.regular_seconds, 3_600);
        assert_eq!(b.overtime_seconds, 0);
    }

    #[test]
    fn breakdown_clamps_negative_values() {
        let b = HoursBreakdown::from_expected(-5, 100);
        assert_eq!(b, HoursBreakdown { regular_seconds: 0, overtime_seconds: 0 });
    }
}

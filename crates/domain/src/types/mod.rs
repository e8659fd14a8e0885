//! Domain types and models

pub mod account;
pub mod employee;
pub mod filter;
pub mod page;
pub mod time_entry;
pub mod work_entry;
pub mod worked_hours;

pub use account::AccountInfo;
pub use employee::{Employee, EmploymentStatus};
pub use filter::{
    DateRange, DeletionScope, EmployeeCriteria, Filter, PageRequest, UpdatedWindow, MAX_PAGE_SIZE,
};
pub use page::{Diagnostics, Fetched, Page, ResourceKind, SkipReason, SkippedRecord};
pub use time_entry::TimeEntry;
pub use work_entry::{WorkEntry, WorkEntryKind};
pub use worked_hours::{HoursBreakdown, WorkedHoursRecord};

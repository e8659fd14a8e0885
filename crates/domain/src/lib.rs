//! # HrLink Domain
//!
//! Vendor-neutral HR records and the types shared by every other crate.
//!
//! This crate contains:
//! - Normalized records (Employee, WorkedHoursRecord, WorkEntry, TimeEntry)
//! - Filter, page and diagnostics containers
//! - Error taxonomy and Result definition
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other HrLink crates
//! - No I/O

pub mod config;
pub mod errors;
pub mod macros;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;

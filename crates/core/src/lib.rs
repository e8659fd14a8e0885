//! # HrLink Core
//!
//! Port interfaces between the exposure layer and vendor adapters.
//!
//! ## Architecture Principles
//! - Only depends on `hrlink-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits

pub mod directory_ports;
pub mod vendor_ports;

pub use directory_ports::HrDirectory;
pub use vendor_ports::{RawPage, VendorRequest, VendorTransport};

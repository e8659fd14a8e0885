//! Sesame Time integration
//!
//! - [`request`]: caller filter → vendor request
//! - [`transport`]: authenticated, retrying HTTP execution and envelope unwrapping
//! - [`normalizer`]: vendor JSON → domain records with per-record diagnostics
//! - [`wire`]: lenient mirrors of the vendor JSON
//! - [`client`]: the [`hrlink_core::HrDirectory`] implementation

pub mod client;
pub mod normalizer;
pub mod request;
pub mod transport;
pub mod wire;

pub use client::SesameClient;
pub use normalizer::{normalize_page, normalize_page_with, VendorRecord};
pub use transport::SesameTransport;

//! # HrLink Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Retrying HTTP client with backoff and cancellation
//! - Sesame Time integration (request builder, transport, normalizer, client)
//! - Configuration loading from environment or file
//!
//! ## Architecture
//! - Implements traits defined in `hrlink-core`
//! - Contains all "impure" code (HTTP, filesystem, environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;

pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, RecordingSleeper, RetryPolicy, Sleeper};
pub use integrations::sesame::{SesameClient, SesameTransport};

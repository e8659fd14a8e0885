//! Retrying HTTP client for vendor calls

pub mod backoff;
pub mod client;

pub use backoff::{Backoff, RecordingSleeper, RetryPolicy, Sleeper, TokioSleeper};
pub use client::{HttpClient, HttpClientBuilder};

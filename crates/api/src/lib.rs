//! # HrLink API
//!
//! Internal REST surface over the HR vendor directory.
//!
//! This crate contains:
//! - Route handlers (HTTP → directory port bridge)
//! - Application context (dependency injection)
//! - Request validation, error mapping and auth middleware
//! - Main entry point and logging setup
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Handlers only see the `HrDirectory` port

pub mod context;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod requests;
pub mod routes;
pub mod utils;

pub use context::AppContext;
pub use error::ApiError;
pub use routes::router;

//! Utility helpers for the service binary

pub mod logging;

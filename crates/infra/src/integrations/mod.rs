//! External service integrations

pub mod sesame;

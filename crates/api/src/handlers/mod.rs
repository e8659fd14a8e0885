//! Route handlers - HTTP to directory port bridge

mod directory;
mod health;

pub use directory::*;
pub use health::*;

use hrlink_domain::{Diagnostics, Fetched, Page};
use serde::Serialize;

/// Envelope for list endpoints
#[derive(Debug, Serialize)]
pub struct PageBody<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<String>,
    pub diagnostics: Diagnostics,
}

impl<T> From<Page<T>> for PageBody<T> {
    fn from(page: Page<T>) -> Self {
        Self { data: page.records, next_cursor: page.next_cursor, diagnostics: page.diagnostics }
    }
}

/// Envelope for single-record endpoints
#[derive(Debug, Serialize)]
pub struct RecordBody<T> {
    pub data: T,
    pub diagnostics: Diagnostics,
}

impl<T> From<Fetched<T>> for RecordBody<T> {
    fn from(fetched: Fetched<T>) -> Self {
        Self { data: fetched.record, diagnostics: fetched.diagnostics }
    }
}

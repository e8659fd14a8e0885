//! Error types used throughout the application

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failure observed while talking to the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// Vendor answered 429
    RateLimited,
    /// Vendor answered 5xx
    ServerError,
    /// Connect, timeout or request construction failure
    ConnectionFailure,
    /// Retry budget spent; `last_cause` carries the final transient kind
    Exhausted,
    /// The vendor kept signalling more pages past the configured bound
    PaginationLimitExceeded,
    /// The call was cancelled while a request or backoff wait was pending
    Cancelled,
}

impl TransportErrorKind {
    /// Stable label used in logs and outbound error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::ConnectionFailure => "connection_failure",
            Self::Exhausted => "exhausted",
            Self::PaginationLimitExceeded => "pagination_limit_exceeded",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a request that failed this way may be issued again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError | Self::ConnectionFailure)
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal transport outcome surfaced after local retries were applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub detail: String,
    /// Last HTTP status observed, if the vendor answered at all
    pub status: Option<u16>,
    /// For `Exhausted`: the transient failure seen on the final attempt
    pub last_cause: Option<TransportErrorKind>,
    pub attempts: u32,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, detail: impl Into<String>) -> Self {
        Self { kind, detail: detail.into(), status: None, last_cause: None, attempts: 0 }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Wrap a transient failure into the terminal `Exhausted` outcome.
    pub fn exhausted(last: TransportError, attempts: u32) -> Self {
        Self {
            kind: TransportErrorKind::Exhausted,
            detail: format!("gave up after {attempts} attempts: {}", last.detail),
            status: last.status,
            last_cause: Some(last.kind),
            attempts,
        }
    }

    pub fn cancelled(attempts: u32) -> Self {
        Self::new(TransportErrorKind::Cancelled, "vendor call cancelled").with_attempts(attempts)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)?;
        if let Some(status) = self.status {
            write!(f, " (last status {status})")?;
        }
        Ok(())
    }
}

impl std::error::Error for TransportError {}

/// Main error type for HrLink
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum HrLinkError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous result: {count} records share identifier {id}")]
    AmbiguousResult { id: String, count: usize },

    #[error("Vendor rejected request with status {status}: {detail}")]
    VendorClient { status: u16, detail: String },

    #[error("Transport error: {0}")]
    Transport(TransportError),

    #[error("Invalid vendor payload: {0}")]
    InvalidPayload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HrLinkError {
    /// Stable snake_case label for responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::AmbiguousResult { .. } => "ambiguous_result",
            Self::VendorClient { .. } => "vendor_client_error",
            Self::Transport(_) => "transport_error",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Self::Transport(err) => Some(err.kind),
            _ => None,
        }
    }
}

impl From<TransportError> for HrLinkError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

/// Result type alias for HrLink operations
pub type Result<T> = std::result::Result<T, HrLinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_keeps_last_cause_and_status() {
        let last = TransportError::new(TransportErrorKind::ServerError, "HTTP 503")
            .with_status(503)
            .with_attempts(3);

        let err = TransportError::exhausted(last, 3);

        assert_eq!(err.kind, TransportErrorKind::Exhausted);
        assert_eq!(err.last_cause, Some(TransportErrorKind::ServerError));
        assert_eq!(err.status, Some(503));
        assert_eq!(err.attempts, 3);
        assert!(err.to_string().contains("last status 503"));
    }

    #[test]
    fn kind_labels_are_stable() {
        assert_eq!(HrLinkError::Validation("x".into()).kind(), "validation");
        assert_eq!(HrLinkError::AmbiguousResult { id: "E1".into(), count: 2 }.kind(), "ambiguous_result");
        assert_eq!(
            HrLinkError::VendorClient { status: 422, detail: "bad".into() }.kind(),
            "vendor_client_error"
        );
        let transport: HrLinkError =
            TransportError::new(TransportErrorKind::PaginationLimitExceeded, "too many").into();
        assert_eq!(transport.kind(), "transport_error");
        assert_eq!(transport.transport_kind(), Some(TransportErrorKind::PaginationLimitExceeded));
    }

    #[test]
    fn only_vendor_side_failures_are_transient() {
        assert!(TransportErrorKind::RateLimited.is_transient());
        assert!(TransportErrorKind::ServerError.is_transient());
        assert!(TransportErrorKind::ConnectionFailure.is_transient());
        assert!(!TransportErrorKind::Exhausted.is_transient());
        assert!(!TransportErrorKind::PaginationLimitExceeded.is_transient());
        assert!(!TransportErrorKind::Cancelled.is_transient());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(HrLinkError::NotFound("employee E1".into())).unwrap();
        assert_eq!(json["type"], "NotFound");
        assert_eq!(json["message"], "employee E1");
    }
}

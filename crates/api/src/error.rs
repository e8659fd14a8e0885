//! HTTP mapping of domain errors
//!
//! Every failure leaves the service as `{"error": {"kind", "detail", ...}}`
//! with a status chosen from the error kind. Extractor rejections count as
//! validation failures.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hrlink_domain::HrLinkError;
use serde_json::{json, Map, Value};
use tracing::{error, warn};

#[derive(Debug)]
pub struct ApiError(pub HrLinkError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            HrLinkError::Validation(_) | HrLinkError::VendorClient { .. } => StatusCode::BAD_REQUEST,
            HrLinkError::NotFound(_) => StatusCode::NOT_FOUND,
            HrLinkError::AmbiguousResult { .. } => StatusCode::CONFLICT,
            HrLinkError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            HrLinkError::InvalidPayload(_) => StatusCode::BAD_GATEWAY,
            HrLinkError::Config(_) | HrLinkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        let mut error = Map::new();
        error.insert("kind".into(), json!(self.0.kind()));

        match &self.0 {
            HrLinkError::Validation(detail)
            | HrLinkError::NotFound(detail)
            | HrLinkError::InvalidPayload(detail)
            | HrLinkError::Config(detail)
            | HrLinkError::Internal(detail) => {
                error.insert("detail".into(), json!(detail));
            }
            HrLinkError::AmbiguousResult { id, count } => {
                error.insert("detail".into(), json!(self.0.to_string()));
                error.insert("id".into(), json!(id));
                error.insert("count".into(), json!(count));
            }
            HrLinkError::VendorClient { status, detail } => {
                error.insert("detail".into(), json!(detail));
                error.insert("vendor_status".into(), json!(status));
            }
            HrLinkError::Transport(transport) => {
                error.insert("detail".into(), json!(transport.detail));
                error.insert("transport_kind".into(), json!(transport.kind.as_str()));
                if let Some(cause) = transport.last_cause {
                    error.insert("last_cause".into(), json!(cause.as_str()));
                }
                if let Some(status) = transport.status {
                    error.insert("vendor_status".into(), json!(status));
                }
                error.insert("attempts".into(), json!(transport.attempts));
            }
        }

        json!({ "error": error })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            if matches!(self.0, HrLinkError::Config(_) | HrLinkError::Internal(_)) {
                error!(kind = self.0.kind(), error = %self.0, "request failed");
            } else {
                warn!(kind = self.0.kind(), error = %self.0, "vendor call failed");
            }
        }

        (status, Json(self.body())).into_response()
    }
}

impl From<HrLinkError> for ApiError {
    fn from(value: HrLinkError) -> Self {
        Self(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self(HrLinkError::Validation(value.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self(HrLinkError::Validation(value.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self(HrLinkError::Validation(value.body_text()))
    }
}

/// Body for requests rejected before routing reaches a handler.
pub fn unauthorized_body() -> Value {
    json!({ "error": { "kind": "unauthorized", "detail": "missing or invalid API key" } })
}

#[cfg(test)]
mod tests {
    use hrlink_domain::{TransportError, TransportErrorKind};

    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (HrLinkError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (HrLinkError::NotFound("E1".into()), StatusCode::NOT_FOUND),
            (HrLinkError::AmbiguousResult { id: "E1".into(), count: 2 }, StatusCode::CONFLICT),
            (HrLinkError::VendorClient { status: 403, detail: "no".into() }, StatusCode::BAD_REQUEST),
            (
                TransportError::cancelled(1).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (HrLinkError::InvalidPayload("html".into()), StatusCode::BAD_GATEWAY),
            (HrLinkError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (HrLinkError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn vendor_client_body_forwards_status_and_detail() {
        let body = ApiError(HrLinkError::VendorClient {
            status: 422,
            detail: "{\"message\":\"bad filter\"}".into(),
        })
        .body();

        assert_eq!(body["error"]["kind"], "vendor_client_error");
        assert_eq!(body["error"]["vendor_status"], 422);
        assert!(body["error"]["detail"].as_str().unwrap().contains("bad filter"));
    }

    #[test]
    fn transport_body_names_transport_kind() {
        let last = TransportError::new(TransportErrorKind::RateLimited, "HTTP 429").with_status(429);
        let body = ApiError(TransportError::exhausted(last, 3).into()).body();

        assert_eq!(body["error"]["kind"], "transport_error");
        assert_eq!(body["error"]["transport_kind"], "exhausted");
        assert_eq!(body["error"]["last_cause"], "rate_limited");
        assert_eq!(body["error"]["vendor_status"], 429);
        assert_eq!(body["error"]["attempts"], 3);
    }
}

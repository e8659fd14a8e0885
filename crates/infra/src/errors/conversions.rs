//! Conversions from external infrastructure errors into domain errors.

use hrlink_domain::{HrLinkError, TransportError, TransportErrorKind};
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub HrLinkError);

impl From<InfraError> for HrLinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<HrLinkError> for InfraError {
    fn from(value: HrLinkError) -> Self {
        InfraError(value)
    }
}

trait IntoHrLinkError {
    fn into_hrlink(self) -> HrLinkError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → HrLinkError */
/* -------------------------------------------------------------------------- */

impl IntoHrLinkError for HttpError {
    fn into_hrlink(self) -> HrLinkError {
        if self.is_timeout() {
            return TransportError::new(
                TransportErrorKind::ConnectionFailure,
                "vendor request timed out",
            )
            .into();
        }

        if self.is_connect() {
            return TransportError::new(
                TransportErrorKind::ConnectionFailure,
                "vendor connection failure",
            )
            .into();
        }

        if self.is_builder() {
            return HrLinkError::Internal(format!("invalid vendor request: {self}"));
        }

        if self.is_decode() {
            return HrLinkError::InvalidPayload(format!("vendor body could not be decoded: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                429 => TransportError::new(TransportErrorKind::RateLimited, message)
                    .with_status(code)
                    .into(),
                500..=599 => TransportError::new(TransportErrorKind::ServerError, message)
                    .with_status(code)
                    .into(),
                _ => HrLinkError::VendorClient { status: code, detail: message },
            };
        }

        TransportError::new(TransportErrorKind::ConnectionFailure, self.to_string()).into()
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_hrlink())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → HrLinkError */
/* -------------------------------------------------------------------------- */

impl IntoHrLinkError for serde_json::Error {
    fn into_hrlink(self) -> HrLinkError {
        HrLinkError::InvalidPayload(format!("vendor body is not valid JSON: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_hrlink())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → HrLinkError */
/* -------------------------------------------------------------------------- */

impl IntoHrLinkError for url::ParseError {
    fn into_hrlink(self) -> HrLinkError {
        HrLinkError::Config(format!("invalid vendor URL: {self}"))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(value.into_hrlink())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

use std::fmt;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::Value;
use thiserror::Error;

/// Classification of a failed service response by HTTP status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServiceErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    RequestTooLarge,
    UnsupportedMediaType,
    TooManyRequests,
    InternalServerError,
    ServiceUnavailable,
    /// Any other non-success status.
    Other,
}

impl ServiceErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            413 => Self::RequestTooLarge,
            415 => Self::UnsupportedMediaType,
            429 => Self::TooManyRequests,
            500 => Self::InternalServerError,
            503 => Self::ServiceUnavailable,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BadRequest => "bad request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::RequestTooLarge => "request too large",
            Self::UnsupportedMediaType => "unsupported media type",
            Self::TooManyRequests => "too many requests",
            Self::InternalServerError => "internal server error",
            Self::ServiceUnavailable => "service unavailable",
            Self::Other => "service error",
        };
        f.write_str(name)
    }
}

/// A non-success response returned by the service.
///
/// Keeps the raw status, headers and body so callers can inspect the
/// original response.
#[derive(Debug, Error)]
#[error("{kind} (status {status}): {message}")]
pub struct ServiceResponseError {
    kind: ServiceErrorKind,
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    message: String,
}

impl ServiceResponseError {
    pub fn new(status: StatusCode, headers: HeaderMap, body: String) -> Self {
        let message = extract_error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_owned()
        });

        Self {
            kind: ServiceErrorKind::from_status(status),
            status,
            headers,
            body,
            message,
        }
    }

    pub fn kind(&self) -> ServiceErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw response body text.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ServiceErrorKind::NotFound
    }
}

// Services report errors under a handful of field names.
fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    ["error", "message", "errorMessage"]
        .iter()
        .find_map(|field| json.get(field).and_then(Value::as_str))
        .or_else(|| {
            let first = json.get("errors")?.get(0)?;
            first
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| first.as_str())
        })
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use reqwest::header::HeaderMap;

    use super::{ServiceErrorKind, ServiceResponseError};

    #[test]
    fn maps_known_statuses() {
        let cases = [
            (400, ServiceErrorKind::BadRequest),
            (401, ServiceErrorKind::Unauthorized),
            (403, ServiceErrorKind::Forbidden),
            (404, ServiceErrorKind::NotFound),
            (409, ServiceErrorKind::Conflict),
            (413, ServiceErrorKind::RequestTooLarge),
            (415, ServiceErrorKind::UnsupportedMediaType),
            (429, ServiceErrorKind::TooManyRequests),
            (500, ServiceErrorKind::InternalServerError),
            (503, ServiceErrorKind::ServiceUnavailable),
            (418, ServiceErrorKind::Other),
        ];

        for (code, expected) in cases {
            let status = StatusCode::from_u16(code).expect("valid status");
            assert_eq!(ServiceErrorKind::from_status(status), expected, "{code}");
        }
    }

    #[test]
    fn not_found_keeps_original_response() {
        let error = ServiceResponseError::new(
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            r#"{"errors":[{"code":"missing","message":"Resource not found"}]}"#.to_owned(),
        );

        assert!(error.is_not_found());
        assert_eq!(error.message(), "Resource not found");
        assert!(error.body().contains("missing"));
        assert_eq!(
            error.to_string(),
            "not found (status 404 Not Found): Resource not found"
        );
    }

    #[test]
    fn falls_back_to_reason_phrase() {
        let error = ServiceResponseError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            HeaderMap::new(),
            "<html>down</html>".to_owned(),
        );

        assert_eq!(error.kind(), ServiceErrorKind::ServiceUnavailable);
        assert_eq!(error.message(), "Service Unavailable");
    }
}

use thiserror::Error;

use crate::ServiceResponseError;

/// Errors returned by request assembly and client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed or missing required input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Service URL is not a valid absolute URL.
    #[error("invalid service URL '{0}'")]
    InvalidBaseUrl(String),

    /// The requested combination is not supported by the HTTP protocol.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A streamed request body could not be read.
    #[error("failed to read request body: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or parsing failed.
    #[error("failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport-layer request failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status mapped to a typed service error.
    #[error(transparent)]
    Service(#[from] ServiceResponseError),
}

impl ClientError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns `true` for input validation failures, including bad service URLs.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::InvalidBaseUrl(_))
    }

    /// Returns `true` when the request was rejected before reaching the transport.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Returns the mapped service error when the server answered with a failure status.
    pub fn as_service_error(&self) -> Option<&ServiceResponseError> {
        match self {
            Self::Service(error) => Some(error),
            _ => None,
        }
    }
}

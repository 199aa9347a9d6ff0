use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ClientError, ServiceResponseError};

/// A successful response with its body read as text.
#[derive(Clone, Debug)]
pub struct ServiceResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl ServiceResponse {
    /// Wraps a received response, mapping non-success statuses to
    /// [`ClientError::Service`].
    pub fn from_parts(
        status: StatusCode,
        headers: HeaderMap,
        body: String,
    ) -> Result<Self, ClientError> {
        if !status.is_success() {
            warn!(%status, "service returned an error status");
            return Err(ServiceResponseError::new(status, headers, body).into());
        }

        debug!(%status, body_len = body.len(), "service returned a success status");
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parses the body as JSON.
    ///
    /// Returns [`Value::Null`] for an empty body.
    pub fn json(&self) -> Result<Value, ClientError> {
        if self.body.trim().is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&self.body)?)
        }
    }
}

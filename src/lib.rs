//! Request assembly core for cloud service SDKs.
//!
//! Public API layers:
//! - [`resolve_request_url_with_params`]: path template resolution against a service URL.
//! - [`RequestBuilder`]: single-use builder producing a [`RequestDescriptor`].
//! - [`ApiClient`]/[`BlockingApiClient`]: thin `reqwest` executors for descriptors.
//! - [`ClientError`]: unified error type, with [`ServiceResponseError`] for
//!   failure statuses.

mod blocking_client;
mod body;
mod client;
mod error;
mod exception;
mod params;
mod request;
mod response;
#[cfg(test)]
mod test_support;
mod url_resolver;

/// Generic blocking service client.
pub use blocking_client::BlockingApiClient;
pub use body::{
    APPLICATION_JSON, FORM_URLENCODED, JsonPatchOperation, PatchOp, RawContent, RequestBody,
    resolve_body,
};
/// Generic async service client.
pub use client::ApiClient;
/// Error type returned by all operations.
pub use error::ClientError;
pub use exception::{ServiceErrorKind, ServiceResponseError};
pub use params::{NameValue, ParamValue, add, pairs_from_flat};
pub use request::{RequestBuilder, RequestDescriptor};
pub use response::ServiceResponse;
pub use url_resolver::{
    construct_http_url, construct_http_url_with_params, resolve_request_url,
    resolve_request_url_with_params,
};

/// Re-exported so callers can build URLs and methods without a direct dependency.
pub use reqwest::{Method, Url};

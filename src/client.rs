use reqwest::{Method, Url};
use serde_json::Value;

use crate::url_resolver::{resolve_request_url, resolve_request_url_with_params};
use crate::{ClientError, RequestBuilder, RequestDescriptor, ServiceResponse};

/// Async service client executing assembled requests with `reqwest`.
///
/// Requests are prepared with [`ApiClient::request`], which resolves a path
/// template against the service URL and returns a [`RequestBuilder`].
#[derive(Clone, Debug)]
pub struct ApiClient {
    service_url: Url,
    authorization_token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a new client for the given service URL.
    pub fn new(service_url: impl AsRef<str>) -> Result<Self, ClientError> {
        Ok(Self {
            service_url: resolve_request_url(service_url.as_ref(), "")?,
            authorization_token: None,
            http: reqwest::Client::new(),
        })
    }

    /// Returns a new client with a bearer token attached to all requests.
    #[must_use]
    pub fn with_authorization_token(mut self, token: impl Into<String>) -> Self {
        self.authorization_token = Some(token.into());
        self
    }

    pub fn service_url(&self) -> &Url {
        &self.service_url
    }

    /// Starts a request for `path`, substituting `{name}` placeholders from
    /// `path_params`.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        path_params: &[(&str, &str)],
    ) -> Result<RequestBuilder, ClientError> {
        let url = resolve_request_url_with_params(self.service_url.as_str(), path, path_params)?;
        let builder = RequestBuilder::with_method(method, url)?;

        Ok(match &self.authorization_token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        })
    }

    /// Sends an assembled request.
    ///
    /// Non-success statuses are returned as [`ClientError::Service`].
    pub async fn execute(
        &self,
        request: RequestDescriptor,
    ) -> Result<ServiceResponse, ClientError> {
        let response = request.into_reqwest(&self.http).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let payload = response.text().await?;

        ServiceResponse::from_parts(status, headers, payload)
    }

    /// Sends an assembled request and parses the response as JSON.
    ///
    /// Returns [`Value::Null`] for successful responses with an empty body.
    pub async fn execute_json(&self, request: RequestDescriptor) -> Result<Value, ClientError> {
        self.execute(request).await?.json()
    }

    /// Sends a `GET` request and parses the response as JSON.
    pub async fn get_json(
        &self,
        path: &str,
        path_params: &[(&str, &str)],
    ) -> Result<Value, ClientError> {
        let request = self.request(Method::GET, path, path_params)?.build()?;
        self.execute_json(request).await
    }

    /// Sends a request with query parameters and an optional JSON body.
    pub async fn request_json_with_query(
        &self,
        method: Method,
        path: &str,
        path_params: &[(&str, &str)],
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let mut builder = self
            .request(method, path, path_params)?
            .queries(query.iter().copied());
        if let Some(json) = body {
            builder = builder.body_json(json);
        }
        self.execute_json(builder.build()?).await
    }
}

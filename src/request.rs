use std::io::Read;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::body::{APPLICATION_JSON, RawContent, resolve_body};
use crate::params::add;
use crate::{ClientError, JsonPatchOperation, NameValue, ParamValue, RequestBody};

const SUPPORTED_METHODS: [Method; 6] = [
    Method::DELETE,
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::HEAD,
];

/// Single-use builder assembling one outgoing request.
///
/// Create one per call with [`RequestBuilder::get`] and friends, chain the
/// configuration calls, then consume it with [`RequestBuilder::build`].
/// [`RequestBuilder::to_url`] can be used at any point to inspect the final URL.
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    body: Option<RequestBody>,
    form_params: Vec<NameValue>,
    headers: Vec<NameValue>,
    query_params: Vec<NameValue>,
}

impl RequestBuilder {
    fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            form_params: Vec::new(),
            headers: Vec::new(),
            query_params: Vec::new(),
        }
    }

    /// Starts a `DELETE` request.
    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Starts a `GET` request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Starts a `POST` request.
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Starts a `PUT` request.
    pub fn put(url: Url) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Starts a `PATCH` request.
    pub fn patch(url: Url) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// Starts a `HEAD` request.
    pub fn head(url: Url) -> Self {
        Self::new(Method::HEAD, url)
    }

    /// Creates a builder for any of the supported methods.
    ///
    /// Returns [`ClientError::InvalidArgument`] for methods other than
    /// `DELETE`, `GET`, `POST`, `PUT`, `PATCH` and `HEAD`.
    pub fn with_method(method: Method, url: Url) -> Result<Self, ClientError> {
        if !SUPPORTED_METHODS.contains(&method) {
            return Err(ClientError::InvalidArgument(format!(
                "unsupported HTTP method '{method}'"
            )));
        }
        Ok(Self::new(method, url))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Adds a header. A repeated value adds one header entry per element.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        add(&mut self.headers, name, value.into());
        self
    }

    /// Adds a query parameter. A repeated value adds `name=v` once per element.
    #[must_use]
    pub fn query(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        add(&mut self.query_params, name, value.into());
        self
    }

    /// Adds a form parameter.
    ///
    /// Form parameters replace any other body when the request is built.
    #[must_use]
    pub fn form(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        add(&mut self.form_params, name, value.into());
        self
    }

    /// Adds each `(name, value)` pair as a header.
    #[must_use]
    pub fn headers<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        pairs
            .into_iter()
            .fold(self, |builder, (name, value)| builder.header(name.as_ref(), value))
    }

    /// Adds each `(name, value)` pair as a query parameter.
    #[must_use]
    pub fn queries<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        pairs
            .into_iter()
            .fold(self, |builder, (name, value)| builder.query(name.as_ref(), value))
    }

    /// Adds each `(name, value)` pair as a form parameter.
    #[must_use]
    pub fn forms<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        pairs
            .into_iter()
            .fold(self, |builder, (name, value)| builder.form(name.as_ref(), value))
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a text body, sent as UTF-8.
    #[must_use]
    pub fn body_content_text(self, content: impl Into<String>, content_type: &str) -> Self {
        self.body(RequestBody::new(content.into(), Some(content_type)))
    }

    /// Sets a body read from `reader` until end of stream.
    pub fn body_content_reader(
        self,
        reader: impl Read + Send + 'static,
        content_type: &str,
    ) -> Result<Self, ClientError> {
        self.body_content(
            Some(content_type),
            None::<&Value>,
            None,
            Some(RawContent::Reader(Box::new(reader))),
        )
    }

    /// Sets the body from the first present source: `json`, `json_patch`, then `raw`.
    ///
    /// Nothing is set when `content_type` is `None`, even if a source is present.
    pub fn body_content<T>(
        mut self,
        content_type: Option<&str>,
        json: Option<&T>,
        json_patch: Option<&[JsonPatchOperation]>,
        raw: Option<RawContent>,
    ) -> Result<Self, ClientError>
    where
        T: Serialize + ?Sized,
    {
        if let Some(body) = resolve_body(content_type, json, json_patch, raw)? {
            self.body = Some(body);
        }
        Ok(self)
    }

    /// Sets a compact JSON body with `Content-Type: application/json`.
    #[must_use]
    pub fn body_json(self, json: &Value) -> Self {
        self.body_json_with_media_type(json, APPLICATION_JSON)
    }

    /// Sets a compact JSON body with a custom JSON media type.
    #[must_use]
    pub fn body_json_with_media_type(self, json: &Value, media_type: &str) -> Self {
        self.body_content_text(json.to_string(), media_type)
    }

    /// Returns the request URL with every accumulated query parameter appended.
    ///
    /// Parameters without a value are appended as a bare name.
    pub fn to_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for param in &self.query_params {
                match param.value() {
                    Some(value) => pairs.append_pair(param.name(), value),
                    None => pairs.append_key_only(param.name()),
                };
            }
        }
        url
    }

    /// Finalizes the request.
    ///
    /// `GET` and `HEAD` requests must not carry a body. Form parameters replace
    /// any body that was set. Other methods get an empty body when nothing was
    /// set. `Accept: application/json` is set first; accumulated headers then
    /// replace earlier values of the same name, and the body's media type is
    /// applied last as `Content-Type`.
    pub fn build(self) -> Result<RequestDescriptor, ClientError> {
        let url = self.to_url();
        let Self {
            method,
            body,
            form_params,
            headers: header_params,
            ..
        } = self;

        let body = if method == Method::GET || method == Method::HEAD {
            if body.is_some() {
                return Err(ClientError::InvalidState(format!(
                    "cannot send a body with a {method} request"
                )));
            }
            None
        } else if !form_params.is_empty() {
            Some(RequestBody::form(&form_params))
        } else {
            Some(body.unwrap_or_else(RequestBody::empty))
        };

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        for header in &header_params {
            let (name, value) = header_entry(header)?;
            headers.insert(name, value);
        }
        if let Some(content_type) = body.as_ref().and_then(RequestBody::content_type) {
            headers.insert(CONTENT_TYPE, parse_header_value(CONTENT_TYPE.as_str(), content_type)?);
        }

        debug!(
            %method,
            %url,
            headers = headers.len(),
            body_len = body.as_ref().map(RequestBody::len),
            "built request"
        );

        Ok(RequestDescriptor {
            method,
            url,
            headers,
            body,
        })
    }
}

fn header_entry(header: &NameValue) -> Result<(HeaderName, HeaderValue), ClientError> {
    let name = HeaderName::from_bytes(header.name().as_bytes()).map_err(|_| {
        ClientError::InvalidArgument(format!("invalid header name '{}'", header.name()))
    })?;
    let value = header.value().ok_or_else(|| {
        ClientError::InvalidArgument(format!("header '{}' has no value", header.name()))
    })?;
    Ok((name, parse_header_value(header.name(), value)?))
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value)
        .map_err(|_| ClientError::InvalidArgument(format!("invalid value for header '{name}'")))
}

/// A fully assembled request, ready for an HTTP transport.
#[derive(Debug)]
pub struct RequestDescriptor {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<RequestBody>,
}

impl RequestDescriptor {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the body; always `None` for `GET` and `HEAD`.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Converts into an async `reqwest` request builder.
    pub fn into_reqwest(self, http: &reqwest::Client) -> reqwest::RequestBuilder {
        let mut request = http.request(self.method, self.url).headers(self.headers);
        if let Some(body) = self.body {
            let (_, content) = body.into_parts();
            request = request.body(content);
        }
        request
    }

    /// Converts into a blocking `reqwest` request builder.
    pub fn into_blocking(
        self,
        http: &reqwest::blocking::Client,
    ) -> reqwest::blocking::RequestBuilder {
        let mut request = http.request(self.method, self.url).headers(self.headers);
        if let Some(body) = self.body {
            let (_, content) = body.into_parts();
            request = request.body(content);
        }
        request
    }
}

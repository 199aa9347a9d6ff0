use reqwest::{Method, Url};
use serde_json::Value;

use crate::url_resolver::{resolve_request_url, resolve_request_url_with_params};
use crate::{ClientError, RequestBuilder, RequestDescriptor, ServiceResponse};

/// Blocking service client executing assembled requests with `reqwest`.
///
/// This is the synchronous counterpart of [`crate::ApiClient`].
#[derive(Debug)]
pub struct BlockingApiClient {
    service_url: Url,
    authorization_token: Option<String>,
    http: reqwest::blocking::Client,
}

impl BlockingApiClient {
    /// Creates a new client for the given service URL.
    pub fn new(service_url: impl AsRef<str>) -> Result<Self, ClientError> {
        Ok(Self {
            service_url: resolve_request_url(service_url.as_ref(), "")?,
            authorization_token: None,
            http: reqwest::blocking::Client::new(),
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
    pub fn execute(&self, request: RequestDescriptor) -> Result<ServiceResponse, ClientError> {
        let response = request.into_blocking(&self.http).send()?;
        let status = response.status();
        let headers = response.headers().clone();
        let payload = response.text()?;

        ServiceResponse::from_parts(status, headers, payload)
    }

    /// Sends an assembled request and parses the response as JSON.
    pub fn execute_json(&self, request: RequestDescriptor) -> Result<Value, ClientError> {
        self.execute(request)?.json()
    }

    /// Sends a `GET` request and parses the response as JSON.
    pub fn get_json(&self, path: &str, path_params: &[(&str, &str)]) -> Result<Value, ClientError> {
        let request = self.request(Method::GET, path, path_params)?.build()?;
        self.execute_json(request)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    use reqwest::Method;

    use super::BlockingApiClient;
    use crate::test_support::{not_found_response, request_complete};

    fn read_request(stream: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut chunk = [0_u8; 1024];
        while !request_complete(&data) {
            let read = stream.read(&mut chunk).expect("read request");
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    #[test]
    fn not_found_response_maps_to_service_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let address = listener.local_addr().expect("local address");
        let payload = r#"{"message":"no such key"}"#;
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let request = read_request(&mut stream);
            stream
                .write_all(not_found_response(payload).as_bytes())
                .expect("write response");
            request
        });

        let client = BlockingApiClient::new(format!("http://{address}"))
            .expect("valid url")
            .with_authorization_token("secret");
        let request = client
            .request(Method::DELETE, "/keys/{key}", &[("key", "k 1")])
            .expect("valid path")
            .form("reason", "rotated")
            .build()
            .expect("builds");

        let error = client.execute(request).expect_err("404");
        let service_error = error.as_service_error().expect("service error");
        assert!(service_error.is_not_found());
        assert_eq!(service_error.body(), payload);

        let received = server.join().expect("server thread").to_ascii_lowercase();
        assert!(received.starts_with("delete /keys/k%201 http/1.1"), "{received}");
        assert!(received.contains("accept: application/json"), "{received}");
        assert!(received.contains("authorization: bearer secret"), "{received}");
        assert!(
            received.contains("content-type: application/x-www-form-urlencoded"),
            "{received}"
        );
        assert!(received.ends_with("reason=rotated"), "{received}");
    }
}

//! HTTP transport abstraction for the job-board API
//!
//! This module provides a trait-based transport that can be easily mocked for testing.
//! Requests and responses are plain data; the [`ApiClient`](super::ApiClient) owns
//! timeouts, retries and the interceptor pipeline.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

/// HTTP method for a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Returns the wire name of the method
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved request, ready to hand to a transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Response from an HTTP request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    /// Creates a response with no headers
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns true if status is in 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if status is 401
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Returns true if status is 404
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Deserializes the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

/// What went wrong below the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// No response before the deadline
    Timeout,
    /// Connection refused, reset, or the host could not be resolved
    Connect,
    /// The response body could not be read
    Body,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connection failed",
            TransportErrorKind::Body => "body read failed",
            TransportErrorKind::Other => "transport error",
        };
        f.write_str(name)
    }
}

/// A transport-level failure: the request produced no usable HTTP response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The error produced when an attempt exceeds its deadline
    pub fn timeout(after: Duration) -> Self {
        Self::new(
            TransportErrorKind::Timeout,
            format!("no response within {}ms", after.as_millis()),
        )
    }

    /// Returns true for failures worth retrying: timeouts and connection failures
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            TransportErrorKind::Timeout | TransportErrorKind::Connect
        )
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

/// Trait for executing HTTP requests
///
/// This abstraction allows easy mocking of HTTP calls in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns whatever response the server produced,
    /// including non-2xx statuses
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport using reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a new reqwest-based transport
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .inner
            .request(request.method.to_reqwest(), &request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn mock_transport_replays_in_order() {
        let transport = MockTransport::new()
            .then_fail(TransportErrorKind::Connect)
            .then_respond(200, "{}");

        let first = transport.send(get("http://api.test/a")).await;
        let second = transport.send(get("http://api.test/a")).await;

        assert_eq!(first.unwrap_err().kind, TransportErrorKind::Connect);
        assert_eq!(second.unwrap().status, 200);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn mock_transport_without_script_errors() {
        let transport = MockTransport::new();

        let err = transport.send(get("http://api.test/unknown")).await.unwrap_err();

        assert_eq!(err.kind, TransportErrorKind::Other);
        assert!(err.message.contains("No mock reply configured"));
    }

    #[tokio::test]
    async fn mock_transport_fallback_repeats() {
        let transport = MockTransport::new().always_respond(404, "missing");

        for _ in 0..3 {
            let response = transport.send(get("http://api.test/x")).await.unwrap();
            assert!(response.is_not_found());
        }
    }

    #[test]
    fn http_response_is_success() {
        assert!(HttpResponse::new(200, "{}").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(401, "{}").is_success());
        assert!(HttpResponse::new(401, "{}").is_unauthorized());
        assert!(!HttpResponse::new(500, "{}").is_success());
    }

    #[test]
    fn http_response_json_parsing() {
        let response = HttpResponse::new(200, r#"{"name": "test", "value": 42}"#);

        let data: TestData = response.json().unwrap();
        assert_eq!(data.name, "test");
        assert_eq!(data.value, 42);
    }

    #[test]
    fn only_timeouts_and_connect_failures_are_transient() {
        assert!(TransportError::timeout(Duration::from_secs(1)).is_transient());
        assert!(TransportError::new(TransportErrorKind::Connect, "refused").is_transient());
        assert!(!TransportError::new(TransportErrorKind::Body, "eof").is_transient());
        assert!(!TransportError::new(TransportErrorKind::Other, "bad url").is_transient());
    }

    #[test]
    fn timeout_message_names_deadline() {
        let err = TransportError::timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "timeout: no response within 1500ms");
    }

    #[test]
    fn method_wire_names() {
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }
}

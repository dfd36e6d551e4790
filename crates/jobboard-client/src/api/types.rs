use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::http::HttpMethod;
use super::retry::RetryPolicy;

/// Default per-attempt deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// A scalar query parameter value
///
/// `Null` entries are kept in the config but never reach the URL.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl QueryValue {
    pub fn is_null(&self) -> bool {
        matches!(self, QueryValue::Null)
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Null => f.write_str("null"),
            QueryValue::Bool(b) => write!(f, "{b}"),
            QueryValue::Int(i) => write!(f, "{i}"),
            QueryValue::Float(x) => write!(f, "{x}"),
            QueryValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Null, Into::into)
    }
}

/// Per-call request settings
///
/// Created fresh for each call; the client fills in the method and body for
/// the verb helpers.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub method: HttpMethod,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub params: Vec<(String, QueryValue)>,
    /// Overrides the client-wide deadline for each attempt of this call
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets a header, replacing any previous value for the same name
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Appends a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

/// A decoded success response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> ApiResponse<T> {
    /// Wraps a bare payload with no message or metadata
    pub fn bare(data: T) -> Self {
        Self {
            data,
            message: None,
            meta: None,
        }
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decodes a response body
    ///
    /// A JSON object with a `data` key and no keys besides `message` and
    /// `meta` is read as the envelope. Anything else is taken as the payload
    /// itself, unchanged. An empty body decodes as `null`.
    pub fn from_body(body: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = if body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(body)?
        };

        match value {
            serde_json::Value::Object(ref map) if is_envelope(map) => serde_json::from_value(value),
            other => Ok(Self::bare(serde_json::from_value(other)?)),
        }
    }
}

const ENVELOPE_KEYS: [&str; 3] = ["data", "message", "meta"];

fn is_envelope(map: &serde_json::Map<String, serde_json::Value>) -> bool {
    map.contains_key("data") && map.keys().all(|key| ENVELOPE_KEYS.contains(&key.as_str()))
}

/// Client-wide settings fixed at construction
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub default_headers: HeaderMap,
    pub retry: RetryPolicy,
    /// Emits request/response/error traces from the logging interceptor
    pub development_logging: bool,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            default_headers: HeaderMap::new(),
            retry: RetryPolicy::default(),
            development_logging: cfg!(debug_assertions),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_development_logging(mut self, enabled: bool) -> Self {
        self.development_logging = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_values_render_as_strings() {
        assert_eq!(QueryValue::from(true).to_string(), "true");
        assert_eq!(QueryValue::from(42).to_string(), "42");
        assert_eq!(QueryValue::from(1.5).to_string(), "1.5");
        assert_eq!(QueryValue::from(2.0).to_string(), "2");
        assert_eq!(QueryValue::from("remote").to_string(), "remote");
    }

    #[test]
    fn none_becomes_null() {
        assert!(QueryValue::from(None::<i64>).is_null());
        assert_eq!(QueryValue::from(Some(5_u32)), QueryValue::Int(5));
    }

    #[test]
    fn request_config_builder() {
        let config = RequestConfig::new()
            .param("page", 2)
            .param("search", None::<String>)
            .timeout(Duration::from_secs(5));

        assert_eq!(config.method, HttpMethod::Get);
        assert_eq!(config.params.len(), 2);
        assert!(config.params[1].1.is_null());
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn decodes_envelope() {
        let body = r#"{"data":[1,2,3],"message":"ok","meta":{"total":30,"page":1,"limit":3}}"#;
        let response: ApiResponse<Vec<i32>> = ApiResponse::from_body(body).unwrap();

        assert_eq!(response.data, vec![1, 2, 3]);
        assert_eq!(response.message.as_deref(), Some("ok"));
        let meta = response.meta.unwrap();
        assert_eq!(meta.total, Some(30));
        assert_eq!(meta.limit, Some(3));
    }

    #[test]
    fn decodes_bare_payload() {
        let body = r#"{"user":{"id":"u1"},"token":"abc"}"#;
        let response: ApiResponse<serde_json::Value> = ApiResponse::from_body(body).unwrap();

        assert_eq!(response.data["token"], "abc");
        assert!(response.message.is_none());
        assert!(response.meta.is_none());
    }

    #[test]
    fn payload_with_data_and_other_keys_is_kept_whole() {
        let body = r#"{"data":{"id":"j1"},"total":1,"token":"abc"}"#;
        let response: ApiResponse<serde_json::Value> = ApiResponse::from_body(body).unwrap();

        assert_eq!(
            response.data,
            serde_json::json!({ "data": { "id": "j1" }, "total": 1, "token": "abc" })
        );
        assert!(response.message.is_none());
    }

    #[test]
    fn typed_payload_with_data_field_decodes() {
        #[derive(Debug, Deserialize)]
        struct Export {
            data: Vec<String>,
            format: String,
        }

        let body = r#"{"data":["a","b"],"format":"csv"}"#;
        let response: ApiResponse<Export> = ApiResponse::from_body(body).unwrap();

        assert_eq!(response.data.data, vec!["a", "b"]);
        assert_eq!(response.data.format, "csv");
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let unit: serde_json::Result<ApiResponse<()>> = ApiResponse::from_body("");
        assert!(unit.is_ok());

        let response: ApiResponse<Option<String>> = ApiResponse::from_body("  ").unwrap();
        assert!(response.data.is_none());
    }

    #[test]
    fn mismatched_payload_is_an_error() {
        let result: serde_json::Result<ApiResponse<Vec<i32>>> =
            ApiResponse::from_body(r#"{"data":"nope"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn client_config_defaults() {
        let config = ClientConfig::new("http://localhost:3001");

        assert_eq!(config.timeout, Duration::from_millis(30_000));
        assert_eq!(config.retry.max_retries, 3);
        assert!(config.default_headers.is_empty());
    }
}

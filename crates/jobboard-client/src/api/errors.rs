//! Error taxonomy for the job-board API client
//!
//! Every failed call ends as exactly one [`ApiError`], tagged with an
//! [`ErrorKind`]. Before classification the failure travels through the error
//! hooks as a [`Failure`], which may still be a raw response or transport error.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use super::http::{HttpResponse, TransportError, TransportErrorKind};

/// Field name to the ordered list of violation messages for that field
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const FALLBACK_MESSAGE: &str = "An error occurred";

/// The closed set of failure categories callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Any HTTP failure without a more specific category
    Api,
    /// Transport failure; no HTTP response was received
    Network,
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Server,
}

impl ErrorKind {
    /// Picks the category for an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::Validation,
            401 => ErrorKind::Authentication,
            403 => ErrorKind::Authorization,
            404 => ErrorKind::NotFound,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Api,
        }
    }

    /// The status a freshly constructed error of this kind carries
    pub fn default_status(self) -> Option<u16> {
        match self {
            ErrorKind::Validation => Some(400),
            ErrorKind::Authentication => Some(401),
            ErrorKind::Authorization => Some(403),
            ErrorKind::NotFound => Some(404),
            ErrorKind::Server => Some(500),
            ErrorKind::Api | ErrorKind::Network => None,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            ErrorKind::Api => FALLBACK_MESSAGE,
            ErrorKind::Network => "Network error occurred",
            ErrorKind::Validation => "Validation failed",
            ErrorKind::Authentication => "Authentication failed",
            ErrorKind::Authorization => "Not authorized to perform this action",
            ErrorKind::NotFound => "Resource not found",
            ErrorKind::Server => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Api => "api",
            ErrorKind::Network => "network",
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Authorization => "authorization",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Server => "server",
        };
        f.write_str(name)
    }
}

/// A classified client failure
///
/// Immutable once built; all fields are exposed through accessors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    status: Option<u16>,
    message: String,
    field_errors: Option<FieldErrors>,
    transport: Option<TransportErrorKind>,
}

impl ApiError {
    pub fn new(
        kind: ErrorKind,
        status: Option<u16>,
        message: impl Into<String>,
        field_errors: Option<FieldErrors>,
    ) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            field_errors,
            transport: None,
        }
    }

    /// An error of the given kind with its default status and message
    pub fn of(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_status(), kind.default_message(), None)
    }

    /// Classifies a server error by its status code
    pub fn from_response(
        status: u16,
        message: impl Into<String>,
        field_errors: Option<FieldErrors>,
    ) -> Self {
        Self::new(
            ErrorKind::from_status(status),
            Some(status),
            message,
            field_errors,
        )
    }

    pub fn network(transport: TransportErrorKind) -> Self {
        Self {
            transport: Some(transport),
            ..Self::of(ErrorKind::Network)
        }
    }

    pub fn validation(field_errors: FieldErrors) -> Self {
        Self {
            field_errors: Some(field_errors),
            ..Self::of(ErrorKind::Validation)
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, Some(401), message, None)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, Some(403), message, None)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, Some(404), message, None)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Server, Some(500), message, None)
    }

    /// The request payload could not be serialized; nothing was sent
    pub fn encode(err: &serde_json::Error) -> Self {
        Self::new(
            ErrorKind::Api,
            None,
            format!("Failed to serialize request body: {err}"),
            None,
        )
    }

    /// A 2xx response whose body did not match the expected shape
    pub fn decode(status: u16, err: &serde_json::Error) -> Self {
        Self::new(
            ErrorKind::Api,
            Some(status),
            format!("Failed to parse response body: {err}"),
            None,
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status, absent for network failures
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.field_errors.as_ref()
    }

    /// Violation messages reported for one field
    pub fn errors_for(&self, field: &str) -> Option<&[String]> {
        self.field_errors
            .as_ref()
            .and_then(|errors| errors.get(field))
            .map(Vec::as_slice)
    }

    /// The underlying transport failure kind, for network errors
    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        self.transport
    }

    pub fn is_network(&self) -> bool {
        self.kind == ErrorKind::Network
    }

    pub fn is_authentication(&self) -> bool {
        self.kind == ErrorKind::Authentication
    }
}

/// A failure raised inside the client, before or after classification
///
/// Error hooks receive and return this type; they can replace a failure but
/// never turn it into a success.
#[derive(Debug, Clone)]
pub enum Failure {
    /// A non-2xx response, raised as-is
    Status(HttpResponse),
    /// The transport never produced a response
    Transport(TransportError),
    /// Already classified
    Api(ApiError),
}

impl Failure {
    /// Returns true when this failure means the caller is not authenticated
    pub fn is_authentication(&self) -> bool {
        match self {
            Failure::Status(response) => response.is_unauthorized(),
            Failure::Api(err) => err.is_authentication(),
            Failure::Transport(_) => false,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Status(response) => write!(f, "HTTP {}", response.status),
            Failure::Transport(err) => write!(f, "{err}"),
            Failure::Api(err) => write!(f, "{} error: {}", err.kind, err.message),
        }
    }
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Failure::Api(err)
    }
}

impl From<TransportError> for Failure {
    fn from(err: TransportError) -> Self {
        Failure::Transport(err)
    }
}

/// Error body shape the backend sends: `{"message": ..., "errors": {...}}`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

/// Maps a raw failure to exactly one taxonomy member
///
/// Bodies that are not JSON, or not in the expected shape, are treated as
/// an empty object.
pub fn classify(failure: Failure) -> ApiError {
    match failure {
        Failure::Status(response) => classify_response(&response),
        Failure::Transport(err) => ApiError::network(err.kind),
        Failure::Api(err) => err,
    }
}

fn classify_response(response: &HttpResponse) -> ApiError {
    let body: ErrorBody = serde_json::from_str(&response.body).unwrap_or_default();

    let message = body
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

    // Anything other than a field -> [messages] map is dropped
    let field_errors = body
        .errors
        .and_then(|value| serde_json::from_value::<FieldErrors>(value).ok());

    ApiError::from_response(response.status, message, field_errors)
}

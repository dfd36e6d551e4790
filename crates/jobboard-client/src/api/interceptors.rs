//! Request/response/error hooks applied around every client call
//!
//! Hooks run in registration order and each one receives the previous hook's
//! output. An error hook may replace the failure it is given, but it has to
//! hand a failure back: there is no way to turn an error into a success.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use std::sync::Arc;

use super::errors::{classify, Failure};
use super::http::HttpResponse;
use super::types::RequestConfig;
use crate::auth::CredentialStore;
use crate::navigation::{Navigator, LOGIN_ROUTE};

/// A hook triple; every hook is optional and defaults to passing its input through
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Short name used in traces
    fn name(&self) -> &'static str;

    async fn on_request(&self, config: RequestConfig) -> RequestConfig {
        config
    }

    async fn on_response(&self, response: HttpResponse) -> HttpResponse {
        response
    }

    async fn on_error(&self, failure: Failure) -> Failure {
        failure
    }
}

/// Ordered, immutable list of interceptors
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl InterceptorChain {
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self {
            interceptors: interceptors.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Interceptor names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub async fn apply_request(&self, mut config: RequestConfig) -> RequestConfig {
        for interceptor in self.interceptors.iter() {
            config = interceptor.on_request(config).await;
        }
        config
    }

    pub async fn apply_response(&self, mut response: HttpResponse) -> HttpResponse {
        for interceptor in self.interceptors.iter() {
            response = interceptor.on_response(response).await;
        }
        response
    }

    pub async fn apply_error(&self, mut failure: Failure) -> Failure {
        for interceptor in self.interceptors.iter() {
            failure = interceptor.on_error(failure).await;
        }
        failure
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Attaches the stored bearer token and drops it when the server rejects it
pub struct AuthInterceptor {
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthInterceptor {
    pub fn new(credentials: Arc<dyn CredentialStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            credentials,
            navigator,
        }
    }
}

#[async_trait]
impl Interceptor for AuthInterceptor {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn on_request(&self, mut config: RequestConfig) -> RequestConfig {
        let token = match self.credentials.get().await {
            Ok(Some(token)) => token,
            Ok(None) => return config,
            Err(e) => {
                tracing::warn!("Failed to read stored credential: {:#}", e);
                return config;
            }
        };

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                config.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("Stored credential is not a valid header value, skipping"),
        }

        config
    }

    // Runs ahead of classification, so a raw 401 counts as well as a
    // classified authentication error.
    async fn on_error(&self, failure: Failure) -> Failure {
        if failure.is_authentication() {
            tracing::info!("Credential rejected by server, signing out");
            if let Err(e) = self.credentials.clear().await {
                tracing::warn!("Failed to clear stored credential: {:#}", e);
            }
            self.navigator.navigate(LOGIN_ROUTE);
        }
        failure
    }
}

/// Turns raw failures into classified [`ApiError`](super::ApiError)s
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorInterceptor;

#[async_trait]
impl Interceptor for ErrorInterceptor {
    fn name(&self) -> &'static str {
        "error"
    }

    async fn on_error(&self, failure: Failure) -> Failure {
        Failure::Api(classify(failure))
    }
}

/// Traces requests, responses and errors without changing them
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInterceptor {
    enabled: bool,
}

impl LoggingInterceptor {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn on_request(&self, config: RequestConfig) -> RequestConfig {
        if self.enabled {
            tracing::debug!(
                method = %config.method,
                params = ?config.params,
                has_body = config.body.is_some(),
                "Request"
            );
        }
        config
    }

    async fn on_response(&self, response: HttpResponse) -> HttpResponse {
        if self.enabled {
            tracing::debug!(status = response.status, bytes = response.body.len(), "Response");
        }
        response
    }

    async fn on_error(&self, failure: Failure) -> Failure {
        if self.enabled {
            tracing::warn!("Error: {}", failure);
        }
        failure
    }
}

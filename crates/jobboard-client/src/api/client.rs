use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::errors::{classify, ApiError, ErrorKind, Failure};
use super::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
use super::interceptors::{AuthInterceptor, ErrorInterceptor, Interceptor, InterceptorChain, LoggingInterceptor};
use super::types::{ApiResponse, ClientConfig, QueryValue, RequestConfig};
use crate::auth::{CredentialStore, MemoryCredentialStore};
use crate::navigation::{Navigator, TracingNavigator};

/// Errors raised while constructing a client
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Job-board API client
///
/// Generic over the transport implementation for testability. Every call
/// runs the interceptor chain, a per-attempt deadline and bounded retry, and
/// ends in exactly one `Ok(ApiResponse<T>)` or `Err(ApiError)`.
pub struct ApiClient<H: HttpTransport = ReqwestTransport> {
    transport: H,
    base_url: Url,
    config: ClientConfig,
    interceptors: InterceptorChain,
    credentials: Arc<dyn CredentialStore>,
}

/// Assembles an [`ApiClient`] with its built-in interceptors
pub struct ClientBuilder {
    config: ClientConfig,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    extra: Vec<Arc<dyn Interceptor>>,
}

impl ClientBuilder {
    /// Where the bearer token is read from and cleared
    pub fn credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Who performs the login redirect when a credential is rejected
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Appends an interceptor after the built-in ones
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.extra.push(interceptor);
        self
    }

    /// Builds a client over the production reqwest transport
    pub fn build(self) -> Result<ApiClient, BuildError> {
        self.build_with_transport(ReqwestTransport::new())
    }

    /// Builds a client over a custom transport
    pub fn build_with_transport<H: HttpTransport>(
        self,
        transport: H,
    ) -> Result<ApiClient<H>, BuildError> {
        let base_url = parse_base_url(&self.config.base_url)?;

        // Fixed order: auth, error classification, logging, then extras
        let mut interceptors: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(AuthInterceptor::new(self.credentials.clone(), self.navigator)),
            Arc::new(ErrorInterceptor),
            Arc::new(LoggingInterceptor::new(self.config.development_logging)),
        ];
        interceptors.extend(self.extra);

        Ok(ApiClient {
            transport,
            base_url,
            config: self.config,
            interceptors: InterceptorChain::new(interceptors),
            credentials: self.credentials,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, BuildError> {
    let invalid = |reason: String| BuildError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    Ok(url)
}

impl ApiClient<ReqwestTransport> {
    /// Starts building a client
    ///
    /// Without further configuration the credential is kept in memory and
    /// login redirects are only logged.
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            credentials: Arc::new(MemoryCredentialStore::new()),
            navigator: Arc::new(TracingNavigator),
            extra: Vec::new(),
        }
    }
}

impl<H: HttpTransport> ApiClient<H> {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    /// The store the auth interceptor reads the bearer token from
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Resolves `path` against the base URL and appends the non-null params
    pub fn build_url(&self, path: &str, params: &[(String, QueryValue)]) -> Result<String, ApiError> {
        let mut url = self.base_url.join(path).map_err(|e| {
            ApiError::new(
                ErrorKind::Api,
                None,
                format!("Invalid request path {path:?}: {e}"),
                None,
            )
        })?;

        let mut present = params.iter().filter(|(_, value)| !value.is_null()).peekable();
        if present.peek().is_some() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in present {
                pairs.append_pair(key, &value.to_string());
            }
        }

        Ok(url.into())
    }

    /// Issues a request and decodes the JSON response
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<ApiResponse<T>, ApiError> {
        match self.execute(path, config).await {
            Ok(response) => Ok(response),
            Err(failure) => Err(classify(self.interceptors.apply_error(failure).await)),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<ApiResponse<T>, Failure> {
        let config = self
            .interceptors
            .apply_request(self.merge_headers(config))
            .await;

        let url = self.build_url(path, &config.params)?;
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        let request = HttpRequest {
            method: config.method,
            url,
            headers: config.headers,
            body: config.body,
        };

        let response = self.send_with_retry(request, timeout).await?;
        let response = self.interceptors.apply_response(response).await;

        if !response.is_success() {
            return Err(Failure::Status(response));
        }

        ApiResponse::from_body(&response.body)
            .map_err(|e| Failure::Api(ApiError::decode(response.status, &e)))
    }

    /// JSON content type, then client defaults, then per-call headers
    fn merge_headers(&self, mut config: RequestConfig) -> RequestConfig {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(self.config.default_headers.clone());
        headers.extend(std::mem::take(&mut config.headers));
        config.headers = headers;
        config
    }

    async fn send_with_retry(
        &self,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let policy = self.config.retry;
        let mut retries = 0;

        loop {
            let attempt = tokio::time::timeout(timeout, self.transport.send(request.clone()))
                .await
                .unwrap_or_else(|_| Err(TransportError::timeout(timeout)));

            match attempt {
                Ok(response) => return Ok(response),
                Err(err) if policy.should_retry(retries, &err) => {
                    retries += 1;
                    tracing::warn!(
                        "{} {} failed ({}), retry {}/{} in {:?}",
                        request.method,
                        request.url,
                        err,
                        retries,
                        policy.max_retries,
                        policy.delay
                    );
                    tokio::time::sleep(policy.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn with_body<B: Serialize + ?Sized>(
        method: HttpMethod,
        data: &B,
        config: RequestConfig,
    ) -> Result<RequestConfig, ApiError> {
        let body = serde_json::to_vec(data).map_err(|e| ApiError::encode(&e))?;
        Ok(RequestConfig {
            method,
            body: Some(body),
            ..config
        })
    }
}

// Verb helpers
impl<H: HttpTransport> ApiClient<H> {
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.get_with(path, RequestConfig::new()).await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(path, config.method(HttpMethod::Get)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.post_with(path, data, RequestConfig::new()).await
    }

    pub async fn post_with<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &B,
        config: RequestConfig,
    ) -> Result<ApiResponse<T>, ApiError> {
        let config = Self::with_body(HttpMethod::Post, data, config)?;
        self.request(path, config).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.put_with(path, data, RequestConfig::new()).await
    }

    pub async fn put_with<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &B,
        config: RequestConfig,
    ) -> Result<ApiResponse<T>, ApiError> {
        let config = Self::with_body(HttpMethod::Put, data, config)?;
        self.request(path, config).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.patch_with(path, data, RequestConfig::new()).await
    }

    pub async fn patch_with<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &B,
        config: RequestConfig,
    ) -> Result<ApiResponse<T>, ApiError> {
        let config = Self::with_body(HttpMethod::Patch, data, config)?;
        self.request(path, config).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.delete_with(path, RequestConfig::new()).await
    }

    pub async fn delete_with<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(path, config.method(HttpMethod::Delete)).await
    }
}

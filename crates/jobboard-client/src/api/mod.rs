pub mod client;
pub mod errors;
pub mod http;
pub mod interceptors;
pub mod retry;
pub mod types;

pub use client::{ApiClient, BuildError, ClientBuilder};
pub use errors::{classify, ApiError, ErrorKind, Failure, FieldErrors};
pub use http::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
    TransportErrorKind,
};
pub use interceptors::{
    AuthInterceptor, ErrorInterceptor, Interceptor, InterceptorChain, LoggingInterceptor,
};
pub use retry::RetryPolicy;
pub use types::{ApiResponse, ClientConfig, Meta, QueryValue, RequestConfig, DEFAULT_TIMEOUT};

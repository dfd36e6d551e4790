use serde_json::json;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use super::ChangeType;
use crate::api::{ApiClient, ApiError, ErrorKind, HttpMethod, HttpTransport, ReqwestTransport, RequestConfig};
use crate::navigation::{require_auth, require_guest, Redirect};
use crate::types::{AuthPayload, LoginRequest, RegisterRequest, SessionPayload, User};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const SESSION_PATH: &str = "/api/auth/session";
pub const FORGOT_PASSWORD_PATH: &str = "/api/auth/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/api/auth/reset-password";

/// Snapshot of the session store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Session store: who is signed in, plus the status of the last action
pub struct AuthStore<H: HttpTransport = ReqwestTransport> {
    client: Arc<ApiClient<H>>,
    inner: RwLock<AuthState>,
    change_tx: watch::Sender<Option<ChangeType>>,
    change_rx: watch::Receiver<Option<ChangeType>>,
}

/// Message shown for a failed action: validation messages pass through,
/// everything else gets the action's fallback
fn action_error(err: &ApiError, fallback: &str) -> String {
    match err.kind() {
        ErrorKind::Validation => err.message().to_string(),
        _ => fallback.to_string(),
    }
}

impl<H: HttpTransport> AuthStore<H> {
    /// Creates a store over a shared client
    ///
    /// The token is kept in the client's own credential store.
    pub fn new(client: Arc<ApiClient<H>>) -> Arc<Self> {
        let (change_tx, change_rx) = watch::channel(None);
        Arc::new(Self {
            client,
            inner: RwLock::new(AuthState::default()),
            change_tx,
            change_rx,
        })
    }

    /// Returns a receiver for state change notifications
    pub fn subscribe(&self) -> watch::Receiver<Option<ChangeType>> {
        self.change_rx.clone()
    }

    fn notify_change(&self, change_type: ChangeType) {
        let _ = self.change_tx.send(Some(change_type));
    }

    // Getters

    pub async fn snapshot(&self) -> AuthState {
        self.inner.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.user.is_some()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.loading
    }

    pub async fn has_error(&self) -> bool {
        self.inner.read().await.error.is_some()
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.error.clone()
    }

    /// Route guard for pages that need a session
    pub async fn guard_auth(&self) -> Option<Redirect> {
        require_auth(self.is_authenticated().await)
    }

    /// Route guard for guest-only pages
    pub async fn guard_guest(&self) -> Option<Redirect> {
        require_guest(self.is_authenticated().await)
    }

    // Internal state transitions

    async fn begin(&self) {
        let mut state = self.inner.write().await;
        state.loading = true;
        state.error = None;
        drop(state);

        self.notify_change(ChangeType::Status);
    }

    async fn finish(&self, error: Option<String>) {
        let mut state = self.inner.write().await;
        state.loading = false;
        state.error = error;
        drop(state);

        self.notify_change(ChangeType::Status);
    }

    async fn set_user(&self, user: Option<User>) {
        let mut state = self.inner.write().await;
        let changed = state.user != user;
        state.user = user;
        drop(state);

        if changed {
            self.notify_change(ChangeType::Session);
        }
    }

    async fn store_token(&self, token: &str) {
        if let Err(e) = self.client.credentials().set(token).await {
            tracing::warn!("Failed to persist auth token: {:#}", e);
        }
    }

    async fn drop_token(&self) {
        if let Err(e) = self.client.credentials().clear().await {
            tracing::warn!("Failed to clear auth token: {:#}", e);
        }
    }

    async fn sign_in(&self, payload: &AuthPayload) {
        self.store_token(&payload.token).await;
        self.set_user(Some(payload.user.clone())).await;
    }

    // Actions

    /// Signs in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
        self.begin().await;

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.client.post::<AuthPayload, _>(LOGIN_PATH, &request).await {
            Ok(response) => {
                let payload = response.into_data();
                self.sign_in(&payload).await;
                self.finish(None).await;
                tracing::info!("Signed in as {}", payload.user.email);
                Ok(payload)
            }
            Err(err) => {
                let message = match err.kind() {
                    ErrorKind::Authentication => "Invalid email or password".to_string(),
                    _ => action_error(&err, "An error occurred during login"),
                };
                self.finish(Some(message)).await;
                Err(err)
            }
        }
    }

    /// Creates an account and signs in with it
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ApiError> {
        self.begin().await;

        match self.client.post::<AuthPayload, _>(REGISTER_PATH, request).await {
            Ok(response) => {
                let payload = response.into_data();
                self.sign_in(&payload).await;
                self.finish(None).await;
                tracing::info!("Registered {}", payload.user.email);
                Ok(payload)
            }
            Err(err) => {
                self.finish(Some(action_error(&err, "An error occurred during registration")))
                    .await;
                Err(err)
            }
        }
    }

    /// Ends the session on the server, then forgets it locally
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.begin().await;

        let config = RequestConfig::new().method(HttpMethod::Post);
        match self.client.request::<serde_json::Value>(LOGOUT_PATH, config).await {
            Ok(_) => {
                self.set_user(None).await;
                self.drop_token().await;
                self.finish(None).await;
                tracing::info!("Signed out");
                Ok(())
            }
            Err(err) => {
                self.finish(Some("An error occurred during logout".to_string()))
                    .await;
                Err(err)
            }
        }
    }

    /// Validates the stored token against the server
    ///
    /// Any failure signs the user out locally. Only authentication failures
    /// are returned as errors; other failures yield `Ok(None)`.
    pub async fn check_auth(&self) -> Result<Option<User>, ApiError> {
        self.begin().await;

        let result = self.client.get::<SessionPayload>(SESSION_PATH).await;
        let outcome = match result {
            Ok(response) => {
                let user = response.into_data().user;
                self.set_user(Some(user.clone())).await;
                Ok(Some(user))
            }
            Err(err) => {
                tracing::debug!("Session check failed: {}", err);
                self.set_user(None).await;
                self.drop_token().await;
                if err.is_authentication() {
                    Err(err)
                } else {
                    Ok(None)
                }
            }
        };

        self.finish(None).await;
        outcome
    }

    /// Asks the server to send a password reset link
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        self.begin().await;

        let body = json!({ "email": email });
        match self.client.post::<serde_json::Value, _>(FORGOT_PASSWORD_PATH, &body).await {
            Ok(_) => {
                self.finish(None).await;
                Ok(())
            }
            Err(err) => {
                self.finish(Some(action_error(
                    &err,
                    "An error occurred while requesting password reset",
                )))
                .await;
                Err(err)
            }
        }
    }

    /// Sets a new password using a reset token
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        self.begin().await;

        let body = json!({ "token": token, "newPassword": new_password });
        match self.client.post::<serde_json::Value, _>(RESET_PASSWORD_PATH, &body).await {
            Ok(_) => {
                self.finish(None).await;
                Ok(())
            }
            Err(err) => {
                self.finish(Some(action_error(
                    &err,
                    "An error occurred while resetting password",
                )))
                .await;
                Err(err)
            }
        }
    }
}

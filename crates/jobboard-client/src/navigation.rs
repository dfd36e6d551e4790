//! Navigation side effects and route guards
//!
//! The client never navigates on its own; it asks a [`Navigator`] to. Route
//! guards are pure decisions over the session state.

/// Where unauthenticated users are sent
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Where authenticated users are sent away from guest-only pages
pub const HOME_ROUTE: &str = "/";

/// Trait for performing redirects
///
/// This abstraction allows easy mocking of navigation in tests.
pub trait Navigator: Send + Sync {
    /// Moves the user to `route`
    fn navigate(&self, route: &str);
}

/// Navigator for headless use: records the redirect in the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!("Redirecting to {}", route);
    }
}

/// Outcome of a route guard that refuses entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect(pub &'static str);

/// Guard for pages that need a signed-in user
pub fn require_auth(is_authenticated: bool) -> Option<Redirect> {
    (!is_authenticated).then_some(Redirect(LOGIN_ROUTE))
}

/// Guard for pages only guests should see (login, register)
pub fn require_guest(is_authenticated: bool) -> Option<Redirect> {
    is_authenticated.then_some(Redirect(HOME_ROUTE))
}

/// Navigator that records every redirect
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: std::sync::Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every route navigated to, oldest first
    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}

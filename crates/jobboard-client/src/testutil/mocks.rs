//! Mock implementations for testing
//!
//! This module re-exports mock implementations from their respective modules
//! for convenient access in tests.

// Re-export transport mocks
pub use crate::api::http::mock::MockTransport;

// Re-export credential and navigation doubles
pub use crate::auth::MemoryCredentialStore;
pub use crate::navigation::RecordingNavigator;

//! State holders that drive the API client for the UI layer
//!
//! Each store keeps its fields behind a tokio `RwLock` and announces changes
//! on a `watch` channel. Actions flip `loading` on, clear `error`, and always
//! flip `loading` back off before returning.

pub mod auth;
pub mod jobs;

pub use auth::{AuthState, AuthStore};
pub use jobs::{JobsState, JobsStore};

/// Type of store change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// `loading` or `error` moved
    Status,
    Session,
    Jobs,
    FeaturedJobs,
    CurrentJob,
    Filters,
    Page,
}

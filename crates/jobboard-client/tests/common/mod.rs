//! Common test utilities for integration tests

#![allow(dead_code)]

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use jobboard_client::api::{ApiClient, ClientConfig, RetryPolicy};
use jobboard_client::auth::MemoryCredentialStore;
use jobboard_client::navigation::RecordingNavigator;

/// Client settings tuned for tests: short deadline, quick retries
pub fn fast_config(base_url: &str) -> ClientConfig {
    ClientConfig::new(base_url)
        .with_timeout(Duration::from_millis(300))
        .with_retry(RetryPolicy::new(3, Duration::from_millis(20)))
        .with_development_logging(true)
}

/// A client wired to in-memory credentials and a recording navigator
pub struct TestClient {
    pub client: Arc<ApiClient>,
    pub credentials: Arc<MemoryCredentialStore>,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn test_client(config: ClientConfig) -> TestClient {
    let credentials = Arc::new(MemoryCredentialStore::new());
    let navigator = Arc::new(RecordingNavigator::new());
    let client = ApiClient::builder(config)
        .credentials(credentials.clone())
        .navigator(navigator.clone())
        .build()
        .expect("Failed to build client");

    TestClient {
        client: Arc::new(client),
        credentials,
        navigator,
    }
}

/// A URL nothing is listening on
pub fn unused_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Creates a job posting as the backend sends it
pub fn make_job(id: &str, title: &str) -> Value {
    let created = (Utc::now() - ChronoDuration::days(1)).to_rfc3339();
    json!({
        "id": id,
        "title": title,
        "company_id": "company_1",
        "description": "Build and run services.",
        "requirements": ["3+ years"],
        "responsibilities": ["Own the API"],
        "location": "Kyiv",
        "type": "FULL_TIME",
        "experience": "MID",
        "category": "Engineering",
        "salary": { "min": 3000, "max": 5000, "currency": "USD" },
        "skills": ["rust"],
        "benefits": [],
        "is_remote": false,
        "is_featured": false,
        "status": "PUBLISHED",
        "applications_count": 0,
        "views_count": 12,
        "created_at": created,
        "updated_at": created
    })
}

/// Creates a user the way the backend serializes it
pub fn make_user(email: &str) -> Value {
    json!({
        "id": "user_1",
        "email": email,
        "firstName": "Ada",
        "lastName": "Lovelace",
        "role": "JOB_SEEKER",
        "createdAt": "2024-03-01T10:00:00.000Z",
        "updatedAt": "2024-03-01T10:00:00.000Z"
    })
}

//! Test fixtures
//!
//! Pre-built response bodies for common testing scenarios.

use serde_json::{json, Value};

use super::builders::{JobBuilder, UserBuilder};
use crate::types::{Experience, JobType};

/// A small mixed page of listings
pub fn sample_jobs_json() -> Vec<Value> {
    vec![
        JobBuilder::new().id("1").title("Backend Engineer").json(),
        JobBuilder::new()
            .id("2")
            .title("Frontend Engineer")
            .job_type(JobType::Contract)
            .remote()
            .json(),
        JobBuilder::new()
            .id("3")
            .title("Engineering Lead")
            .experience(Experience::Lead)
            .featured()
            .json(),
    ]
}

/// `GET /api/jobs` body with the given total
pub fn job_list_json(jobs: Vec<Value>, total: u64) -> Value {
    json!({ "jobs": jobs, "total": total })
}

/// `POST /api/auth/login` body, as the backend sends it (no envelope)
pub fn auth_payload_json(email: &str, token: &str) -> Value {
    json!({
        "user": UserBuilder::new().email(email).json(),
        "token": token,
    })
}

/// Server error body with optional field errors
pub fn error_json(message: &str, errors: Option<Value>) -> Value {
    match errors {
        Some(errors) => json!({ "message": message, "errors": errors }),
        None => json!({ "message": message }),
    }
}

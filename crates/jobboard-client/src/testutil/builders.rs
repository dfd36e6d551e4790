//! Test data builders
//!
//! Provides builder patterns for creating test data with sensible defaults.

use chrono::{DateTime, Duration, Utc};

use crate::types::{
    CreateJob, Currency, Experience, Job, JobStatus, JobType, Role, Salary, User,
};

/// Builder for creating test User objects
#[derive(Debug, Clone)]
pub struct UserBuilder {
    id: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Role,
    created_at: DateTime<Utc>,
}

impl Default for UserBuilder {
    fn default() -> Self {
        Self {
            id: "user_123".to_string(),
            email: "test@example.com".to_string(),
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
            role: Role::JobSeeker,
            created_at: Utc::now() - Duration::days(30),
        }
    }
}

impl UserBuilder {
    /// Creates a new user builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets first and last name
    pub fn names(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Builds the User
    pub fn build(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: None,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            avatar_url: None,
            company_id: None,
            created_at: Some(self.created_at),
            updated_at: Some(self.created_at),
        }
    }

    /// Builds the User as a JSON value
    pub fn json(self) -> serde_json::Value {
        serde_json::to_value(self.build()).expect("Failed to serialize test user")
    }
}

/// Builder for creating test Job objects
#[derive(Debug, Clone)]
pub struct JobBuilder {
    id: String,
    title: String,
    location: String,
    job_type: JobType,
    experience: Experience,
    category: String,
    salary: Salary,
    is_remote: bool,
    is_featured: bool,
    status: JobStatus,
    created_at: DateTime<Utc>,
}

impl Default for JobBuilder {
    fn default() -> Self {
        Self {
            id: "job_123".to_string(),
            title: "Backend Engineer".to_string(),
            location: "Kyiv".to_string(),
            job_type: JobType::FullTime,
            experience: Experience::Mid,
            category: "Engineering".to_string(),
            salary: Salary {
                min: Some(3000.0),
                max: Some(5000.0),
                currency: Currency::Usd,
            },
            is_remote: false,
            is_featured: false,
            status: JobStatus::Published,
            created_at: Utc::now() - Duration::days(2),
        }
    }
}

impl JobBuilder {
    /// Creates a new job builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn job_type(mut self, job_type: JobType) -> Self {
        self.job_type = job_type;
        self
    }

    pub fn experience(mut self, experience: Experience) -> Self {
        self.experience = experience;
        self
    }

    pub fn salary(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.salary.min = min;
        self.salary.max = max;
        self
    }

    pub fn remote(mut self) -> Self {
        self.is_remote = true;
        self
    }

    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    /// Builds the Job
    pub fn build(self) -> Job {
        Job {
            id: self.id,
            title: self.title,
            company_id: "company_1".to_string(),
            description: "Build and run services.".to_string(),
            requirements: vec!["3+ years".to_string()],
            responsibilities: vec!["Own the API".to_string()],
            location: self.location,
            job_type: self.job_type,
            experience: self.experience,
            category: self.category,
            salary: self.salary,
            skills: vec!["rust".to_string()],
            benefits: vec![],
            is_remote: self.is_remote,
            is_featured: self.is_featured,
            status: self.status,
            applications_count: 0,
            views_count: 0,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }

    /// Builds the Job as a JSON value
    pub fn json(self) -> serde_json::Value {
        serde_json::to_value(self.build()).expect("Failed to serialize test job")
    }
}

/// Builder for creating job creation payloads
#[derive(Debug, Clone)]
pub struct CreateJobBuilder {
    inner: CreateJob,
}

impl Default for CreateJobBuilder {
    fn default() -> Self {
        let job = JobBuilder::new().build();
        Self {
            inner: CreateJob {
                title: job.title,
                company_id: job.company_id,
                description: job.description,
                requirements: job.requirements,
                responsibilities: job.responsibilities,
                location: job.location,
                job_type: job.job_type,
                experience: job.experience,
                category: job.category,
                salary: job.salary,
                skills: job.skills,
                benefits: job.benefits,
                is_remote: job.is_remote,
                is_featured: false,
                status: JobStatus::Draft,
            },
        }
    }
}

impl CreateJobBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.inner.title = title.into();
        self
    }

    pub fn build(self) -> CreateJob {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_builder_defaults() {
        let job = JobBuilder::new().build();

        assert_eq!(job.id, "job_123");
        assert_eq!(job.job_type, JobType::FullTime);
        assert_eq!(job.status, JobStatus::Published);
        assert!(!job.is_featured);
    }

    #[test]
    fn job_json_round_trips_through_wire_shape() {
        let value = JobBuilder::new().id("7").remote().json();

        assert_eq!(value["type"], "FULL_TIME");
        assert_eq!(value["is_remote"], true);
        let job: Job = serde_json::from_value(value).unwrap();
        assert_eq!(job.id, "7");
    }

    #[test]
    fn user_builder_customization() {
        let user = UserBuilder::new()
            .email("hr@example.com")
            .role(Role::Hr)
            .names("Grace", "Hopper")
            .build();

        assert_eq!(user.email, "hr@example.com");
        assert_eq!(user.display_name(), "Grace Hopper");
    }
}

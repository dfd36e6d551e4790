use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::QueryValue;

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    JobSeeker,
    Hr,
    Admin,
}

/// A signed-in account as returned by the auth endpoints
///
/// The backend answers with camelCase column names for some fields, so both
/// spellings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, alias = "avatarUrl")]
    pub avatar_url: Option<String>,
    #[serde(default, alias = "companyId")]
    pub company_id: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Returns the best available human-readable name
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if full.is_empty() {
            self.email.clone()
        } else {
            full
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::FullTime => "FULL_TIME",
            JobType::PartTime => "PART_TIME",
            JobType::Contract => "CONTRACT",
            JobType::Internship => "INTERNSHIP",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Experience {
    Entry,
    Junior,
    Mid,
    Senior,
    Lead,
}

impl Experience {
    pub fn as_str(self) -> &'static str {
        match self {
            Experience::Entry => "ENTRY",
            Experience::Junior => "JUNIOR",
            Experience::Mid => "MID",
            Experience::Senior => "SENIOR",
            Experience::Lead => "LEAD",
        }
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Uah,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Uah => "UAH",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    #[default]
    Draft,
    Published,
    Closed,
}

/// Salary band; either bound may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(default)]
    pub currency: Currency,
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "{min}-{max} {}", self.currency),
            (Some(min), None) => write!(f, "from {min} {}", self.currency),
            (None, Some(max)) => write!(f, "up to {max} {}", self.currency),
            (None, None) => f.write_str("not specified"),
        }
    }
}

/// A job posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company_id: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub experience: Experience,
    pub category: String,
    #[serde(default)]
    pub salary: Salary,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub applications_count: u64,
    #[serde(default)]
    pub views_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a job posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJob {
    pub title: String,
    pub company_id: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub experience: Experience,
    pub category: String,
    pub salary: Salary,
    pub skills: Vec<String>,
    pub benefits: Vec<String>,
    pub is_remote: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub status: JobStatus,
}

/// Partial update for a job posting; unset fields are left out of the body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateJob {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Experience>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_remote: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

/// Salary bounds used when filtering listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Listing filters; empty strings mean "no filter"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFilters {
    pub search: String,
    pub location: String,
    pub category: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub experience: String,
    pub salary: SalaryRange,
}

/// A partial filter change; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFiltersUpdate {
    pub search: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub job_type: Option<String>,
    pub experience: Option<String>,
    pub salary: Option<SalaryRange>,
}

impl JobFilters {
    /// Applies a partial update
    pub fn merge(&mut self, update: JobFiltersUpdate) {
        if let Some(search) = update.search {
            self.search = search;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(job_type) = update.job_type {
            self.job_type = job_type;
        }
        if let Some(experience) = update.experience {
            self.experience = experience;
        }
        if let Some(salary) = update.salary {
            self.salary = salary;
        }
    }

    /// Query parameters for the listing endpoint
    ///
    /// Empty text filters are left out. Salary bounds are always present as
    /// entries but render nothing when unset.
    pub fn to_query(&self) -> Vec<(String, QueryValue)> {
        let text = [
            ("search", &self.search),
            ("location", &self.location),
            ("category", &self.category),
            ("type", &self.job_type),
            ("experience", &self.experience),
        ];

        let mut params: Vec<(String, QueryValue)> = text
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(key, value)| (key.to_string(), QueryValue::from(value.as_str())))
            .collect();

        params.push(("salary_min".to_string(), self.salary.min.into()));
        params.push(("salary_max".to_string(), self.salary.max.into()));
        params
    }
}

/// Body of `POST /api/auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/auth/register`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Login and registration answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

/// Session check answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub user: User,
}

/// A page of job postings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobList {
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub total: u64,
}

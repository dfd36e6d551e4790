use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use super::ChangeType;
use crate::api::{ApiClient, ApiError, HttpTransport, QueryValue, ReqwestTransport, RequestConfig};
use crate::types::{CreateJob, Job, JobFilters, JobFiltersUpdate, JobList, UpdateJob};

pub const JOBS_PATH: &str = "/api/jobs";
pub const FEATURED_JOBS_PATH: &str = "/api/jobs/featured";

const DEFAULT_ITEMS_PER_PAGE: u32 = 10;

fn job_path(id: &str) -> String {
    format!("{}/{}", JOBS_PATH, urlencoding::encode(id))
}

/// Snapshot of the listings store
#[derive(Debug, Clone, PartialEq)]
pub struct JobsState {
    pub jobs: Vec<Job>,
    pub featured_jobs: Vec<Job>,
    pub current_job: Option<Job>,
    pub loading: bool,
    pub error: Option<String>,
    pub filters: JobFilters,
    pub total_jobs: u64,
    pub current_page: u32,
    pub items_per_page: u32,
}

impl Default for JobsState {
    fn default() -> Self {
        Self {
            jobs: Vec::new(),
            featured_jobs: Vec::new(),
            current_job: None,
            loading: false,
            error: None,
            filters: JobFilters::default(),
            total_jobs: 0,
            current_page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl JobsState {
    pub fn has_jobs(&self) -> bool {
        !self.jobs.is_empty()
    }

    pub fn has_featured_jobs(&self) -> bool {
        !self.featured_jobs.is_empty()
    }

    /// Number of pages needed for `total_jobs`, rounded up
    pub fn total_pages(&self) -> u64 {
        match self.items_per_page {
            0 => 0,
            per_page => self.total_jobs.div_ceil(u64::from(per_page)),
        }
    }
}

/// Job listings store
pub struct JobsStore<H: HttpTransport = ReqwestTransport> {
    client: Arc<ApiClient<H>>,
    inner: RwLock<JobsState>,
    change_tx: watch::Sender<Option<ChangeType>>,
    change_rx: watch::Receiver<Option<ChangeType>>,
}

impl<H: HttpTransport> JobsStore<H> {
    pub fn new(client: Arc<ApiClient<H>>) -> Arc<Self> {
        let (change_tx, change_rx) = watch::channel(None);
        Arc::new(Self {
            client,
            inner: RwLock::new(JobsState::default()),
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

    pub async fn snapshot(&self) -> JobsState {
        self.inner.read().await.clone()
    }

    pub async fn jobs(&self) -> Vec<Job> {
        self.inner.read().await.jobs.clone()
    }

    pub async fn featured_jobs(&self) -> Vec<Job> {
        self.inner.read().await.featured_jobs.clone()
    }

    pub async fn current_job(&self) -> Option<Job> {
        self.inner.read().await.current_job.clone()
    }

    pub async fn filters(&self) -> JobFilters {
        self.inner.read().await.filters.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.error.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.loading
    }

    pub async fn has_jobs(&self) -> bool {
        self.inner.read().await.has_jobs()
    }

    pub async fn has_featured_jobs(&self) -> bool {
        self.inner.read().await.has_featured_jobs()
    }

    pub async fn total_pages(&self) -> u64 {
        self.inner.read().await.total_pages()
    }

    // Plain setters

    /// Merges a partial filter change into the current filters
    pub async fn set_filters(&self, update: JobFiltersUpdate) {
        self.inner.write().await.filters.merge(update);
        self.notify_change(ChangeType::Filters);
    }

    pub async fn set_page(&self, page: u32) {
        self.inner.write().await.current_page = page;
        self.notify_change(ChangeType::Page);
    }

    pub async fn set_items_per_page(&self, items_per_page: u32) {
        self.inner.write().await.items_per_page = items_per_page;
        self.notify_change(ChangeType::Page);
    }

    // Internal state transitions

    async fn begin(&self) {
        let mut state = self.inner.write().await;
        state.loading = true;
        state.error = None;
        drop(state);

        self.notify_change(ChangeType::Status);
    }

    async fn finish<T>(&self, result: &Result<T, ApiError>) {
        let mut state = self.inner.write().await;
        state.loading = false;
        state.error = result.as_ref().err().map(|e| e.message().to_string());
        drop(state);

        if let Err(e) = result {
            tracing::warn!("Jobs request failed: {}", e);
        }
        self.notify_change(ChangeType::Status);
    }

    // Actions

    /// Loads the current page of listings using the active filters
    pub async fn fetch_jobs(&self) -> Result<JobList, ApiError> {
        self.begin().await;

        let config = {
            let state = self.inner.read().await;
            let mut params = vec![
                ("page".to_string(), QueryValue::from(state.current_page)),
                ("limit".to_string(), QueryValue::from(state.items_per_page)),
            ];
            params.extend(state.filters.to_query());
            RequestConfig {
                params,
                ..RequestConfig::new()
            }
        };

        let result = self
            .client
            .get_with::<JobList>(JOBS_PATH, config)
            .await
            .map(|r| r.into_data());

        if let Ok(ref list) = result {
            let mut state = self.inner.write().await;
            state.jobs = list.jobs.clone();
            state.total_jobs = list.total;
            drop(state);
            self.notify_change(ChangeType::Jobs);
        }

        self.finish(&result).await;
        result
    }

    pub async fn fetch_featured_jobs(&self) -> Result<JobList, ApiError> {
        self.begin().await;

        let result = self
            .client
            .get::<JobList>(FEATURED_JOBS_PATH)
            .await
            .map(|r| r.into_data());

        if let Ok(ref list) = result {
            self.inner.write().await.featured_jobs = list.jobs.clone();
            self.notify_change(ChangeType::FeaturedJobs);
        }

        self.finish(&result).await;
        result
    }

    pub async fn fetch_job_by_id(&self, id: &str) -> Result<Job, ApiError> {
        self.begin().await;

        let result = self
            .client
            .get::<Job>(&job_path(id))
            .await
            .map(|r| r.into_data());

        if let Ok(ref job) = result {
            self.inner.write().await.current_job = Some(job.clone());
            self.notify_change(ChangeType::CurrentJob);
        }

        self.finish(&result).await;
        result
    }

    pub async fn create_job(&self, job: &CreateJob) -> Result<Job, ApiError> {
        self.begin().await;

        let result = self
            .client
            .post::<Job, _>(JOBS_PATH, job)
            .await
            .map(|r| r.into_data());

        self.finish(&result).await;
        result
    }

    /// Applies a partial update and refreshes any local copy of the job
    pub async fn update_job(&self, id: &str, update: &UpdateJob) -> Result<Job, ApiError> {
        self.begin().await;

        let result = self
            .client
            .patch::<Job, _>(&job_path(id), update)
            .await
            .map(|r| r.into_data());

        if let Ok(ref job) = result {
            let mut state = self.inner.write().await;
            let mut changed = false;
            for existing in state.jobs.iter_mut().filter(|j| j.id == job.id) {
                *existing = job.clone();
                changed = true;
            }
            if state.current_job.as_ref().is_some_and(|c| c.id == job.id) {
                state.current_job = Some(job.clone());
                changed = true;
            }
            drop(state);

            if changed {
                self.notify_change(ChangeType::Jobs);
            }
        }

        self.finish(&result).await;
        result
    }

    /// Deletes a job and drops it from the loaded listings
    pub async fn delete_job(&self, id: &str) -> Result<(), ApiError> {
        self.begin().await;

        let result = self
            .client
            .delete::<serde_json::Value>(&job_path(id))
            .await
            .map(|_| ());

        if result.is_ok() {
            self.inner.write().await.jobs.retain(|job| job.id != id);
            self.notify_change(ChangeType::Jobs);
        }

        self.finish(&result).await;
        result
    }
}

//! The job catalog contract (spec §6): `get_jobs`, `get_job`, `submit_job`,
//! `update_job`, `add_frame`, `get_latest`.
//!
//! Modeled as a trait so the scheduler and event model can be exercised
//! against [`FakeCatalog`] without a live PocketBase instance; the real
//! implementation is [`http::PocketbaseCatalog`].

pub mod http;

#[cfg(feature = "test-support")]
mod fake;
#[cfg(feature = "test-support")]
pub use fake::FakeCatalog;

use crate::fits::FitsFrame;
use async_trait::async_trait;
use obs_core::{CaptureStatus, Job, JobId, SolveStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("job {0} not found in catalog")]
    NotFound(JobId),
    #[error("catalog request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("catalog response was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to compress frame: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Fits(#[from] crate::fits::FitsError),
    #[error("catalog authentication failed: {0}")]
    Auth(String),
}

/// A patch of fields to write back to a job record.
///
/// `update_job` is the single choke point for catalog mutations (spec
/// §4.4): every field here is optional, and `log`, when set, is appended
/// (not replaced) to the job's existing log the way
/// `original_source/scheduler/cache.py::update_job` re-reads the current
/// log before writing. `frame` uses a doubly-optional shape so a caller can
/// explicitly clear the field (`Sync` deletes the frame once consumed)
/// versus leaving it untouched.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub capture_status: Option<CaptureStatus>,
    pub solve: Option<SolveStatus>,
    pub frame: Option<Option<String>>,
    pub jd_obs: Option<f64>,
    pub log: Option<String>,
}

impl JobPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capture_status(mut self, status: CaptureStatus) -> Self {
        self.capture_status = Some(status);
        self
    }

    pub fn solve(mut self, solve: SolveStatus) -> Self {
        self.solve = Some(solve);
        self
    }

    pub fn clear_frame(mut self) -> Self {
        self.frame = Some(None);
        self
    }

    pub fn jd_obs(mut self, jd_obs: f64) -> Self {
        self.jd_obs = Some(jd_obs);
        self
    }

    pub fn log(mut self, message: impl Into<String>) -> Self {
        self.log = Some(message.into());
        self
    }
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Jobs whose `capture_status` matches, most recent catalog order
    /// (the scheduler does its own priority/`jd_end` re-sort on intake).
    async fn get_jobs(&self, status: CaptureStatus) -> Result<Vec<Job>, CatalogError>;

    async fn get_job(&self, id: &JobId) -> Result<Option<Job>, CatalogError>;

    async fn submit_job(&self, job: &Job) -> Result<(), CatalogError>;

    async fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<(), CatalogError>;

    /// Forward a captured frame, gzip-compressed, to the catalog and mark
    /// `jd_obs` from its `DATE-OBS` header (spec §6).
    async fn add_frame(&self, id: &JobId, frame: &FitsFrame) -> Result<(), CatalogError>;

    /// Most recent job record matching `status`, by descending `jd_obs`.
    async fn get_latest(&self, status: CaptureStatus) -> Result<Option<Job>, CatalogError>;

    /// Fetch and parse the frame at a job's `frame` URL (spec §4.3
    /// `_SyncInner`: "opens the frame, computes the center-of-field world
    /// coordinate via the frame's WCS header").
    async fn fetch_frame(&self, frame_url: &str) -> Result<FitsFrame, CatalogError>;
}

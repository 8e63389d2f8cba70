//! In-memory [`Catalog`] for exercising events and the scheduler without a
//! live PocketBase instance. Mirrors the teacher's `test-support`
//! feature-gated fakes (`oj-adapters`'s `FakeAdapter`).

use async_trait::async_trait;
use chrono::Utc;
use obs_core::{CaptureStatus, Job, JobId};
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{Catalog, CatalogError, JobPatch};
use crate::fits::FitsFrame;

#[derive(Default)]
pub struct FakeCatalog {
    jobs: Mutex<HashMap<JobId, Job>>,
    frames: Mutex<HashMap<JobId, Vec<u8>>>,
}

/// Extract the job id embedded in a `fake://{id}/frame.fits.gz` URL minted
/// by [`FakeCatalog::add_frame`].
fn id_from_fake_url(url: &str) -> Option<&str> {
    url.strip_prefix("fake://")?.split('/').next()
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        self.jobs.lock().insert(job.id.clone(), job);
    }

    /// The raw bytes most recently forwarded via `add_frame`, if any.
    pub fn uploaded_frame(&self, id: &JobId) -> Option<Vec<u8>> {
        self.frames.lock().get(id).cloned()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn get_jobs(&self, status: CaptureStatus) -> Result<Vec<Job>, CatalogError> {
        Ok(self.jobs.lock().values().filter(|j| j.capture_status == status).cloned().collect())
    }

    async fn get_job(&self, id: &JobId) -> Result<Option<Job>, CatalogError> {
        Ok(self.jobs.lock().get(id).cloned())
    }

    async fn submit_job(&self, job: &Job) -> Result<(), CatalogError> {
        self.jobs.lock().insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<(), CatalogError> {
        let mut jobs = self.jobs.lock();
        let job = jobs.get_mut(id).ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        if let Some(status) = patch.capture_status {
            job.capture_status = status;
        }
        if let Some(solve) = patch.solve {
            job.solve = Some(solve);
        }
        if let Some(frame) = patch.frame {
            job.frame = frame;
        }
        if let Some(jd_obs) = patch.jd_obs {
            job.jd_obs = Some(jd_obs);
        }
        if let Some(message) = patch.log {
            let now = Utc::now();
            job.append_log(now, crate::astro::julian_date(now), &message);
        }
        Ok(())
    }

    async fn add_frame(&self, id: &JobId, frame: &FitsFrame) -> Result<(), CatalogError> {
        self.frames.lock().insert(id.clone(), frame.bytes().to_vec());
        let mut jobs = self.jobs.lock();
        let job = jobs.get_mut(id).ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        job.frame = Some(format!("fake://{id}/frame.fits.gz"));
        job.jd_obs = Some(crate::astro::julian_date(frame.header.date_obs()?));
        Ok(())
    }

    async fn get_latest(&self, status: CaptureStatus) -> Result<Option<Job>, CatalogError> {
        Ok(self
            .jobs
            .lock()
            .values()
            .filter(|j| j.capture_status == status)
            .max_by(|a, b| a.jd_obs.partial_cmp(&b.jd_obs).unwrap_or(std::cmp::Ordering::Equal))
            .cloned())
    }

    async fn fetch_frame(&self, frame_url: &str) -> Result<FitsFrame, CatalogError> {
        let id = id_from_fake_url(frame_url).map(JobId::new).ok_or_else(|| CatalogError::NotFound(JobId::new(frame_url)))?;
        let bytes = self.frames.lock().get(&id).cloned().ok_or(CatalogError::NotFound(id))?;
        Ok(FitsFrame::parse(bytes)?)
    }
}

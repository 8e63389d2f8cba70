//! HTTP implementation of [`Catalog`] against a PocketBase-flavored
//! collection API, grounded on `original_source/scheduler/cache.py`'s
//! `PBCache` and on the `reqwest::Client` + bearer/json request style in
//! `examples/adamtc007-ob-poc/rust/crates/sem_os_client/src/http.rs`.

use async_trait::async_trait;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use obs_core::{CaptureStatus, Job, JobId, SolveStatus};
use reqwest::multipart;
use std::io::Write;
use tracing::error;

use super::{Catalog, CatalogError, JobPatch};
use crate::fits::FitsFrame;

const JOBS_COLLECTION: &str = "jobs";

pub struct PocketbaseCatalog {
    base_url: String,
    client: reqwest::Client,
}

impl PocketbaseCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), client: reqwest::Client::new() }
    }

    /// Authenticates against PocketBase's password grant
    /// (`/api/collections/users/auth-with-password`) and builds a catalog
    /// whose requests carry the returned token as a bearer `Authorization`
    /// header. `original_source/scheduler/cache.py`'s `PBCache` connects
    /// anonymously; the real deployment this spec targets requires auth, so
    /// this is a supplemented constructor rather than a one-to-one port.
    pub async fn authenticate(base_url: impl Into<String>, username: &str, password: &str) -> Result<Self, CatalogError> {
        let base_url = base_url.into();
        let client = reqwest::Client::new();
        let body = serde_json::json!({ "identity": username, "password": password });
        let resp = client
            .post(format!("{}/api/collections/users/auth-with-password", base_url.trim_end_matches('/')))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let auth: AuthResponse = resp.json().await?;

        let mut headers = reqwest::header::HeaderMap::new();
        let mut value =
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", auth.token)).map_err(|e| CatalogError::Auth(e.to_string()))?;
        value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, value);
        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self { base_url, client })
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!("{}/api/collections/{JOBS_COLLECTION}/records{suffix}", self.base_url.trim_end_matches('/'))
    }

    async fn fetch_one(&self, filter: &str, sort: &str) -> Result<Option<Job>, CatalogError> {
        let resp = self
            .client
            .get(self.collection_url(""))
            .query(&[("filter", filter), ("sort", sort), ("perPage", "1")])
            .send()
            .await?
            .error_for_status()?;
        let page: RecordPage = resp.json().await?;
        Ok(page.items.into_iter().next())
    }
}

#[derive(serde::Deserialize)]
struct RecordPage {
    items: Vec<Job>,
}

#[derive(serde::Deserialize)]
struct AuthResponse {
    token: String,
}

#[async_trait]
impl Catalog for PocketbaseCatalog {
    async fn get_jobs(&self, status: CaptureStatus) -> Result<Vec<Job>, CatalogError> {
        let filter = format!("capture_status='{}'", status_name(status));
        let resp = self
            .client
            .get(self.collection_url(""))
            .query(&[("filter", filter.as_str()), ("sort", "-priority"), ("perPage", "200")])
            .send()
            .await?
            .error_for_status()?;
        let page: RecordPage = resp.json().await?;
        Ok(page.items)
    }

    async fn get_job(&self, id: &JobId) -> Result<Option<Job>, CatalogError> {
        let resp = self.client.get(self.collection_url(&format!("/{id}"))).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(resp.error_for_status()?.json().await?))
    }

    async fn submit_job(&self, job: &Job) -> Result<(), CatalogError> {
        self.client
            .post(self.collection_url(""))
            .json(job)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<(), CatalogError> {
        let mut body = serde_json::Map::new();
        if let Some(status) = patch.capture_status {
            body.insert("capture_status".into(), status_name(status).into());
        }
        if let Some(solve) = patch.solve {
            body.insert("solve".into(), solve_name(solve).into());
        }
        if let Some(frame) = patch.frame {
            body.insert("frame".into(), frame.map(Into::into).unwrap_or(serde_json::Value::Null));
        }
        if let Some(jd_obs) = patch.jd_obs {
            body.insert("jd_obs".into(), jd_obs.into());
        }
        if let Some(message) = patch.log {
            let current = self.get_job(id).await?.map(|j| j.log).unwrap_or_default();
            let iso = Utc::now().to_rfc3339();
            let jd = crate::astro::julian_date(Utc::now());
            let mut log = current;
            if !log.is_empty() {
                log.push('\n');
            }
            log.push_str(&format!("{iso} - {jd:.8} - {message}"));
            body.insert("log".into(), log.into());
        }

        let result = self
            .client
            .patch(self.collection_url(&format!("/{id}")))
            .json(&body)
            .send()
            .await;
        match result {
            Ok(resp) => {
                resp.error_for_status()?;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, job_id = %id, "failed to update job");
                Err(e.into())
            }
        }
    }

    async fn add_frame(&self, id: &JobId, frame: &FitsFrame) -> Result<(), CatalogError> {
        let jd_obs = crate::astro::julian_date(frame.header.date_obs()?);

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(frame.bytes())?;
        let compressed = encoder.finish()?;

        let part = multipart::Part::bytes(compressed)
            .file_name("frame.fits.gz")
            .mime_str("application/gzip")
            .map_err(CatalogError::Request)?;
        let form = multipart::Form::new().text("jd_obs", jd_obs.to_string()).part("frame", part);

        self.client
            .patch(self.collection_url(&format!("/{id}")))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn get_latest(&self, status: CaptureStatus) -> Result<Option<Job>, CatalogError> {
        let filter = format!("capture_status='{}'", status_name(status));
        self.fetch_one(&filter, "-jd_obs").await
    }

    async fn fetch_frame(&self, frame_url: &str) -> Result<FitsFrame, CatalogError> {
        let compressed = self.client.get(frame_url).send().await?.error_for_status()?.bytes().await?;
        let mut decoder = flate2::read::GzDecoder::new(compressed.as_ref());
        let mut raw = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut raw)?;
        Ok(FitsFrame::parse(raw)?)
    }
}

fn status_name(status: CaptureStatus) -> &'static str {
    match status {
        CaptureStatus::Queued => "QUEUED",
        CaptureStatus::Running => "RUNNING",
        CaptureStatus::Failed => "FAILED",
        CaptureStatus::Finished => "FINISHED",
        CaptureStatus::Expired => "EXPIRED",
    }
}

fn solve_name(solve: SolveStatus) -> &'static str {
    match solve {
        SolveStatus::Unsolved => "UNSOLVED",
        SolveStatus::Solved => "SOLVED",
        SolveStatus::SolveFailed => "SOLVE_FAILED",
        SolveStatus::DontSolve => "DONT_SOLVE",
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;

//! `Capture(duration)` — grounded on `original_source/events/capture.py`.
//!
//! Uses the camera's `CCD1` blob vector timestamp as a freshness baseline:
//! when the daemon pushes a new exposure, the vector's `timestamp`
//! attribute advances, which is cheaper to poll than decoding the (large)
//! blob payload on every sweep just to notice it changed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use obs_adapters::{fits::FitsFrame, JobPatch};
use obs_connection::WriteValue;
use obs_core::{JobId, PropertyVector, SolveStatus};
use std::time::Duration;

use crate::event::{Event, EventContext};
use crate::state::EventState;
use crate::status::EventStatus;

const CAMERA_DEVICE: &str = "camera";
const MAX_TIME_MARGIN: Duration = Duration::from_secs(5);

pub struct Capture {
    state: EventState,
    duration_s: f64,
    baseline_timestamp: Option<DateTime<Utc>>,
}

impl Capture {
    pub fn new(job_id: JobId, priority: i64, duration: Duration) -> Self {
        let duration_s = duration.as_secs_f64();
        Self {
            state: EventState::new(job_id, priority, duration + MAX_TIME_MARGIN),
            duration_s,
            baseline_timestamp: None,
        }
    }

    fn ccd1_timestamp(vector: &PropertyVector) -> Option<DateTime<Utc>> {
        vector.as_blob().map(|b| b.meta.timestamp)
    }
}

#[async_trait]
impl Event for Capture {
    fn status(&self) -> EventStatus {
        self.state.status
    }

    fn priority(&self) -> i64 {
        self.state.priority
    }

    fn max_time(&self) -> Duration {
        self.state.max_time
    }

    fn job_id(&self) -> &JobId {
        &self.state.job_id
    }

    fn failure_message(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    async fn trigger(&mut self, ctx: &EventContext<'_>) {
        let _ = ctx.catalog.update_job(&self.state.job_id, JobPatch::new().log(format!("Exposure for {} seconds", self.duration_s))).await;

        let snapshot = match ctx.conn.state().await {
            Ok(s) => s,
            Err(e) => return self.state.fail(e),
        };
        self.baseline_timestamp = snapshot.get(CAMERA_DEVICE).and_then(|d| d.get("CCD1")).and_then(Self::ccd1_timestamp);

        let write = ctx
            .conn
            .set_value(CAMERA_DEVICE, "CCD_EXPOSURE", vec![("CCD_EXPOSURE".to_string(), WriteValue::Number(self.duration_s))], false, Duration::from_secs(0))
            .await;
        match write {
            Ok(()) => self.state.mark_running(ctx.now),
            Err(e) => self.state.fail(e),
        }
    }

    async fn update(&mut self, ctx: &EventContext<'_>) {
        if self.state.status.is_done() {
            return;
        }
        if self.state.enforce_timeout(ctx.now) {
            return;
        }
        let Ok(snapshot) = ctx.conn.state().await else { return };
        let Some(blob) = snapshot.get(CAMERA_DEVICE).and_then(|d| d.get("CCD1")) else { return };
        let Some(timestamp) = Self::ccd1_timestamp(blob) else { return };
        if self.baseline_timestamp == Some(timestamp) {
            return;
        }

        let Some((bytes, _format)) = blob.as_blob().and_then(|b| b.latest("CCD1")) else { return };
        let frame = match FitsFrame::parse(bytes.to_vec()) {
            Ok(f) => f,
            Err(e) => {
                let _ = ctx.catalog.update_job(&self.state.job_id, JobPatch::new().log(format!("Exposure failed to upload file: {e}"))).await;
                return self.state.fail(e);
            }
        };

        match ctx.catalog.add_frame(&self.state.job_id, &frame).await {
            Ok(()) => {
                let _ = ctx
                    .catalog
                    .update_job(&self.state.job_id, JobPatch::new().solve(SolveStatus::Unsolved).log("Exposure complete"))
                    .await;
                self.state.finish();
            }
            Err(e) => {
                let _ = ctx.catalog.update_job(&self.state.job_id, JobPatch::new().log(format!("Exposure failed to upload file: {e}"))).await;
                self.state.fail(e);
            }
        }
    }

    async fn cancel(&mut self, _ctx: &EventContext<'_>) {
        self.state.fail("canceled");
    }
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;

//! `Sync(job_id)` — a one-exposure `Capture` followed by a frame-solve poll
//! that syncs the mount's pointing model, grounded on
//! `original_source/events/sync.py` (`_Sync`/`Sync`).
//!
//! The original polls with a blocking `time.sleep(0.5..2)` while its
//! `frame` field is still empty; here that backoff is implicit in the
//! scheduler's own sweep period, so `SyncInner::update` simply returns
//! early (still `Running`) until the next sweep instead of sleeping.

use async_trait::async_trait;
use obs_adapters::astro::{j2000_to_jnow_deg, julian_date};
use obs_adapters::JobPatch;
use obs_connection::WriteValue;
use obs_core::{JobId, SolveStatus, SwitchState};
use std::time::Duration;

use crate::capture::Capture;
use crate::event::{Event, EventContext};
use crate::series::Series;
use crate::state::EventState;
use crate::status::EventStatus;

const MOUNT_DEVICE: &str = "mount";
const SYNC_MAX_TIME: Duration = Duration::from_secs(60);
const CAPTURE_DURATION: Duration = Duration::from_secs(1);
const MAX_ATTEMPTS: u32 = 10;

/// Build a `Capture` (1s exposure) chained into a [`SyncInner`] poll, the
/// composite `Sync` event from spec §4.3.
pub struct Sync;

impl Sync {
    // A capture and a sync poll always share one job id, so construction
    // cannot fail; `Series::new`'s checks exist for the general case, not
    // this fixed two-element composition.
    #[allow(clippy::expect_used)]
    pub fn new(job_id: JobId, priority: i64) -> Series {
        Series::new(vec![
            Box::new(Capture::new(job_id.clone(), priority, CAPTURE_DURATION)),
            Box::new(SyncInner::new(job_id, priority)),
        ])
        .expect("Capture and SyncInner always share one job id")
    }
}

struct SyncInner {
    state: EventState,
    attempts: u32,
}

impl SyncInner {
    fn new(job_id: JobId, priority: i64) -> Self {
        Self { state: EventState::new(job_id, priority, SYNC_MAX_TIME), attempts: 0 }
    }
}

#[async_trait]
impl Event for SyncInner {
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
        self.state.mark_running(ctx.now);
    }

    async fn update(&mut self, ctx: &EventContext<'_>) {
        if self.state.status.is_done() {
            return;
        }
        if self.state.enforce_timeout(ctx.now) {
            return;
        }

        self.attempts += 1;
        let job = match ctx.catalog.get_job(&self.state.job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => return self.state.fail("job not found while polling for solve"),
            Err(e) => return self.state.fail(e),
        };

        if job.frame.is_none() {
            if self.attempts >= MAX_ATTEMPTS {
                let _ = ctx.catalog.update_job(&self.state.job_id, JobPatch::new().log("Sync failed after 10 attempts.")).await;
                self.state.fail("Sync failed after 10 attempts.");
            }
            return;
        }

        match job.solve {
            None | Some(SolveStatus::Unsolved) => {}
            Some(SolveStatus::Solved) => {
                let frame_url = job.frame.clone().expect("checked above");
                let frame = match ctx.catalog.fetch_frame(&frame_url).await {
                    Ok(frame) => frame,
                    Err(e) => return self.state.fail(e),
                };

                let (ra_j2000, dec_j2000) = frame.center_world_deg();
                let obs_time = match frame.header.date_obs() {
                    Ok(t) => t,
                    Err(e) => return self.state.fail(e),
                };
                let jd = julian_date(obs_time);
                let (ra_jnow, dec_jnow) = j2000_to_jnow_deg(ra_j2000, dec_j2000, jd);

                let set_coord = ctx
                    .conn
                    .set_value(MOUNT_DEVICE, "ON_COORD_SET", vec![("SYNC".to_string(), WriteValue::Switch(SwitchState::On))], false, Duration::from_secs(0))
                    .await;
                if let Err(e) = set_coord {
                    return self.state.fail(e);
                }
                let write_coord = ctx
                    .conn
                    .set_value(
                        MOUNT_DEVICE,
                        "EQUATORIAL_EOD_COORD",
                        vec![("RA".to_string(), WriteValue::Number(ra_jnow / 15.0)), ("DEC".to_string(), WriteValue::Number(dec_jnow))],
                        false,
                        Duration::from_secs(0),
                    )
                    .await;
                if let Err(e) = write_coord {
                    return self.state.fail(e);
                }

                let _ = ctx
                    .catalog
                    .update_job(&self.state.job_id, JobPatch::new().clear_frame().log("Solve succeeded and mount sync updated, frame deleted."))
                    .await;
                self.state.finish();
            }
            Some(SolveStatus::SolveFailed) => {
                let _ = ctx.catalog.update_job(&self.state.job_id, JobPatch::new().clear_frame().log("Solver failed to find solution")).await;
                self.state.fail("Solver failed to find solution");
            }
            Some(SolveStatus::DontSolve) => {
                let _ = ctx
                    .catalog
                    .update_job(&self.state.job_id, JobPatch::new().clear_frame().log("Frame was marked as DONT_SOLVE, frame deleted."))
                    .await;
                self.state.fail("Frame was marked as DONT_SOLVE, frame deleted.");
            }
        }
    }

    async fn cancel(&mut self, ctx: &EventContext<'_>) {
        let _ = ctx.catalog.update_job(&self.state.job_id, JobPatch::new().log("Canceled")).await;
        self.state.fail("Canceled");
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;

//! The scheduler outer loop (spec §4.4): intake, sort, sweep, dispatch.
//!
//! Grounded on `original_source/scheduler/scheduler.py`'s `run_schedule`
//! loop body. The original paces itself with a literal `time.sleep(0.05)`
//! every iteration regardless of how long the sweep took; spec §5 instead
//! calls for a measured ~1s period ("measures elapsed, sleeps the
//! remainder"), which [`Scheduler::run_forever`] implements.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use obs_adapters::astro::julian_date;
use obs_adapters::{Catalog, JobPatch};
use obs_connection::Connection;
use obs_core::{CaptureStatus, Clock, Job, JobId, SystemClock};
use obs_events::{Event, EventContext, EventStatus};
use tracing::{info, warn};

use crate::error::SchedulerError;
use crate::parser::parse_job;

/// Outer loop period (spec §4.4, §5: "period ≈ 1s").
const LOOP_PERIOD: Duration = Duration::from_secs(1);

/// Translates the catalog's queued jobs into events and drives at most one
/// at a time to completion, reflecting progress back into the catalog
/// (spec §4.4). Generic over [`Clock`] so tests can drive sweeps against a
/// [`obs_core::FakeClock`] instead of wall-clock time.
pub struct Scheduler<C: Clock = SystemClock> {
    conn: Connection,
    catalog: Arc<dyn Catalog>,
    clock: C,
    events: HashMap<JobId, Box<dyn Event>>,
}

impl Scheduler<SystemClock> {
    pub fn new(conn: Connection, catalog: Arc<dyn Catalog>) -> Self {
        Self::with_clock(conn, catalog, SystemClock)
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn with_clock(conn: Connection, catalog: Arc<dyn Catalog>, clock: C) -> Self {
        Self { conn, catalog, clock, events: HashMap::new() }
    }

    /// Number of jobs currently tracked as in-flight events. Exposed for
    /// tests and the CLI's shutdown diagnostics.
    pub fn active_job_count(&self) -> usize {
        self.events.len()
    }

    /// Run the outer loop forever (spec §4.4, §5), sleeping out the
    /// remainder of each ~1s period after a sweep. Errors from a single
    /// sweep are logged and do not stop the loop, matching the policy that
    /// wire/catalog failures are contained (spec §7).
    pub async fn run_forever(&mut self) {
        loop {
            let started = tokio::time::Instant::now();
            if let Err(e) = self.run_once().await {
                warn!(error = %e, "scheduler sweep failed");
            }
            let elapsed = started.elapsed();
            if elapsed < LOOP_PERIOD {
                tokio::time::sleep(LOOP_PERIOD - elapsed).await;
            }
        }
    }

    /// One intake/sort/sweep/dispatch cycle (spec §4.4).
    pub async fn run_once(&mut self) -> Result<(), SchedulerError> {
        let now = self.clock.now_utc();
        self.intake(now).await?;
        self.sweep(now).await;
        Ok(())
    }

    async fn intake(&mut self, now: DateTime<Utc>) -> Result<(), SchedulerError> {
        let mut jobs = self.catalog.get_jobs(CaptureStatus::Queued).await?;
        jobs.sort_by(intake_order);

        let now_jd = julian_date(now);
        for job in jobs {
            if self.events.contains_key(&job.id) {
                continue;
            }

            match job.capture_status {
                CaptureStatus::Finished | CaptureStatus::Failed | CaptureStatus::Expired => continue,
                CaptureStatus::Running => {
                    let _ = self
                        .catalog
                        .update_job(&job.id, JobPatch::new().capture_status(CaptureStatus::Failed).log("Job was running, but no event found."))
                        .await;
                    continue;
                }
                CaptureStatus::Queued => {}
            }

            if job.jd_end.is_some_and(|end| end < now_jd) {
                let _ = self.catalog.update_job(&job.id, JobPatch::new().capture_status(CaptureStatus::Expired)).await;
                continue;
            }

            match parse_job(&job) {
                Ok(event) => {
                    self.events.insert(job.id.clone(), event);
                }
                Err(e) => {
                    warn!(job = %job.id, error = %e, "job failed to parse");
                    let _ = self
                        .catalog
                        .update_job(&job.id, JobPatch::new().capture_status(CaptureStatus::Failed).log(format!("Failed to parse job: {e}")))
                        .await;
                }
            }
        }
        Ok(())
    }

    async fn sweep(&mut self, now: DateTime<Utc>) {
        let mut order: Vec<JobId> = self.events.keys().cloned().collect();
        order.sort_by(|a, b| {
            let pa = self.events.get(a).map(|e| e.priority()).unwrap_or(i64::MIN);
            let pb = self.events.get(b).map(|e| e.priority()).unwrap_or(i64::MIN);
            pb.cmp(&pa)
        });

        let conn = self.conn.clone();
        let catalog = self.catalog.clone();
        let ctx = EventContext { conn: &conn, catalog: catalog.as_ref(), now };
        let now_jd = julian_date(now);

        let mut running = None;
        let mut trigger = None;
        let mut to_remove = Vec::new();

        for job_id in &order {
            let Some(event) = self.events.get_mut(job_id) else { continue };
            event.update(&ctx).await;

            let job = match catalog.get_job(job_id).await {
                Ok(Some(job)) => job,
                Ok(None) => {
                    event.cancel(&ctx).await;
                    to_remove.push(job_id.clone());
                    continue;
                }
                Err(e) => {
                    warn!(job = %job_id, error = %e, "failed to re-fetch job during sweep");
                    continue;
                }
            };

            let status = event.status();
            if status == EventStatus::Running {
                running = Some(job_id.clone());
            }

            match status {
                EventStatus::Finished => {
                    to_remove.push(job_id.clone());
                    info!(job = %job_id, "finished job");
                    let _ = catalog.update_job(job_id, JobPatch::new().capture_status(CaptureStatus::Finished).log("Finished")).await;
                }
                EventStatus::Failed => {
                    to_remove.push(job_id.clone());
                    let _ = catalog.update_job(job_id, JobPatch::new().capture_status(CaptureStatus::Failed).log("Failed")).await;
                }
                EventStatus::Running | EventStatus::Canceling => {
                    if job.capture_status != CaptureStatus::Running {
                        let _ = catalog.update_job(job_id, JobPatch::new().capture_status(CaptureStatus::Running)).await;
                    }
                }
                EventStatus::NotReady => {}
                EventStatus::Ready => {
                    if trigger.is_none() {
                        if job.jd_end.is_some_and(|end| end < now_jd) {
                            event.cancel(&ctx).await;
                            to_remove.push(job_id.clone());
                            let _ = catalog.update_job(job_id, JobPatch::new().capture_status(CaptureStatus::Expired)).await;
                        } else {
                            trigger = Some(job_id.clone());
                        }
                    }
                }
            }
        }

        for id in to_remove {
            self.events.remove(&id);
        }

        if running.is_none() {
            if let Some(trigger_id) = trigger {
                match catalog.get_job(&trigger_id).await {
                    Ok(Some(_)) => {
                        let _ = catalog.update_job(&trigger_id, JobPatch::new().capture_status(CaptureStatus::Running)).await;
                        if let Some(event) = self.events.get_mut(&trigger_id) {
                            info!(job = %trigger_id, "triggering job");
                            event.trigger(&ctx).await;
                        }
                    }
                    Ok(None) => {
                        if let Some(event) = self.events.get_mut(&trigger_id) {
                            event.cancel(&ctx).await;
                        }
                        self.events.remove(&trigger_id);
                    }
                    Err(e) => warn!(job = %trigger_id, error = %e, "failed to re-fetch trigger candidate"),
                }
            }
        }
    }
}

/// Descending `(priority, jd_end)` intake order (spec §4.4). Jobs with no
/// `jd_end` sort after those that have one, since they carry no deadline
/// urgency to prioritize on.
fn intake_order(a: &Job, b: &Job) -> Ordering {
    b.priority.cmp(&a.priority).then_with(|| jd_end_rank(b.jd_end).partial_cmp(&jd_end_rank(a.jd_end)).unwrap_or(Ordering::Equal))
}

fn jd_end_rank(jd_end: Option<f64>) -> f64 {
    jd_end.unwrap_or(f64::NEG_INFINITY)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

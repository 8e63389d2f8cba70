use super::*;
use crate::test_support::{fake_catalog, fake_daemon};
use async_trait::async_trait;
use obs_adapters::astro::julian_date_now;
use obs_adapters::{Catalog, FakeCatalog};
use obs_core::{CaptureStatus, Job, JobId};
use obs_events::{Event, EventContext, EventStatus};
use std::sync::Arc;
use std::time::Duration;

/// A controllable stand-in leaf event for exercising sweep/dispatch logic
/// without a real wire round-trip.
struct Stub {
    job_id: JobId,
    priority: i64,
    status: EventStatus,
    triggered: bool,
    canceled: bool,
}

impl Stub {
    fn new(job_id: &str, priority: i64, status: EventStatus) -> Self {
        Self { job_id: JobId::new(job_id), priority, status, triggered: false, canceled: false }
    }
}

#[async_trait]
impl Event for Stub {
    fn status(&self) -> EventStatus {
        self.status
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    fn max_time(&self) -> Duration {
        Duration::from_secs(120)
    }

    fn job_id(&self) -> &JobId {
        &self.job_id
    }

    fn failure_message(&self) -> Option<&str> {
        None
    }

    async fn trigger(&mut self, _ctx: &EventContext<'_>) {
        self.triggered = true;
        self.status = EventStatus::Running;
    }

    async fn update(&mut self, _ctx: &EventContext<'_>) {}

    async fn cancel(&mut self, _ctx: &EventContext<'_>) {
        self.canceled = true;
        self.status = EventStatus::Failed;
    }
}

fn seed_job(catalog: &FakeCatalog, id: &str, cmd: &str, priority: i64, jd_end: Option<f64>) -> JobId {
    let job_id = JobId::new(id);
    catalog.insert(Job {
        id: job_id.clone(),
        cmd: cmd.to_string(),
        priority,
        duration: 1.0,
        filter: "L".into(),
        jd_start: None,
        jd_end,
        capture_status: CaptureStatus::Queued,
        solve: None,
        frame: None,
        jd_obs: None,
        log: String::new(),
        proposal_id: None,
        keep_frame: None,
        private: None,
    });
    job_id
}

#[tokio::test]
async fn intake_parses_and_tracks_a_newly_queued_job() {
    let (conn, _socket) = fake_daemon().await;
    let catalog = Arc::new(fake_catalog());
    seed_job(&catalog, "job-1", "SYNC_INPLACE", 0, None);

    let mut scheduler = Scheduler::new(conn, catalog.clone());
    scheduler.intake(Utc::now()).await.unwrap();
    assert_eq!(scheduler.active_job_count(), 1);
}

#[tokio::test]
async fn intake_is_idempotent_for_an_already_tracked_job() {
    let (conn, _socket) = fake_daemon().await;
    let catalog = Arc::new(fake_catalog());
    seed_job(&catalog, "job-1", "SYNC_INPLACE", 0, None);

    let mut scheduler = Scheduler::new(conn, catalog.clone());
    scheduler.intake(Utc::now()).await.unwrap();
    scheduler.intake(Utc::now()).await.unwrap();
    assert_eq!(scheduler.active_job_count(), 1);
}

#[tokio::test]
async fn intake_expires_a_job_past_its_jd_end_without_scheduling_it() {
    let (conn, _socket) = fake_daemon().await;
    let catalog = Arc::new(fake_catalog());
    let job_id = seed_job(&catalog, "job-1", "SYNC_INPLACE", 0, Some(julian_date_now() - 10.0));

    let mut scheduler = Scheduler::new(conn, catalog.clone());
    scheduler.intake(Utc::now()).await.unwrap();

    assert_eq!(scheduler.active_job_count(), 0);
    let job = catalog.get_job(&job_id).await.unwrap().unwrap();
    assert_eq!(job.capture_status, CaptureStatus::Expired);
}

#[tokio::test]
async fn intake_marks_a_job_failed_when_the_command_does_not_parse() {
    let (conn, _socket) = fake_daemon().await;
    let catalog = Arc::new(fake_catalog());
    let job_id = seed_job(&catalog, "job-1", "FOCUS", 0, None);

    let mut scheduler = Scheduler::new(conn, catalog.clone());
    scheduler.intake(Utc::now()).await.unwrap();

    assert_eq!(scheduler.active_job_count(), 0);
    let job = catalog.get_job(&job_id).await.unwrap().unwrap();
    assert_eq!(job.capture_status, CaptureStatus::Failed);
    assert!(job.log.contains("Failed to parse job"));
}

#[tokio::test]
async fn sweep_dispatches_only_the_highest_priority_ready_candidate() {
    let (conn, _socket) = fake_daemon().await;
    let catalog = Arc::new(fake_catalog());
    seed_job(&catalog, "job-low", "SYNC_INPLACE", 1, None);
    seed_job(&catalog, "job-high", "SYNC_INPLACE", 9, None);

    let mut scheduler = Scheduler::new(conn, catalog.clone());
    scheduler.events.insert(JobId::new("job-low"), Box::new(Stub::new("job-low", 1, EventStatus::Ready)));
    scheduler.events.insert(JobId::new("job-high"), Box::new(Stub::new("job-high", 9, EventStatus::Ready)));

    scheduler.sweep(Utc::now()).await;

    let high = catalog.get_job(&JobId::new("job-high")).await.unwrap().unwrap();
    let low = catalog.get_job(&JobId::new("job-low")).await.unwrap().unwrap();
    assert_eq!(high.capture_status, CaptureStatus::Running);
    assert_eq!(low.capture_status, CaptureStatus::Queued);
}

#[tokio::test]
async fn sweep_does_not_dispatch_while_another_event_is_running() {
    let (conn, _socket) = fake_daemon().await;
    let catalog = Arc::new(fake_catalog());
    seed_job(&catalog, "job-running", "SYNC_INPLACE", 5, None);
    seed_job(&catalog, "job-ready", "SYNC_INPLACE", 9, None);

    let mut scheduler = Scheduler::new(conn, catalog.clone());
    scheduler.events.insert(JobId::new("job-running"), Box::new(Stub::new("job-running", 5, EventStatus::Running)));
    scheduler.events.insert(JobId::new("job-ready"), Box::new(Stub::new("job-ready", 9, EventStatus::Ready)));

    scheduler.sweep(Utc::now()).await;

    let ready = catalog.get_job(&JobId::new("job-ready")).await.unwrap().unwrap();
    assert_eq!(ready.capture_status, CaptureStatus::Queued, "higher-priority candidate must wait for the runner to finish");
}

#[tokio::test]
async fn sweep_removes_finished_and_failed_events_with_writeback() {
    let (conn, _socket) = fake_daemon().await;
    let catalog = Arc::new(fake_catalog());
    seed_job(&catalog, "job-done", "SYNC_INPLACE", 0, None);
    seed_job(&catalog, "job-failed", "SYNC_INPLACE", 0, None);

    let mut scheduler = Scheduler::new(conn, catalog.clone());
    scheduler.events.insert(JobId::new("job-done"), Box::new(Stub::new("job-done", 0, EventStatus::Finished)));
    scheduler.events.insert(JobId::new("job-failed"), Box::new(Stub::new("job-failed", 0, EventStatus::Failed)));

    scheduler.sweep(Utc::now()).await;

    assert_eq!(scheduler.active_job_count(), 0);
    let done = catalog.get_job(&JobId::new("job-done")).await.unwrap().unwrap();
    let failed = catalog.get_job(&JobId::new("job-failed")).await.unwrap().unwrap();
    assert_eq!(done.capture_status, CaptureStatus::Finished);
    assert!(done.log.contains("Finished"));
    assert_eq!(failed.capture_status, CaptureStatus::Failed);
    assert!(failed.log.contains("Failed"));
}

#[tokio::test]
async fn sweep_expires_and_cancels_a_ready_event_past_its_jd_end() {
    let (conn, _socket) = fake_daemon().await;
    let catalog = Arc::new(fake_catalog());
    seed_job(&catalog, "job-1", "SYNC_INPLACE", 0, Some(julian_date_now() - 10.0));

    let mut scheduler = Scheduler::new(conn, catalog.clone());
    scheduler.events.insert(JobId::new("job-1"), Box::new(Stub::new("job-1", 0, EventStatus::Ready)));

    scheduler.sweep(Utc::now()).await;

    assert_eq!(scheduler.active_job_count(), 0);
    let job = catalog.get_job(&JobId::new("job-1")).await.unwrap().unwrap();
    assert_eq!(job.capture_status, CaptureStatus::Expired);
}

#[tokio::test]
async fn sweep_cancels_and_drops_an_event_whose_job_vanished_from_the_catalog() {
    let (conn, _socket) = fake_daemon().await;
    let catalog = Arc::new(fake_catalog());

    let mut scheduler = Scheduler::new(conn, catalog.clone());
    scheduler.events.insert(JobId::new("ghost"), Box::new(Stub::new("ghost", 0, EventStatus::Running)));

    scheduler.sweep(Utc::now()).await;

    assert_eq!(scheduler.active_job_count(), 0);
}

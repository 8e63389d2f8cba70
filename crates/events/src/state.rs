//! Fields and transitions shared by every leaf event and by [`crate::Series`],
//! grounded on the common attribute set of `original_source/events/base.py`'s
//! `Event` dataclass (`priority`, `max_time`, `started_at`, `status`).
//! Composed into each event struct rather than inherited, since Rust has no
//! struct inheritance; the [`crate::Event`] trait's default behavior lives
//! here instead of being duplicated per leaf.

use crate::error::EventError;
use crate::status::EventStatus;
use chrono::{DateTime, Utc};
use obs_core::JobId;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EventState {
    pub job_id: JobId,
    pub priority: i64,
    pub max_time: Duration,
    pub started_at: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub last_error: Option<String>,
}

impl EventState {
    pub fn new(job_id: JobId, priority: i64, max_time: Duration) -> Self {
        Self { job_id, priority, max_time, started_at: None, status: EventStatus::Ready, last_error: None }
    }

    pub fn mark_running(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.status = EventStatus::Running;
    }

    pub fn finish(&mut self) {
        self.status = EventStatus::Finished;
    }

    pub fn fail(&mut self, err: impl std::fmt::Display) {
        self.status = EventStatus::Failed;
        self.last_error = Some(err.to_string());
    }

    pub fn cancel_to_failed(&mut self) {
        self.status = EventStatus::Canceling;
    }

    /// Enforce `max_time`: if running and the cap has elapsed, fail with
    /// the spec's exact message text. Returns true if the cap fired.
    pub fn enforce_timeout(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != EventStatus::Running {
            return false;
        }
        let Some(started) = self.started_at else { return false };
        let elapsed = (now - started).to_std().unwrap_or(Duration::ZERO);
        if elapsed > self.max_time {
            self.fail(EventError::TimedOut);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

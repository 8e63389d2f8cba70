//! `Delay(seconds)` — a pure wall-clock wait, grounded on
//! `original_source/events/delay.py`. No cache or connection interaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use obs_core::JobId;
use std::time::Duration;

use crate::event::{Event, EventContext};
use crate::state::EventState;
use crate::status::EventStatus;

pub struct Delay {
    state: EventState,
    duration: Duration,
    end_time: Option<DateTime<Utc>>,
}

impl Delay {
    pub fn new(job_id: JobId, priority: i64, duration: Duration) -> Self {
        Self { state: EventState::new(job_id, priority, duration), duration, end_time: None }
    }
}

#[async_trait]
impl Event for Delay {
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
        self.end_time = Some(ctx.now + chrono::Duration::from_std(self.duration).unwrap_or_default());
        self.state.mark_running(ctx.now);
    }

    async fn update(&mut self, ctx: &EventContext<'_>) {
        if self.state.status.is_done() {
            return;
        }
        if self.state.enforce_timeout(ctx.now) {
            return;
        }
        if let Some(end) = self.end_time {
            if ctx.now >= end {
                self.state.finish();
            }
        }
    }

    async fn cancel(&mut self, _ctx: &EventContext<'_>) {
        self.state.fail("canceled");
    }
}

#[cfg(test)]
#[path = "delay_tests.rs"]
mod tests;

//! `Series` — an ordered, non-empty composition of sub-events sharing one
//! job id, grounded on `original_source/events/base.py`'s `SeriesEvent`.
//!
//! Finished-to-running transitions between sub-events chain immediately
//! within a single `update` call (spec §4.3), rather than waiting for the
//! next scheduler sweep to notice the next sub-event is `Ready`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use obs_core::JobId;
use std::time::Duration;

use crate::error::EventError;
use crate::event::{Event, EventContext};
use crate::status::EventStatus;

const MAX_TIME_MARGIN: Duration = Duration::from_secs(10);

pub struct Series {
    job_id: JobId,
    priority: i64,
    max_time: Duration,
    events: Vec<Box<dyn Event>>,
    current: usize,
    status: EventStatus,
    started_at: Option<DateTime<Utc>>,
    timeout_message: Option<&'static str>,
}

impl Series {
    /// Construct a series from a non-empty, single-job-id list of
    /// sub-events (spec §3 "Event"). The series' priority and the
    /// time-cap composition rule (`Σ sub.max_time + 10s`) follow the
    /// first sub-event and the full list respectively.
    pub fn new(events: Vec<Box<dyn Event>>) -> Result<Self, EventError> {
        let Some(first) = events.first() else { return Err(EventError::EmptySeries) };
        let job_id = first.job_id().clone();
        let priority = first.priority();
        if events.iter().any(|e| e.job_id() != &job_id) {
            return Err(EventError::MixedJobIds);
        }
        let max_time = events.iter().map(Event::max_time).sum::<Duration>() + MAX_TIME_MARGIN;
        Ok(Self { job_id, priority, max_time, events, current: 0, status: EventStatus::Ready, started_at: None, timeout_message: None })
    }

    /// Advance past every sub-event that has already finished, triggering
    /// the next one in the same call (no intervening scheduler sweep).
    async fn chain_finished(&mut self, ctx: &EventContext<'_>) {
        loop {
            self.status = self.events[self.current].status();
            if self.status != EventStatus::Finished || self.current + 1 >= self.events.len() {
                break;
            }
            self.current += 1;
            self.events[self.current].trigger(ctx).await;
            self.status = self.events[self.current].status();
        }
    }
}

#[async_trait]
impl Event for Series {
    fn status(&self) -> EventStatus {
        self.status
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    fn max_time(&self) -> Duration {
        self.max_time
    }

    fn job_id(&self) -> &JobId {
        &self.job_id
    }

    fn failure_message(&self) -> Option<&str> {
        self.timeout_message.or_else(|| self.events[self.current].failure_message())
    }

    async fn trigger(&mut self, ctx: &EventContext<'_>) {
        self.started_at = Some(ctx.now);
        self.current = 0;
        self.events[0].trigger(ctx).await;
        self.chain_finished(ctx).await;
    }

    async fn update(&mut self, ctx: &EventContext<'_>) {
        if self.status.is_done() {
            return;
        }
        if self.status == EventStatus::Running {
            if let Some(started) = self.started_at {
                let elapsed = (ctx.now - started).to_std().unwrap_or(Duration::ZERO);
                if elapsed > self.max_time {
                    self.events[self.current].cancel(ctx).await;
                    self.status = EventStatus::Failed;
                    self.timeout_message = Some("Failed to complete within the time limit");
                    return;
                }
            }
        }
        self.events[self.current].update(ctx).await;
        self.chain_finished(ctx).await;
    }

    async fn cancel(&mut self, ctx: &EventContext<'_>) {
        self.events[self.current].cancel(ctx).await;
        self.status = EventStatus::Failed;
    }
}

#[cfg(test)]
#[path = "series_tests.rs"]
mod tests;

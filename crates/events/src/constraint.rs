//! `TimeConstrained` — a decorator that withholds `Ready` before a start
//! time and cancels after an end time, grounded on
//! `original_source/events/constraints.py`'s `TimeConstrained`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use obs_core::JobId;
use std::time::Duration;

use crate::event::{Event, EventContext};
use crate::status::EventStatus;

pub struct TimeConstrained {
    inner: Box<dyn Event>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    status: EventStatus,
    message: Option<String>,
}

impl TimeConstrained {
    pub fn new(inner: Box<dyn Event>, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        let status = inner.status();
        Self { inner, start, end, status, message: None }
    }
}

#[async_trait]
impl Event for TimeConstrained {
    fn status(&self) -> EventStatus {
        self.status
    }

    fn priority(&self) -> i64 {
        self.inner.priority()
    }

    fn max_time(&self) -> Duration {
        self.inner.max_time()
    }

    fn job_id(&self) -> &JobId {
        self.inner.job_id()
    }

    fn failure_message(&self) -> Option<&str> {
        self.message.as_deref().or_else(|| self.inner.failure_message())
    }

    async fn trigger(&mut self, ctx: &EventContext<'_>) {
        self.inner.trigger(ctx).await;
        self.status = self.inner.status();
    }

    async fn update(&mut self, ctx: &EventContext<'_>) {
        if self.status.is_done() {
            return;
        }
        self.inner.update(ctx).await;
        self.status = self.inner.status();

        if self.status == EventStatus::Ready {
            if let Some(start) = self.start {
                if ctx.now < start {
                    self.status = EventStatus::NotReady;
                    return;
                }
            }
            if let Some(end) = self.end {
                if ctx.now > end {
                    self.inner.cancel(ctx).await;
                    self.status = EventStatus::Canceling;
                    self.message = Some("Event Ready after max time constraint met".to_string());
                }
            }
        }
    }

    async fn cancel(&mut self, ctx: &EventContext<'_>) {
        self.inner.cancel(ctx).await;
        self.status = self.inner.status();
    }
}

#[cfg(test)]
#[path = "constraint_tests.rs"]
mod tests;

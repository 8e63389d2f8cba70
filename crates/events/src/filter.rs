//! `SetFilter(name)` — grounded on `original_source/events/filter.py`.
//!
//! The wheel publishes `FILTER_NAME` as a text vector whose element names
//! encode a slot index as a `_N` suffix (e.g. `FILTER_NAME_1`); `trigger`
//! builds a name -> slot lookup from it, then writes the numeric
//! `FILTER_SLOT` property to request the change.

use async_trait::async_trait;
use obs_connection::WriteValue;
use obs_core::{JobId, PropertyVector};
use std::time::Duration;

use crate::error::EventError;
use crate::event::{Event, EventContext};
use crate::state::EventState;
use crate::status::EventStatus;

const WHEEL_DEVICE: &str = "wheel";
const DEFAULT_MAX_TIME: Duration = Duration::from_secs(30);

pub struct SetFilter {
    state: EventState,
    filter: String,
    target_slot: Option<f64>,
}

impl SetFilter {
    pub fn new(job_id: JobId, priority: i64, filter: impl Into<String>) -> Self {
        Self { state: EventState::new(job_id, priority, DEFAULT_MAX_TIME), filter: filter.into(), target_slot: None }
    }

    /// Slot index for each `FILTER_NAME_<idx>` element whose value matches
    /// the requested filter name.
    fn lookup_slot(names: &PropertyVector, filter: &str) -> Option<f64> {
        let PropertyVector::Text(tv) = names else { return None };
        tv.elements.iter().find_map(|(name, element)| {
            if element.value != filter {
                return None;
            }
            name.rsplit_once('_').and_then(|(_, idx)| idx.parse::<f64>().ok())
        })
    }

    async fn current_slot(ctx: &EventContext<'_>) -> Option<f64> {
        let snapshot = ctx.conn.state().await.ok()?;
        let vector = snapshot.get(WHEEL_DEVICE)?.get("FILTER_SLOT")?;
        let PropertyVector::Number(nv) = vector else { return None };
        Some(nv.elements.get("FILTER_SLOT")?.value)
    }
}

#[async_trait]
impl Event for SetFilter {
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
        let snapshot = match ctx.conn.state().await {
            Ok(s) => s,
            Err(e) => return self.state.fail(e),
        };
        let Some(names) = snapshot.get(WHEEL_DEVICE).and_then(|d| d.get("FILTER_NAME")) else {
            return self.state.fail(EventError::UnknownFilter(self.filter.clone()));
        };
        let Some(slot) = Self::lookup_slot(names, &self.filter) else {
            return self.state.fail(EventError::UnknownFilter(self.filter.clone()));
        };
        self.target_slot = Some(slot);

        if snapshot
            .get(WHEEL_DEVICE)
            .and_then(|d| d.get("FILTER_SLOT"))
            .and_then(|v| match v {
                PropertyVector::Number(nv) => nv.elements.get("FILTER_SLOT"),
                _ => None,
            })
            .is_some_and(|e| (e.value - slot).abs() < f64::EPSILON)
        {
            self.state.mark_running(ctx.now);
            self.state.finish();
            return;
        }

        let write = ctx
            .conn
            .set_value(WHEEL_DEVICE, "FILTER_SLOT", vec![("FILTER_SLOT".to_string(), WriteValue::Number(slot))], false, Duration::from_secs(0))
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
        let Some(target) = self.target_slot else { return };
        let Some(current) = Self::current_slot(ctx).await else { return };
        if (current - target).abs() < f64::EPSILON {
            self.state.finish();
        }
    }

    async fn cancel(&mut self, _ctx: &EventContext<'_>) {
        self.state.fail("Filter change cancelled");
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;

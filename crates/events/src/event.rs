//! The event trait (spec §4.3): `trigger`/`update`/`cancel`, dispatched by
//! the scheduler over a dynamic collection of leaf and composite events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use obs_adapters::Catalog;
use obs_connection::Connection;
use obs_core::JobId;
use std::time::Duration;

use crate::status::EventStatus;

/// Everything an event's `trigger`/`update`/`cancel` needs, bundled so the
/// trait stays object-safe without threading three separate parameters
/// through every call site. `now` is supplied by the caller (the scheduler,
/// or a test) rather than read internally, so event behavior stays
/// deterministic under a fixed clock.
pub struct EventContext<'a> {
    pub conn: &'a Connection,
    pub catalog: &'a dyn Catalog,
    pub now: DateTime<Utc>,
}

#[async_trait]
pub trait Event: Send {
    fn status(&self) -> EventStatus;
    fn priority(&self) -> i64;
    fn max_time(&self) -> Duration;
    fn job_id(&self) -> &JobId;

    /// Text of the most recent failure, if `status() == Failed`. The
    /// scheduler appends this to the owning job's catalog log (spec §4.3,
    /// §4.4 "Writebacks to catalog").
    fn failure_message(&self) -> Option<&str>;

    /// Precondition: `status() == Ready`. Issues side effects and advances
    /// to `Running` (or directly to `Finished` for events that can
    /// complete synchronously).
    async fn trigger(&mut self, ctx: &EventContext<'_>);

    /// No-op if already `Finished`/`Failed`. Consults external state to
    /// decide progress, and enforces `max_time` while `Running`.
    async fn update(&mut self, ctx: &EventContext<'_>);

    /// Best-effort abort; always ends at `Failed`.
    async fn cancel(&mut self, ctx: &EventContext<'_>);
}

//! `Slew(ra, dec)` — grounded on `original_source/events/slew.py`.
//!
//! Resolved Open Question (spec §9, SPEC_FULL §4.3): the convergence
//! threshold is 5 arcsec, the more recent of the two values the original
//! carries across duplicated modules.

use async_trait::async_trait;
use obs_adapters::astro::{j2000_to_jnow_deg, julian_date, Vector3};
use obs_connection::WriteValue;
use obs_core::{JobId, PropertyVector, SwitchState};
use std::time::Duration;

use crate::event::{Event, EventContext};
use crate::state::EventState;
use crate::status::EventStatus;

pub const SLEW_CONVERGENCE_ARCSEC: f64 = 5.0;
const SLEW_WIRE_TIMEOUT: Duration = Duration::from_secs(90);
const MOUNT_DEVICE: &str = "mount";

pub struct Slew {
    state: EventState,
    ra_deg: f64,
    dec_deg: f64,
}

impl Slew {
    pub fn new(job_id: JobId, priority: i64, ra_deg: f64, dec_deg: f64) -> Self {
        Self { state: EventState::new(job_id, priority, SLEW_WIRE_TIMEOUT), ra_deg, dec_deg }
    }

    fn target_vector(&self, jd: f64) -> Vector3 {
        let (ra, dec) = j2000_to_jnow_deg(self.ra_deg, self.dec_deg, jd);
        Vector3::from_ra_dec_deg(ra, dec)
    }

    async fn current_vector(ctx: &EventContext<'_>) -> Option<Vector3> {
        let snapshot = ctx.conn.state().await.ok()?;
        let vector = snapshot.get(MOUNT_DEVICE)?.get("EQUATORIAL_EOD_COORD")?;
        let PropertyVector::Number(nv) = vector else { return None };
        let ra_hours = nv.elements.get("RA")?.value;
        let dec_deg = nv.elements.get("DEC")?.value;
        Some(Vector3::from_ra_dec_deg(ra_hours * 15.0, dec_deg))
    }

    fn converged(current: Vector3, target: Vector3) -> bool {
        current.angle_between_deg(target) * 3600.0 < SLEW_CONVERGENCE_ARCSEC
    }
}

#[async_trait]
impl Event for Slew {
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
        let jd = julian_date(ctx.now);
        let target = self.target_vector(jd);

        if let Some(current) = Self::current_vector(ctx).await {
            if Self::converged(current, target) {
                self.state.mark_running(ctx.now);
                self.state.finish();
                return;
            }
        }

        if let Err(e) = ctx
            .conn
            .set_value(
                MOUNT_DEVICE,
                "ON_COORD_SET",
                vec![("SLEW".to_string(), WriteValue::Switch(SwitchState::On))],
                false,
                Duration::from_secs(0),
            )
            .await
        {
            return self.state.fail(e);
        }

        let (ra, dec) = j2000_to_jnow_deg(self.ra_deg, self.dec_deg, jd);
        let write = ctx
            .conn
            .set_value(
                MOUNT_DEVICE,
                "EQUATORIAL_EOD_COORD",
                vec![
                    ("RA".to_string(), WriteValue::Number(ra / 15.0)),
                    ("DEC".to_string(), WriteValue::Number(dec)),
                ],
                false,
                SLEW_WIRE_TIMEOUT,
            )
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
        let jd = julian_date(ctx.now);
        let target = self.target_vector(jd);
        let Some(current) = Self::current_vector(ctx).await else { return };
        if Self::converged(current, target) {
            self.state.finish();
        }
    }

    async fn cancel(&mut self, ctx: &EventContext<'_>) {
        let _ = ctx
            .conn
            .set_value(
                MOUNT_DEVICE,
                "TELESCOPE_ABORT_MOTION",
                vec![("ABORT".to_string(), WriteValue::Switch(SwitchState::On))],
                false,
                Duration::from_secs(0),
            )
            .await;
        self.state.fail("canceled");
    }
}

#[cfg(test)]
#[path = "slew_tests.rs"]
mod tests;

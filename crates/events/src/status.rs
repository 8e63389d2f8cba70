//! Event lifecycle status (spec §4.3), mirroring
//! `original_source/events/base.py`'s `EventStatus` enum and its
//! `is_done`/`is_active`/`is_started` properties.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    NotReady,
    Ready,
    Running,
    Finished,
    Canceling,
    Failed,
}

impl EventStatus {
    /// Terminal: no further transition occurs.
    pub fn is_done(self) -> bool {
        matches!(self, EventStatus::Finished | EventStatus::Failed)
    }

    /// Under active scheduler control (spec invariant 5: at most one event
    /// may be active at any instant).
    pub fn is_active(self) -> bool {
        matches!(self, EventStatus::Running | EventStatus::Canceling)
    }

    /// `trigger` has already been called.
    pub fn is_started(self) -> bool {
        !matches!(self, EventStatus::NotReady | EventStatus::Ready)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

//! Errors an event's `trigger`/`update`/`cancel` can encounter. These are
//! never propagated to the caller (spec §4.3: "On exception: status =
//! failed, append exception text to job log") — they are captured as the
//! event's `last_error` text via [`EventState::fail`](crate::EventState::fail).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Connection(#[from] obs_connection::ConnectionError),
    #[error(transparent)]
    Catalog(#[from] obs_adapters::CatalogError),
    #[error(transparent)]
    Fits(#[from] obs_adapters::FitsError),
    #[error("unknown filter {0:?}")]
    UnknownFilter(String),
    #[error("unknown job verb {0:?}")]
    UnknownVerb(String),
    #[error("a series cannot be constructed without at least one sub-event")]
    EmptySeries,
    #[error("a series cannot mix sub-events belonging to different jobs")]
    MixedJobIds,
    #[error("Failed to complete within the time limit")]
    TimedOut,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

//! Scheduler errors (spec §7's `job-parse-error` row).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("malformed job command: {0}")]
    MalformedCommand(String),
    #[error(transparent)]
    Event(#[from] obs_events::EventError),
    #[error(transparent)]
    Catalog(#[from] obs_adapters::CatalogError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

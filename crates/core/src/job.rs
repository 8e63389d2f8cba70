//! Job record: the catalog's unit of scheduled work.

use crate::id::JobId;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a job's capture, as persisted to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaptureStatus {
    Queued,
    Running,
    Failed,
    Finished,
    Expired,
}

/// Plate-solve status of a job's captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// Unsolved, but intended to be solved.
    Unsolved,
    Solved,
    SolveFailed,
    /// Temporary frame (e.g. focusing image); never queued for solving.
    DontSolve,
}

/// A scheduled imaging job, as fetched from / written back to the catalog.
///
/// `cmd` encodes one of `STATIC <ra-deg> <dec-deg>` or `SYNC_INPLACE`; other
/// verbs appear in the original record but are not dispatched by the job
/// parser (spec §3, §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub cmd: String,
    pub priority: i64,
    pub duration: f64,
    pub filter: String,
    pub jd_start: Option<f64>,
    pub jd_end: Option<f64>,
    pub capture_status: CaptureStatus,
    pub solve: Option<SolveStatus>,
    pub frame: Option<String>,
    pub jd_obs: Option<f64>,
    #[serde(default)]
    pub log: String,
    /// Catalog-record bookkeeping carried over from the original schema;
    /// not read by any event or the scheduler.
    #[serde(default)]
    pub proposal_id: Option<String>,
    #[serde(default)]
    pub keep_frame: Option<bool>,
    #[serde(default)]
    pub private: Option<bool>,
}

impl Job {
    /// Append a `"<iso-utc> - <julian-date> - <message>"` line to the job's
    /// log, matching the writeback format in spec §4.4.
    pub fn append_log(&mut self, now_utc: chrono::DateTime<chrono::Utc>, julian_date: f64, message: &str) {
        if !self.log.is_empty() {
            self.log.push('\n');
        }
        self.log.push_str(&format!("{} - {:.6} - {}", now_utc.to_rfc3339(), julian_date, message));
    }

    /// Individual filter characters to cycle through for a `STATIC` job
    /// (each character names one filter, per spec §4.4.1).
    pub fn filter_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.filter.chars()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;

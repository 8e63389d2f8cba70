//! Job parser (spec §4.4.1): maps a catalog [`Job`] to an event tree
//! wrapped in a time window, grounded on
//! `original_source/scheduler/jobs.py`'s `Job.parse_job`.
//!
//! The original builds the event tree with `Event.__add__`, which flattens
//! a chain of leaf events and already-built `SeriesEvent`s into one flat
//! `SeriesEvent`. Here `Series::new` takes an explicit `Vec<Box<dyn
//! Event>>`, so a `STATIC` job's slew/filter/capture chain is built flat,
//! while `SYNC_INPLACE` nests `Sync`'s own two-stage series as a single
//! sub-event of the outer series — an equivalent tree shape (the nesting
//! is invisible to `Series`'s delegation-based status/trigger/cancel logic)
//! without needing to expose `Sync`'s private sub-events across the crate
//! boundary.

use std::time::Duration;

use obs_adapters::astro::datetime_from_julian;
use obs_core::Job;
use obs_events::{Capture, Event, Series, SetFilter, Slew, Sync as SyncEvent, TimeConstrained};

use crate::error::SchedulerError;

/// Translate a queued job's `cmd` into an event tree, wrapped in the time
/// window built from `jd_start`/`jd_end` (spec §4.4.1).
pub fn parse_job(job: &Job) -> Result<Box<dyn Event>, SchedulerError> {
    let mut parts = job.cmd.split_whitespace();
    let verb = parts.next().ok_or_else(|| SchedulerError::MalformedCommand(job.cmd.clone()))?;
    let args: Vec<&str> = parts.collect();

    let inner: Box<dyn Event> = match verb.to_ascii_uppercase().as_str() {
        "STATIC" => build_static(job, &args)?,
        "SYNC_INPLACE" => build_sync_inplace(job)?,
        other => return Err(obs_events::EventError::UnknownVerb(other.to_string()).into()),
    };

    let start = job.jd_start.map(datetime_from_julian);
    let end = job.jd_end.map(datetime_from_julian);
    Ok(Box::new(TimeConstrained::new(inner, start, end)))
}

fn build_static(job: &Job, args: &[&str]) -> Result<Box<dyn Event>, SchedulerError> {
    let (ra, dec) = match args {
        [ra, dec] => (*ra, *dec),
        _ => return Err(SchedulerError::MalformedCommand(job.cmd.clone())),
    };
    let ra: f64 = ra.parse().map_err(|_| SchedulerError::MalformedCommand(job.cmd.clone()))?;
    let dec: f64 = dec.parse().map_err(|_| SchedulerError::MalformedCommand(job.cmd.clone()))?;

    let mut events: Vec<Box<dyn Event>> = vec![Box::new(Slew::new(job.id.clone(), job.priority, ra, dec))];
    for filt in job.filter_chars() {
        events.push(Box::new(SetFilter::new(job.id.clone(), job.priority, filt.to_string())));
        events.push(Box::new(Capture::new(job.id.clone(), job.priority, Duration::from_secs_f64(job.duration))));
    }
    Ok(Box::new(Series::new(events)?))
}

fn build_sync_inplace(job: &Job) -> Result<Box<dyn Event>, SchedulerError> {
    let events: Vec<Box<dyn Event>> =
        vec![Box::new(SetFilter::new(job.id.clone(), job.priority, job.filter.clone())), Box::new(SyncEvent::new(job.id.clone(), job.priority))];
    Ok(Box::new(Series::new(events)?))
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;

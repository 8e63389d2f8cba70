use super::*;
use obs_core::{CaptureStatus, JobId};
use std::time::Duration;

fn job(cmd: &str, filter: &str, duration: f64) -> Job {
    Job {
        id: JobId::new("job-1"),
        cmd: cmd.to_string(),
        priority: 7,
        duration,
        filter: filter.to_string(),
        jd_start: None,
        jd_end: None,
        capture_status: CaptureStatus::Queued,
        solve: None,
        frame: None,
        jd_obs: None,
        log: String::new(),
        proposal_id: None,
        keep_frame: None,
        private: None,
    }
}

#[test]
fn static_builds_a_slew_then_one_filter_capture_pair_per_filter_char() {
    let j = job("STATIC 180.0 10.0", "LR", 2.0);
    let event = parse_job(&j).unwrap();

    assert_eq!(event.job_id(), &j.id);
    assert_eq!(event.priority(), 7);
    // Slew(90) + SetFilter(30) + Capture(2+5) + SetFilter(30) + Capture(2+5), plus the series' own 10s margin.
    assert_eq!(event.max_time(), Duration::from_secs(90 + 30 + 7 + 30 + 7 + 10));
}

#[test]
fn static_is_case_insensitive() {
    let j = job("static 180.0 10.0", "L", 1.0);
    assert!(parse_job(&j).is_ok());
}

#[test]
fn static_rejects_missing_coordinates() {
    let j = job("STATIC 180.0", "L", 1.0);
    let err = parse_job(&j).unwrap_err();
    assert!(matches!(err, SchedulerError::MalformedCommand(_)));
}

#[test]
fn static_rejects_non_numeric_coordinates() {
    let j = job("STATIC not-a-number 10.0", "L", 1.0);
    let err = parse_job(&j).unwrap_err();
    assert!(matches!(err, SchedulerError::MalformedCommand(_)));
}

#[test]
fn sync_inplace_builds_a_filter_then_sync_series() {
    let j = job("SYNC_INPLACE", "L", 1.0);
    let event = parse_job(&j).unwrap();

    assert_eq!(event.job_id(), &j.id);
    // SetFilter(30) + Sync(Capture(6) + SyncInner(60) + 10s series margin), plus the outer series' own 10s margin.
    assert_eq!(event.max_time(), Duration::from_secs(30 + (6 + 60 + 10) + 10));
}

#[test]
fn unknown_verb_is_rejected() {
    let j = job("FOCUS", "L", 1.0);
    let err = parse_job(&j).unwrap_err();
    assert!(matches!(err, SchedulerError::Event(obs_events::EventError::UnknownVerb(_))));
}

#[test]
fn empty_cmd_is_rejected() {
    let j = job("", "L", 1.0);
    let err = parse_job(&j).unwrap_err();
    assert!(matches!(err, SchedulerError::MalformedCommand(_)));
}

#[test]
fn time_window_is_built_from_jd_start_and_jd_end() {
    let mut j = job("SYNC_INPLACE", "L", 1.0);
    j.jd_start = Some(obs_adapters::astro::julian_date_now() - 1.0);
    j.jd_end = Some(obs_adapters::astro::julian_date_now() + 1.0);
    assert!(parse_job(&j).is_ok());
}

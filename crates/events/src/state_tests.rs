use super::*;
use std::time::Duration;

fn state() -> EventState {
    EventState::new(JobId::new("job-1"), 5, Duration::from_secs(10))
}

#[test]
fn starts_ready() {
    assert_eq!(state().status, EventStatus::Ready);
}

#[test]
fn mark_running_records_started_at() {
    let mut s = state();
    let now = Utc::now();
    s.mark_running(now);
    assert_eq!(s.status, EventStatus::Running);
    assert_eq!(s.started_at, Some(now));
}

#[test]
fn enforce_timeout_is_noop_before_the_cap() {
    let mut s = state();
    let start = Utc::now();
    s.mark_running(start);
    let fired = s.enforce_timeout(start + chrono::Duration::seconds(5));
    assert!(!fired);
    assert_eq!(s.status, EventStatus::Running);
}

#[test]
fn enforce_timeout_fails_past_the_cap_with_spec_message() {
    let mut s = state();
    let start = Utc::now();
    s.mark_running(start);
    let fired = s.enforce_timeout(start + chrono::Duration::seconds(11));
    assert!(fired);
    assert_eq!(s.status, EventStatus::Failed);
    assert_eq!(s.last_error.as_deref(), Some("Failed to complete within the time limit"));
}

#[test]
fn enforce_timeout_ignored_when_not_running() {
    let mut s = state();
    assert!(!s.enforce_timeout(Utc::now() + chrono::Duration::seconds(1000)));
    assert_eq!(s.status, EventStatus::Ready);
}

use super::*;

#[test]
fn unknown_verb_wraps_the_event_error_message() {
    let err: SchedulerError = obs_events::EventError::UnknownVerb("FOCUS".to_string()).into();
    assert!(err.to_string().contains("FOCUS"));
}

#[test]
fn malformed_command_includes_the_offending_cmd() {
    let err = SchedulerError::MalformedCommand("STATIC not-a-number 10.0".to_string());
    assert!(err.to_string().contains("STATIC not-a-number 10.0"));
}

use super::*;
use clap::Parser;

#[derive(Parser)]
struct Wrapper {
    #[command(flatten)]
    args: RunScheduleArgs,
}

fn parse(argv: &[&str]) -> RunScheduleArgs {
    let mut full = vec!["run-schedule"];
    full.extend_from_slice(argv);
    Wrapper::try_parse_from(full).expect("args should parse").args
}

#[test]
fn defaults_match_observatory_config_defaults() {
    let args = parse(&[]);
    assert_eq!(args.mount, "iOptron CEM70");
    assert_eq!(args.camera, "ZWO CCD ASI533MM Pro");
    assert_eq!(args.focus, "ZWO EAF");
    assert_eq!(args.wheel, "ZWO EFW");
    assert_eq!(args.host, "localhost");
    assert_eq!(args.port, 7624);
    assert_eq!(args.cache, "http://127.0.0.1:8090");
    assert!(args.username.is_none());
    assert!(args.password.is_none());
}

#[test]
fn flags_override_defaults() {
    let args = parse(&[
        "--mount",
        "EQ6-R",
        "--host",
        "10.0.0.5",
        "--port",
        "7000",
        "--username",
        "observer",
        "--password",
        "hunter2",
    ]);
    assert_eq!(args.mount, "EQ6-R");
    assert_eq!(args.host, "10.0.0.5");
    assert_eq!(args.port, 7000);
    assert_eq!(args.username.as_deref(), Some("observer"));
    assert_eq!(args.password.as_deref(), Some("hunter2"));
}

//! `obsd`'s help/usage surface (spec §6: `run-schedule`, `find-devices`).

use assert_cmd::Command;

fn obsd() -> Command {
    Command::cargo_bin("obsd").expect("obsd binary should be built by the test harness")
}

#[test]
fn no_args_prints_usage_and_fails() {
    obsd().assert().failure().stderr(predicates::str::contains("Usage:"));
}

#[test]
fn help_lists_both_subcommands() {
    obsd().arg("--help").assert().success().stdout(predicates::str::contains("run-schedule")).stdout(predicates::str::contains("find-devices"));
}

#[test]
fn run_schedule_help_lists_device_flags() {
    obsd()
        .args(["run-schedule", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("--mount"))
        .stdout(predicates::str::contains("--camera"))
        .stdout(predicates::str::contains("--wheel"))
        .stdout(predicates::str::contains("--cache"));
}

#[test]
fn find_devices_help_lists_host_and_port() {
    obsd().args(["find-devices", "--help"]).assert().success().stdout(predicates::str::contains("--host")).stdout(predicates::str::contains("--port"));
}

#[test]
fn unknown_subcommand_is_rejected() {
    obsd().arg("not-a-real-command").assert().failure();
}

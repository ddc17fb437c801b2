use assert_cmd::Command;
use predicates::prelude::*;
use wrappers_common::testing::FakeFlux;

const JOBS: &str = r#"{"jobs": [
    {"id": 58, "username": "alice", "ntasks": 8, "state": 8,
     "t_run": 86400.0, "t_remaining": 3725.0},
    {"id": 60, "username": "alice", "ntasks": 1, "state": 32, "result": 1,
     "runtime": 65.0, "t_cleanup": 120.0}
]}"#;

fn fshowq(flux: &FakeFlux) -> Command {
    let mut cmd = Command::cargo_bin("fshowq").unwrap();
    cmd.envs(flux.envs()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_running_section() {
    let flux = FakeFlux::new(JOBS).unwrap();
    fshowq(&flux)
        .arg("-r")
        .assert()
        .success()
        .stdout(
            "active jobs------------------------\n\
             JOBID      USERNAME   STATE        PROCS    REMAINING            STARTTIME\n\
             \n\
             f21        alice      RUN              8      1:02:05  Fri Jan 02 00:00:00\n\
             \n\
             1 active jobs\n\
             \n\
             \n\
             Total jobs:   1\n\
             \n",
        );
    assert_eq!(flux.calls(), vec!["jobs --json -A -a"]);
}

#[test]
fn test_completed_without_header() {
    let flux = FakeFlux::new(JOBS).unwrap();
    fshowq(&flux)
        .args(["-c", "-H", "-u", "alice"])
        .assert()
        .success()
        .stdout(
            "f23        alice      NA         NA        NA         NA         COMPLETED      0:0      1        01:05  Thu Jan 01 00:02:00\n",
        );
    assert_eq!(flux.calls(), vec!["jobs --json --user=alice -a"]);
}

#[test]
fn test_unknown_arguments_warn() {
    let flux = FakeFlux::new(JOBS).unwrap();
    fshowq(&flux)
        .args(["-H", "--blocking", "extra"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "WARNING: \"--blocking extra\" is not supported by this wrapper and is being ignored.",
        ));
}

#[test]
fn test_exclusive_sections() {
    let flux = FakeFlux::new(JOBS).unwrap();
    fshowq(&flux).args(["-c", "-r"]).assert().failure();
    assert!(flux.calls().is_empty());
}

//! Error reporting specs

use crate::prelude::*;

#[test]
fn run_without_members_or_config_fails() {
    Project::empty()
        .rvz()
        .args(&["run"])
        .fails()
        .stderr_has("--members is required");
}

#[test]
fn zero_members_is_rejected() {
    Project::empty()
        .rvz()
        .args(&["run", "--members", "0"])
        .fails()
        .stderr_has("at least 1");
}

#[test]
fn barrier_name_with_slash_is_rejected() {
    Project::empty()
        .rvz()
        .args(&["run", "--members", "2", "--barrier", "a/b"])
        .fails()
        .stderr_has("invalid barrier name");
}

#[test]
fn unparseable_poll_interval_is_rejected() {
    Project::empty()
        .rvz()
        .args(&["run", "--members", "2", "--poll-interval", "soon"])
        .fails()
        .stderr_has("--poll-interval");
}

#[test]
fn unknown_config_key_is_rejected() {
    let temp = Project::empty();
    let path = temp.file(
        "barrier.toml",
        "name = \"x\"\nexpected_members = 2\nquorum = 1\n",
    );
    temp.rvz()
        .args(&["config", "--config", path.to_str().unwrap()])
        .fails()
        .stderr_has("quorum");
}

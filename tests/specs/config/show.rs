//! `rvz config` specs

use crate::prelude::*;

#[test]
fn config_prints_effective_toml() {
    Project::empty()
        .rvz()
        .args(&["config", "--members", "4", "--barrier", "deploy"])
        .passes()
        .stdout_eq("name = \"deploy\"\nexpected_members = 4\npoll_interval = \"1s\"\n");
}

#[test]
fn config_file_values_are_loaded() {
    let temp = Project::empty();
    let path = temp.file("barrier.toml", ROUND_CONFIG);
    temp.rvz()
        .args(&["config", "--config", path.to_str().unwrap()])
        .passes()
        .stdout_has("name = \"nightly\"")
        .stdout_has("expected_members = 3")
        .stdout_has("poll_interval = \"50ms\"");
}

#[test]
fn flags_override_config_file() {
    let temp = Project::empty();
    let path = temp.file("barrier.toml", ROUND_CONFIG);
    temp.rvz()
        .args(&[
            "config",
            "--config",
            path.to_str().unwrap(),
            "--members",
            "7",
        ])
        .passes()
        .stdout_has("name = \"nightly\"")
        .stdout_has("expected_members = 7");
}

#[test]
fn config_json_output() {
    let run = Project::empty()
        .rvz()
        .args(&["config", "--members", "2", "--output", "json"])
        .passes();
    let json = run.json();
    assert_eq!(json["name"], "round1");
    assert_eq!(json["expected_members"], 2);
    assert_eq!(json["poll_interval"], "1s");
}

//! `rvz run` specs

use crate::prelude::*;

#[test]
fn single_member_round_passes() {
    Project::empty()
        .rvz()
        .args(&["run", "--members", "1"])
        .passes()
        .stdout_has("Barrier: round1 (1 members)")
        .stdout_has("Initiator: member-1")
        .stdout_has("/round1/AllClear");
}

#[test]
fn three_member_round_reports_each_member() {
    Project::empty()
        .rvz()
        .args(&["run", "--barrier", "round1", "--members", "3"])
        .passes()
        .stdout_has("member-1")
        .stdout_has("member-2")
        .stdout_has("member-3")
        .stdout_has("initiator")
        .stdout_has("follower");
}

#[test]
fn member_entries_are_removed_after_round() {
    Project::empty()
        .rvz()
        .args(&["run", "--members", "3", "--output", "json"])
        .passes()
        .stdout_lacks("/round1/member-");
}

#[test]
fn json_report_has_exactly_one_initiator() {
    let run = Project::empty()
        .rvz()
        .args(&["run", "--members", "5", "--output", "json"])
        .passes();
    let json = run.json();
    let members = json["members"].as_array().unwrap();
    assert_eq!(members.len(), 5);
    let initiators = members
        .iter()
        .filter(|m| m["role"] == "initiator")
        .count();
    assert_eq!(initiators, 1);
    assert_eq!(
        json["remaining"],
        serde_json::json!(["/round1", "/round1/AllClear"])
    );
}

#[test]
fn round_completes_with_watches_dropped() {
    Project::empty()
        .rvz()
        .args(&[
            "run",
            "--members",
            "3",
            "--drop-watches",
            "--poll-interval",
            "20ms",
        ])
        .passes()
        .stdout_has("Initiator: member-");
}

#[test]
fn staggered_round_from_config_file() {
    let temp = Project::empty();
    let path = temp.file("barrier.toml", ROUND_CONFIG);
    temp.rvz()
        .args(&[
            "run",
            "--config",
            path.to_str().unwrap(),
            "--stagger",
            "10ms",
        ])
        .passes()
        .stdout_has("Barrier: nightly (3 members)")
        .stdout_has("/nightly/AllClear");
}

#[test]
fn logs_go_to_stderr() {
    let run = Project::empty()
        .rvz()
        .env("RUST_LOG", "info")
        .args(&["run", "--members", "2"])
        .passes()
        .stderr_has("passed barrier");
    assert!(!run.stdout.contains("passed barrier"));
}

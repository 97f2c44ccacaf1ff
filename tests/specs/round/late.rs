//! Late member specs
//!
//! Members that arrive after the all-clear marker exists pass without waiting.

use crate::prelude::*;

#[test]
fn late_members_pass_as_followers() {
    let run = Project::empty()
        .rvz()
        .args(&["run", "--members", "2", "--late", "2", "--output", "json"])
        .passes();
    let json = run.json();
    let late: Vec<_> = json["members"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["late"] == true)
        .collect();
    assert_eq!(late.len(), 2);
    for m in late {
        assert_eq!(m["role"], "follower");
    }
}

#[test]
fn late_members_are_marked_in_text_output() {
    Project::empty()
        .rvz()
        .args(&["run", "--members", "1", "--late", "1"])
        .passes()
        .stdout_has("member-2")
        .stdout_has("yes");
}

//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    Project::empty()
        .rvz()
        .args(&["--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("config")
        .stdout_has("completions");
}

#[test]
fn run_help_lists_round_flags() {
    Project::empty()
        .rvz()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--members")
        .stdout_has("--late")
        .stdout_has("--stagger")
        .stdout_has("--poll-interval")
        .stdout_has("--drop-watches");
}

#[test]
fn completions_generate_for_bash() {
    Project::empty()
        .rvz()
        .args(&["completions", "bash"])
        .passes()
        .stdout_has("rvz");
}

//! Error reporting specs

use crate::prelude::*;

#[test]
fn store_in_use_is_reported() {
    let temp = Project::empty();
    let _held = temp.hold_store();

    temp.tally()
        .args(&["tickets", "list"])
        .fails()
        .stderr_has("failed to open store")
        .stderr_has("in use by another process");
}

#[test]
fn invalid_config_is_reported() {
    let temp = Project::empty();
    temp.file("tally.toml", "[coordinator]\nwarning_threshold = 5\n");

    temp.tally()
        .args(&["tickets", "list"])
        .fails()
        .stderr_has("invalid config");
}

#[test]
fn explicit_config_path_is_used() {
    let temp = Project::empty();
    temp.file("custom/tally.toml", "[coordinator]\nwarning_threshold = \"5s\"\n");
    let config = temp.path().join("custom/tally.toml");

    temp.tally()
        .args(&["--config", config.to_str().unwrap(), "tickets", "list"])
        .passes()
        .stdout_eq("No tickets\n");
}

#[test]
fn bad_duration_is_rejected() {
    let temp = Project::empty();

    temp.tally()
        .args(&["tickets", "orphans", "--older-than", "soon"])
        .fails();
}

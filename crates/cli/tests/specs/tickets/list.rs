//! Ticket listing specs

use crate::prelude::*;

#[test]
fn empty_store_has_no_tickets() {
    let temp = Project::empty();

    temp.tally()
        .args(&["tickets", "list"])
        .passes()
        .stdout_eq("No tickets\n");
}

#[test]
fn list_marks_holders_and_waiters() {
    let temp = Project::empty();
    temp.seed_tickets(&[("u-1", "deploy"), ("u-2", "deploy"), ("u-3", "backup")]);

    let run = temp.tally().args(&["tickets", "list"]).passes();
    let lines: Vec<&str> = run.stdout().lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("deploy") && lines[0].contains("holding") && lines[0].ends_with("u-1"));
    assert!(lines[1].contains("waiting") && lines[1].ends_with("u-2"));
    assert!(lines[2].contains("backup") && lines[2].contains("holding"));
}

#[test]
fn list_filters_by_name() {
    let temp = Project::empty();
    temp.seed_tickets(&[("u-1", "deploy"), ("u-2", "backup")]);

    temp.tally()
        .args(&["tickets", "list", "--name", "backup"])
        .passes()
        .stdout_has("u-2")
        .stdout_lacks("u-1");
}

#[test]
fn list_as_json() {
    let temp = Project::empty();
    temp.seed_tickets(&[("u-1", "deploy"), ("u-2", "deploy")]);

    let run = temp.tally().args(&["tickets", "list", "--json"]).passes();
    let rows: serde_json::Value = serde_json::from_str(run.stdout()).unwrap();

    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["uuid"], "u-1");
    assert_eq!(rows[0]["state"], "holding");
    assert_eq!(rows[1]["state"], "waiting");
    assert!(rows[1]["id"].as_u64().unwrap() > rows[0]["id"].as_u64().unwrap());
}

#[test]
fn fresh_tickets_are_not_orphans() {
    let temp = Project::empty();
    temp.seed_tickets(&[("u-1", "deploy")]);

    temp.tally()
        .args(&["tickets", "orphans", "--older-than", "1h"])
        .passes()
        .stdout_eq("No orphaned tickets\n");
}

#[test]
fn zero_threshold_reports_every_ticket() {
    let temp = Project::empty();
    temp.seed_tickets(&[("u-1", "deploy"), ("u-2", "backup")]);

    temp.tally()
        .args(&["tickets", "orphans", "--older-than", "0s"])
        .passes()
        .stdout_has("u-1")
        .stdout_has("u-2");
}

#[test]
fn store_flag_overrides_environment() {
    let seeded = Project::empty();
    seeded.seed_tickets(&[("u-1", "deploy")]);
    let other = Project::empty();

    other
        .tally()
        .args(&["--store", seeded.path().to_str().unwrap(), "tickets", "list"])
        .passes()
        .stdout_has("u-1");
}

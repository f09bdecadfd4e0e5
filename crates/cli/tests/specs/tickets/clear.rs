//! Ticket clearing specs

use crate::prelude::*;

#[test]
fn clear_by_uuid_promotes_the_next_ticket() {
    let temp = Project::empty();
    temp.seed_tickets(&[("u-1", "deploy"), ("u-2", "deploy")]);

    temp.tally()
        .args(&["tickets", "clear", "u-1"])
        .passes()
        .stdout_has("Removed u-1 (deploy #1)")
        .stdout_has("1 ticket(s) removed");

    temp.tally()
        .args(&["tickets", "list"])
        .passes()
        .stdout_has("holding")
        .stdout_has("u-2")
        .stdout_lacks("u-1");
}

#[test]
fn clear_reports_unknown_uuids() {
    let temp = Project::empty();

    temp.tally()
        .args(&["tickets", "clear", "nope"])
        .passes()
        .stdout_eq("No ticket nope\n0 ticket(s) removed\n");
}

#[test]
fn clear_by_name_empties_the_queue() {
    let temp = Project::empty();
    temp.seed_tickets(&[("u-1", "deploy"), ("u-2", "deploy"), ("u-3", "backup")]);

    temp.tally()
        .args(&["tickets", "clear", "--name", "deploy"])
        .passes()
        .stdout_has("2 ticket(s) removed");

    temp.tally()
        .args(&["tickets", "list"])
        .passes()
        .stdout_has("u-3")
        .stdout_lacks("deploy");
}

#[test]
fn clear_needs_a_target() {
    let temp = Project::empty();

    temp.tally().args(&["tickets", "clear"]).fails();
}

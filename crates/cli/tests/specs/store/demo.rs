//! Contention demo specs

use crate::prelude::*;

#[test]
fn demo_grants_in_ticket_order() {
    let temp = Project::empty();

    let run = temp
        .tally()
        .args(&["demo", "--workers", "4", "--hold", "5ms"])
        .passes()
        .stdout_has("4 grants in ticket order");

    let grants = run.stdout().lines().filter(|l| l.starts_with("worker")).count();
    assert_eq!(grants, 4);
}

#[test]
fn demo_leaves_no_tickets_behind() {
    let temp = Project::empty();

    temp.tally()
        .args(&["demo", "--workers", "3", "--name", "deploy", "--hold", "1ms"])
        .passes();

    temp.tally()
        .args(&["tickets", "list"])
        .passes()
        .stdout_eq("No tickets\n");
}

#[test]
fn stale_ticket_on_another_name_does_not_block() {
    let temp = Project::empty();
    temp.seed_tickets(&[("stale", "other")]);

    // A stale ticket on another name does not block the demo
    temp.tally()
        .args(&["demo", "--workers", "2", "--name", "deploy", "--hold", "1ms"])
        .passes()
        .stdout_has("2 grants in ticket order");

    temp.tally()
        .args(&["tickets", "list"])
        .passes()
        .stdout_has("stale");
}

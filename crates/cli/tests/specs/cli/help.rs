//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();

    temp.tally()
        .args(&["--help"])
        .passes()
        .stdout_has("tickets")
        .stdout_has("demo")
        .stdout_has("compact");
}

#[test]
fn tickets_help_lists_subcommands() {
    let temp = Project::empty();

    temp.tally()
        .args(&["tickets", "--help"])
        .passes()
        .stdout_has("list")
        .stdout_has("orphans")
        .stdout_has("clear");
}

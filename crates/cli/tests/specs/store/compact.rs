//! Log compaction specs

use crate::prelude::*;

#[test]
fn compact_shrinks_the_log() {
    let temp = Project::empty();
    temp.tally()
        .args(&["demo", "--workers", "5", "--hold", "1ms"])
        .passes();

    temp.tally()
        .args(&["compact"])
        .passes()
        .stdout_has("Compacted")
        .stdout_has("-> 1 (");
}

#[test]
fn tickets_survive_compaction() {
    let temp = Project::empty();
    temp.seed_tickets(&[("u-1", "deploy"), ("u-2", "deploy")]);

    temp.tally().args(&["compact"]).passes();

    temp.tally()
        .args(&["tickets", "list"])
        .passes()
        .stdout_has("u-1")
        .stdout_has("u-2");
}

#[test]
fn ids_keep_increasing_after_compaction() {
    let temp = Project::empty();
    temp.seed_tickets(&[("u-1", "deploy")]);
    temp.tally().args(&["tickets", "clear", "u-1"]).passes();
    temp.tally().args(&["compact"]).passes();

    temp.seed_tickets(&[("u-2", "deploy")]);

    let run = temp.tally().args(&["tickets", "list", "--json"]).passes();
    let rows: serde_json::Value = serde_json::from_str(run.stdout()).unwrap();
    assert_eq!(rows[0]["id"], 2);
}

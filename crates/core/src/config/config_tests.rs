// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn empty_config_uses_defaults() {
    let config = TallyConfig::from_toml_str("").unwrap();
    assert_eq!(config, TallyConfig::default());
    assert_eq!(config.coordinator.warning_threshold, Duration::from_secs(2));
    assert_eq!(config.coordinator.ledger_collection, "tally_tickets");
    assert!(config.store.default_pk);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = TallyConfig::from_toml_str(
        r#"
        [store]
        updated_at = false

        [coordinator]
        warning_threshold = "250ms"
        "#,
    )
    .unwrap();

    assert!(!config.store.updated_at);
    assert!(config.store.created_at);
    assert_eq!(
        config.coordinator.warning_threshold,
        Duration::from_millis(250)
    );
    assert_eq!(config.coordinator.event_capacity, 256);
}

#[test]
fn invalid_duration_is_a_parse_error() {
    let err = TallyConfig::from_toml_str(
        r#"
        [coordinator]
        warning_threshold = "soon"
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tally.toml");
    std::fs::write(&path, "[coordinator]\nledger_collection = \"locks\"\n").unwrap();

    let config = TallyConfig::load(&path).unwrap();
    assert_eq!(config.coordinator.ledger_collection, "locks");
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = TallyConfig::load(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn load_or_default_tolerates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = TallyConfig::load_or_default(&dir.path().join("nope.toml")).unwrap();
    assert_eq!(config, TallyConfig::default());
}

#[test]
fn event_capacity_is_at_least_one() {
    let config = CoordinatorConfig::new().with_event_capacity(0);
    assert_eq!(config.event_capacity, 1);
}

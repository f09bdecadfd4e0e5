// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn drop_op(collection: &str) -> Operation {
    Operation::Drop {
        collection: collection.to_string(),
    }
}

#[test]
fn new_entry_verifies() {
    let entry = WalEntry::new(1, drop_op("users"));
    assert!(entry.verify());
}

#[test]
fn tampered_operation_fails_verification() {
    let mut entry = WalEntry::new(1, drop_op("users"));
    entry.operation = drop_op("accounts");
    assert!(!entry.verify());
}

#[test]
fn line_format_is_tagged_json() {
    let entry = WalEntry::new(7, drop_op("users"));
    let line = entry.to_line().unwrap();

    assert!(!line.contains('\n'));
    assert!(line.contains(r#""sequence":7"#));
    assert!(line.contains(r#""type":"drop""#));
    assert_eq!(WalEntry::from_line(&line).unwrap(), entry);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tally_core::{LedgerOp, MemoryDriver, MemoryLedger};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

// =============================================================================
// Pass-through behavior
// =============================================================================

#[tokio::test]
async fn traced_ledger_passes_calls_through() {
    let inner = MemoryLedger::new();
    let traced = TracedLedger::new(inner.clone());

    let ticket = traced.insert(NewTicket::new("u-1", "jobs")).await.unwrap();
    assert_eq!(traced.list_all().await.unwrap(), vec![ticket]);

    traced.remove("u-1").await.unwrap();
    assert!(inner.tickets().is_empty());
}

#[tokio::test]
async fn traced_driver_rejects_empty_collection_name() {
    let traced = TracedDriver::new(MemoryDriver::new());

    let err = traced.create("  ", record(json!({"a": 1}))).await.unwrap_err();
    assert!(
        err.to_string().contains("collection name is empty"),
        "Expected error about the collection name, got: {}",
        err
    );
    assert!(traced.inner().collections().is_empty());
}

#[tokio::test]
async fn traced_driver_keeps_inner_identity() {
    let traced = TracedDriver::new(MemoryDriver::new());
    assert_eq!(traced.identity(), "memory");
}

// =============================================================================
// Tracing output verification tests
// =============================================================================

#[test]
fn traced_ledger_insert_logs_span_and_id() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedLedger::new(MemoryLedger::new());
        traced.insert(NewTicket::new("u-1", "deploy")).await
    });

    assert!(result.is_ok(), "insert should succeed: {:?}", result);
    assert!(
        logs.contains("ledger.insert"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("deploy"),
        "Should log lock name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("ticket inserted"),
        "Should log completion. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("elapsed_ms"),
        "Should log timing. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_ledger_logs_failures() {
    let (logs, result) = with_tracing(|| async {
        let inner = MemoryLedger::new();
        inner.fail_next(LedgerOp::ListAll, "replica lagging");
        TracedLedger::new(inner).list_all().await
    });

    assert!(result.is_err());
    assert!(
        logs.contains("ledger scan failed"),
        "Should log scan failure. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("replica lagging"),
        "Should log the cause. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_ledger_remove_logs_operation() {
    let (logs, _) = with_tracing(|| async {
        let traced = TracedLedger::new(MemoryLedger::new());
        traced.insert(NewTicket::new("u-9", "deploy")).await.unwrap();
        traced.remove("u-9").await
    });

    assert!(
        logs.contains("ledger.remove"),
        "Should log remove span. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("ticket removed"),
        "Should log remove completion. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_driver_define_and_create_log_operations() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedDriver::new(MemoryDriver::new());
        traced.define("users", &Schema::new()).await.unwrap();
        traced.create("users", record(json!({"name": "ada"}))).await
    });

    assert!(result.is_ok(), "create should succeed: {:?}", result);
    assert!(
        logs.contains("driver.define"),
        "Should log define span. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("defining collection"),
        "Should log define entry. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("record created"),
        "Should log create completion. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_driver_logs_define_conflict() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedDriver::new(MemoryDriver::new());
        traced.define("users", &Schema::new()).await.unwrap();
        traced.define("users", &Schema::new()).await
    });

    assert!(result.is_err());
    assert!(
        logs.contains("define failed"),
        "Should log define failure. Logs:\n{}",
        logs
    );
}

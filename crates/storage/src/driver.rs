// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable driver: a materialized state rebuilt from a write-ahead log
//!
//! Each mutation is validated against the current state, appended to the log,
//! and only then applied. Mutations run on the blocking pool since every append
//! fsyncs. The store directory is held under an exclusive file lock for as long
//! as the driver is open.

use crate::operation::Operation;
use crate::state::MaterializedState;
use crate::wal::{Wal, WalError};
use async_trait::async_trait;
use fs2::FileExt;
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tally_core::record::ID;
use tally_core::{Criteria, Driver, DriverError, Record, Schema, Table};

/// Log file inside the store directory
pub const WAL_FILE: &str = "wal.jsonl";
/// Lock file inside the store directory
pub const LOCK_FILE: &str = "tally.lock";

impl From<WalError> for DriverError {
    fn from(e: WalError) -> Self {
        DriverError::Backend(e.to_string())
    }
}

/// Result of a compaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionResult {
    /// Entries in the log before compaction
    pub entries_before: u64,
    /// Entries written, one per collection
    pub entries_after: u64,
    pub bytes_reclaimed: u64,
}

struct Inner {
    wal: Wal,
    state: MaterializedState,
    entries: u64,
}

/// Driver persisting collections in a directory
pub struct WalDriver {
    dir: PathBuf,
    inner: Arc<Mutex<Inner>>,
    // Held for the lifetime of the driver; the OS releases the lock on close
    _lock: File,
}

impl WalDriver {
    /// Open or create a store in `dir`, replaying its log
    pub fn open(dir: &Path) -> Result<Self, WalError> {
        std::fs::create_dir_all(dir)?;

        let lock = File::create(dir.join(LOCK_FILE))?;
        lock.try_lock_exclusive()
            .map_err(|_| WalError::Locked(dir.to_path_buf()))?;

        let wal_path = dir.join(WAL_FILE);
        let read = Wal::read(&wal_path)?;
        if let Some(line) = read.corrupted_at {
            // The directory lock is ours, so nothing else is appending
            let removed = Wal::truncate(&wal_path, read.valid_len)?;
            tracing::warn!(line, bytes = removed, "discarded corrupt WAL tail");
        }

        let mut state = MaterializedState::new();
        for entry in &read.entries {
            state.apply(&entry.operation);
        }
        tracing::debug!(
            dir = %dir.display(),
            entries = read.entries.len(),
            collections = state.tables.len(),
            "store opened"
        );

        let wal = Wal::open(&wal_path, read.last_sequence())?;
        Ok(Self {
            dir: dir.to_path_buf(),
            inner: Arc::new(Mutex::new(Inner {
                wal,
                state,
                entries: read.entries.len() as u64,
            })),
            _lock: lock,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    /// Run a mutation against the state on the blocking pool
    async fn write<T, F>(&self, mutation: F) -> Result<T, DriverError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Inner) -> Result<T, DriverError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || mutation(&mut lock(&inner)))
            .await
            .map_err(|e| DriverError::Backend(format!("WAL writer task failed: {e}")))?
    }

    /// Names of all collections, sorted
    pub fn collections(&self) -> Vec<String> {
        let inner = self.inner();
        let mut names: Vec<String> = inner.state.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of entries currently in the log
    pub fn log_len(&self) -> u64 {
        self.inner().entries
    }

    /// Rewrite the log as one snapshot entry per collection
    ///
    /// Snapshots carry each collection's id sequence, so ids handed out after
    /// compaction stay above every id handed out before it.
    pub fn compact(&self) -> Result<CompactionResult, WalError> {
        let mut inner = self.inner();
        let snapshot = inner.state.snapshot();
        let entries_after = snapshot.len() as u64;
        let entries_before = inner.entries;

        let bytes_reclaimed = inner.wal.rewrite(snapshot)?;
        inner.entries = entries_after;

        tracing::info!(entries_before, entries_after, bytes_reclaimed, "WAL compacted");
        Ok(CompactionResult {
            entries_before,
            entries_after,
            bytes_reclaimed,
        })
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

impl Inner {
    /// Log an operation, then apply it
    fn commit(&mut self, op: Operation) -> Result<(), DriverError> {
        self.wal.append(&op)?;
        self.entries += 1;
        self.state.apply(&op);
        Ok(())
    }
}

#[async_trait]
impl Driver for WalDriver {
    fn identity(&self) -> &str {
        "wal"
    }

    async fn define(&self, collection: &str, schema: &Schema) -> Result<(), DriverError> {
        let collection = collection.to_string();
        let schema = schema.clone();
        self.write(move |inner| {
            if inner.state.table(&collection).is_some() {
                return Err(DriverError::CollectionExists(collection));
            }
            inner.commit(Operation::Define { collection, schema })
        })
        .await
    }

    async fn describe(&self, collection: &str) -> Result<Option<Schema>, DriverError> {
        Ok(self.inner().state.table(collection).map(|t| t.schema().clone()))
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), DriverError> {
        let collection = collection.to_string();
        self.write(move |inner| {
            if inner.state.table(&collection).is_none() {
                return Ok(());
            }
            inner.commit(Operation::Drop { collection })
        })
        .await
    }

    async fn alter(&self, collection: &str, schema: &Schema) -> Result<(), DriverError> {
        let collection = collection.to_string();
        let schema = schema.clone();
        self.write(move |inner| {
            if inner.state.table(&collection).is_none() {
                return Err(DriverError::CollectionNotFound(collection));
            }
            inner.commit(Operation::Alter { collection, schema })
        })
        .await
    }

    async fn create(&self, collection: &str, values: Record) -> Result<Record, DriverError> {
        let collection = collection.to_string();
        self.write(move |inner| {
            let record = match inner.state.table(&collection) {
                Some(table) => table.prepare(values)?,
                None => Table::default().prepare(values)?,
            };
            inner.commit(Operation::Insert {
                collection,
                record: record.clone(),
            })?;
            Ok(record)
        })
        .await
    }

    async fn find(&self, collection: &str, criteria: &Criteria) -> Result<Vec<Record>, DriverError> {
        Ok(self
            .inner()
            .state
            .table(collection)
            .map(|table| table.find(criteria))
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: &str,
        criteria: &Criteria,
        values: Record,
    ) -> Result<Vec<Record>, DriverError> {
        let collection = collection.to_string();
        let criteria = criteria.clone();
        self.write(move |inner| {
            let Some(table) = inner.state.table(&collection) else {
                return Ok(Vec::new());
            };
            let records = table.preview_update(&criteria, &values);
            if !records.is_empty() {
                inner.commit(Operation::Replace {
                    collection,
                    records: records.clone(),
                })?;
            }
            Ok(records)
        })
        .await
    }

    async fn destroy(
        &self,
        collection: &str,
        criteria: &Criteria,
    ) -> Result<Vec<Record>, DriverError> {
        let collection = collection.to_string();
        let criteria = criteria.clone();
        self.write(move |inner| {
            let Some(table) = inner.state.table(&collection) else {
                return Ok(Vec::new());
            };
            let removed = table.find(&criteria);
            let ids: Vec<Value> = removed.iter().filter_map(|r| r.get(ID).cloned()).collect();
            if !ids.is_empty() {
                inner.commit(Operation::Delete { collection, ids })?;
            }
            Ok(removed)
        })
        .await
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;

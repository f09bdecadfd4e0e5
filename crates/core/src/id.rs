// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ticket uuids
//!
//! Every lock request carries a uuid that is unique among live tickets. The
//! uuid keys the pending grant and the ledger row, so it must be fixed before
//! the ticket is written.

use crate::ledger::NewTicket;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of request uuids for a coordinator
pub trait IdGen: Clone + Send + Sync + 'static {
    fn next(&self) -> String;

    /// A request for `name` under a fresh uuid
    fn ticket(&self, name: &str) -> NewTicket {
        NewTicket::new(self.next(), name)
    }
}

/// Random v4 uuids
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().hyphenated().to_string()
    }
}

/// `<prefix>-<n>` in request order; clones draw from one counter
#[derive(Clone, Debug)]
pub struct SequentialIdGen {
    prefix: Arc<str>,
    issued: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Arc::from(prefix.into()),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of uuids handed out so far
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("req")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{n}", self.prefix)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;

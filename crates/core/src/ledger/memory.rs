// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic in-memory ledger for tests and single-process use
//!
//! Besides being a correct ledger, it can inject failures and defer the
//! visibility of inserts to reproduce the weak reads the protocol is
//! sensitive to.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Ledger, LedgerError, NewTicket, Ticket, TicketSeq};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// Recorded ledger call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    Insert { uuid: String, name: String },
    ListAll,
    Remove { uuid: String },
}

/// Ledger operation, for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerOp {
    Insert,
    ListAll,
    Remove,
}

#[derive(Debug)]
enum Failure {
    /// Fail without touching state
    Before(String),
    /// Apply the operation, then report failure
    AfterCommit(String),
}

#[derive(Debug)]
struct State {
    visible: Vec<Ticket>,
    deferred: Vec<Ticket>,
    next_id: u64,
    defer_visibility: bool,
    failures: HashMap<LedgerOp, VecDeque<Failure>>,
    calls: Vec<LedgerCall>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            visible: Vec::new(),
            deferred: Vec::new(),
            next_id: 1,
            defer_visibility: false,
            failures: HashMap::new(),
            calls: Vec::new(),
        }
    }
}

impl State {
    fn take_failure(&mut self, op: LedgerOp) -> Option<Failure> {
        self.failures.get_mut(&op).and_then(VecDeque::pop_front)
    }
}

/// In-memory ledger; clones share state
#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<State>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Visible tickets, oldest first
    pub fn tickets(&self) -> Vec<Ticket> {
        let mut tickets = self.state().visible.clone();
        tickets.sort_by_key(|t| t.id);
        tickets
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Make the next call of `op` fail without effect
    pub fn fail_next(&self, op: LedgerOp, message: impl Into<String>) {
        self.state()
            .failures
            .entry(op)
            .or_default()
            .push_back(Failure::Before(message.into()));
    }

    /// Make the next call of `op` take effect but still report failure
    pub fn fail_next_after_commit(&self, op: LedgerOp, message: impl Into<String>) {
        self.state()
            .failures
            .entry(op)
            .or_default()
            .push_back(Failure::AfterCommit(message.into()));
    }

    /// While enabled, inserted tickets stay invisible to `list_all` until
    /// [`publish`](Self::publish) is called. Disabling publishes everything.
    pub fn set_deferred_visibility(&self, enabled: bool) {
        let mut state = self.state();
        state.defer_visibility = enabled;
        if !enabled {
            let deferred = std::mem::take(&mut state.deferred);
            state.visible.extend(deferred);
        }
    }

    /// Make every deferred insert visible
    pub fn publish(&self) {
        let mut state = self.state();
        let deferred = std::mem::take(&mut state.deferred);
        state.visible.extend(deferred);
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, LedgerError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.calls.push(LedgerCall::Insert {
            uuid: ticket.uuid.clone(),
            name: ticket.name.clone(),
        });

        let failure = state.take_failure(LedgerOp::Insert);
        if let Some(Failure::Before(message)) = &failure {
            return Err(LedgerError::Unavailable(message.clone()));
        }

        let exists = state
            .visible
            .iter()
            .chain(state.deferred.iter())
            .any(|t| t.uuid == ticket.uuid);
        if exists {
            return Err(LedgerError::DuplicateUuid(ticket.uuid));
        }

        let stored = Ticket {
            id: TicketSeq(state.next_id),
            uuid: ticket.uuid,
            name: ticket.name,
            created_at: Some(Utc::now()),
        };
        state.next_id += 1;
        if state.defer_visibility {
            state.deferred.push(stored.clone());
        } else {
            state.visible.push(stored.clone());
        }

        match failure {
            Some(Failure::AfterCommit(message)) => Err(LedgerError::Unavailable(message)),
            _ => Ok(stored),
        }
    }

    async fn list_all(&self) -> Result<Vec<Ticket>, LedgerError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.calls.push(LedgerCall::ListAll);

        match state.take_failure(LedgerOp::ListAll) {
            Some(Failure::Before(message)) | Some(Failure::AfterCommit(message)) => {
                Err(LedgerError::Unavailable(message))
            }
            None => Ok(state.visible.clone()),
        }
    }

    async fn remove(&self, uuid: &str) -> Result<(), LedgerError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.calls.push(LedgerCall::Remove {
            uuid: uuid.to_string(),
        });

        let failure = state.take_failure(LedgerOp::Remove);
        if let Some(Failure::Before(message)) = &failure {
            return Err(LedgerError::Unavailable(message.clone()));
        }

        state.visible.retain(|t| t.uuid != uuid);
        state.deferred.retain(|t| t.uuid != uuid);

        match failure {
            Some(Failure::AfterCommit(message)) => Err(LedgerError::Unavailable(message)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

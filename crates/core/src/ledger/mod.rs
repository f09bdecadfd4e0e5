// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock ledger: the shared collection of tickets
//!
//! The ledger is the only shared state of the lock protocol. It offers
//! append, full scan and delete, nothing more. Implementations must:
//! - assign each inserted ticket an id strictly greater than every id
//!   previously assigned by the same ledger
//! - make an insert or remove visible to any `list_all` issued after the
//!   caller observed its completion (read-your-writes)
//! - treat `remove` of an absent uuid as a successful no-op

mod collection;
mod memory;

pub use collection::{ticket_from_record, CollectionLedger, DEFAULT_COLLECTION};
pub use memory::{LedgerCall, LedgerOp, MemoryLedger};

use crate::driver::DriverError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Store-assigned sequence number; the arrival order of tickets
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketSeq(pub u64);

impl std::fmt::Display for TicketSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lock request as written to the ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketSeq,
    pub uuid: String,
    pub name: String,
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Time since insertion, if the ledger recorded it
    pub fn age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.created_at.map(|created| now.signed_duration_since(created))
    }
}

/// A ticket before the ledger has assigned its id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTicket {
    pub uuid: String,
    pub name: String,
}

impl NewTicket {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
        }
    }
}

/// Errors from ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    #[error("ticket already exists: {0}")]
    DuplicateUuid(String),
    #[error("malformed ticket record: {0}")]
    Malformed(String),
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),
}

/// Append/scan/delete store of tickets
#[async_trait]
pub trait Ledger: Send + Sync + 'static {
    /// Append a ticket and return it with its assigned id
    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, LedgerError>;

    /// All live tickets, in no particular order
    async fn list_all(&self) -> Result<Vec<Ticket>, LedgerError>;

    /// Delete the ticket with this uuid, if present
    async fn remove(&self, uuid: &str) -> Result<(), LedgerError>;
}

#[async_trait]
impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, LedgerError> {
        (**self).insert(ticket).await
    }

    async fn list_all(&self) -> Result<Vec<Ticket>, LedgerError> {
        (**self).list_all().await
    }

    async fn remove(&self, uuid: &str) -> Result<(), LedgerError> {
        (**self).remove(uuid).await
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::ledger::LedgerError;
use thiserror::Error;

/// Errors surfaced by lock acquisition and release
#[derive(Debug, Error)]
pub enum CoordinationError {
    /// The ticket could not be written; no ticket is assumed live
    #[error("failed to insert ticket for lock {name}: {source}")]
    Insert { name: String, source: LedgerError },
    /// The ledger could not be scanned; the ticket is in an indeterminate state
    #[error("failed to scan ledger for lock {name} (ticket {uuid}): {source}")]
    Scan {
        name: String,
        uuid: String,
        source: LedgerError,
    },
    /// The ticket could not be removed; the lock stays blocked until cleared
    #[error("failed to remove ticket {uuid} of lock {name}: {source}")]
    Remove {
        name: String,
        uuid: String,
        source: LedgerError,
    },
    #[error("coordinator dropped before ticket {uuid} of lock {name} was granted")]
    Abandoned { name: String, uuid: String },
}

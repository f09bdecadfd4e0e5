// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tally-core: named mutual exclusion over a shared record store
//!
//! This crate provides:
//! - A ticket ledger trait with in-memory and driver-backed implementations
//! - A coordinator granting named locks in ticket order
//! - A storage driver contract and a record store with named transactions

pub mod config;
pub mod coordination;
pub mod criteria;
pub mod driver;
pub mod id;
pub mod ledger;
pub mod record;
pub mod store;

pub use config::{ConfigError, CoordinatorConfig, StoreConfig, TallyConfig};
pub use coordination::{Acquisition, CoordinationError, Coordinator, LockEvent, LockHandle, Release};
pub use criteria::{Criteria, CriteriaError, Direction, IntoCriteria, Sort};
pub use driver::{Driver, DriverError, MemoryDriver, Table};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use ledger::{
    CollectionLedger, Ledger, LedgerCall, LedgerError, LedgerOp, MemoryLedger, NewTicket, Ticket,
    TicketSeq, DEFAULT_COLLECTION,
};
pub use record::{Attribute, AttributeSpec, Definition, Record, Schema};
pub use store::{Store, StoreError, SyncMode, Transaction};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable storage driver backed by a write-ahead log

mod driver;
mod entry;
mod operation;
mod state;
mod wal;

pub use driver::{CompactionResult, WalDriver, LOCK_FILE, WAL_FILE};
pub use entry::WalEntry;
pub use operation::Operation;
pub use state::MaterializedState;
pub use wal::{Wal, WalError, WalRead};

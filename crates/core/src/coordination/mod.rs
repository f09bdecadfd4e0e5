// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named mutual exclusion over a ticket ledger
//!
//! This module provides:
//! - **Coordinator** - acquire, release and hand-off of named locks
//! - **Queue rules** - pure conflict and next-in-line evaluation over a scan
//! - **LockEvent** - observable lifecycle of tickets

mod coordinator;
mod error;
mod event;
mod handle;
pub mod queue;

pub use coordinator::Coordinator;
pub use error::CoordinationError;
pub use event::LockEvent;
pub use handle::{Acquisition, LockHandle, Release};

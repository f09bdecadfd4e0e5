// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observable lock lifecycle events

use crate::ledger::TicketSeq;
use std::time::Duration;

/// Broadcast by a coordinator as its tickets move through their lifecycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockEvent {
    /// A ticket was written but an older ticket holds the name
    Queued {
        name: String,
        uuid: String,
        id: TicketSeq,
        behind: String,
    },
    /// A ticket became the holder
    Granted {
        name: String,
        uuid: String,
        id: TicketSeq,
        /// Granted by the release of the previous holder rather than on request
        handed_off: bool,
    },
    /// A holder's ticket was removed from the ledger
    Released {
        name: String,
        uuid: String,
        id: TicketSeq,
        next: Option<String>,
    },
    /// A holder exceeded the warning threshold; advisory only
    HeldTooLong {
        name: String,
        uuid: String,
        threshold: Duration,
    },
    /// A ticket was granted while other tickets of the same name were held
    RaceDetected {
        name: String,
        uuid: String,
        holders: Vec<String>,
    },
}

impl LockEvent {
    /// The lock name this event concerns
    pub fn name(&self) -> &str {
        match self {
            LockEvent::Queued { name, .. }
            | LockEvent::Granted { name, .. }
            | LockEvent::Released { name, .. }
            | LockEvent::HeldTooLong { name, .. }
            | LockEvent::RaceDetected { name, .. } => name,
        }
    }
}

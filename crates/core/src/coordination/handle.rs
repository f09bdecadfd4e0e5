// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handles returned to lock requesters

use super::{CoordinationError, Coordinator};
use crate::id::{IdGen, UuidIdGen};
use crate::ledger::{Ledger, Ticket};
use tokio::sync::oneshot;

/// A written ticket waiting to be granted
///
/// Dropping an acquisition does not withdraw the ticket. When its turn comes
/// the grant finds nobody listening and the lock is released on the spot.
pub struct Acquisition<L: Ledger, G: IdGen = UuidIdGen> {
    ticket: Ticket,
    receiver: oneshot::Receiver<LockHandle<L, G>>,
}

impl<L: Ledger, G: IdGen> Acquisition<L, G> {
    pub(crate) fn new(ticket: Ticket, receiver: oneshot::Receiver<LockHandle<L, G>>) -> Self {
        Self { ticket, receiver }
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    /// Wait until this ticket becomes the holder
    pub async fn granted(self) -> Result<LockHandle<L, G>, CoordinationError> {
        let Acquisition { ticket, receiver } = self;
        receiver.await.map_err(|_| CoordinationError::Abandoned {
            name: ticket.name,
            uuid: ticket.uuid,
        })
    }

    /// The handle, if the ticket has been granted already
    pub fn try_granted(&mut self) -> Option<LockHandle<L, G>> {
        self.receiver.try_recv().ok()
    }
}

impl<L: Ledger, G: IdGen> std::fmt::Debug for Acquisition<L, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Acquisition")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// Exclusive hold on a named lock
///
/// Release with [`release`](Self::release). A handle dropped without release
/// schedules its own release on the current Tokio runtime; outside a runtime
/// the ticket is left behind as an orphan.
pub struct LockHandle<L: Ledger, G: IdGen = UuidIdGen> {
    coordinator: Coordinator<L, G>,
    ticket: Ticket,
    released: bool,
}

impl<L: Ledger, G: IdGen> LockHandle<L, G> {
    pub(crate) fn new(coordinator: Coordinator<L, G>, ticket: Ticket) -> Self {
        Self {
            coordinator,
            ticket,
            released: false,
        }
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn name(&self) -> &str {
        &self.ticket.name
    }

    /// Remove the ticket and hand the lock to the next ticket in line
    pub async fn release(mut self) -> Result<Release, CoordinationError> {
        self.released = true;
        self.coordinator.release_ticket(&self.ticket).await
    }
}

impl<L: Ledger, G: IdGen> std::fmt::Debug for LockHandle<L, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockHandle")
            .field("ticket", &self.ticket)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl<L: Ledger, G: IdGen> Drop for LockHandle<L, G> {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let name = self.ticket.name.clone();
        let uuid = self.ticket.uuid.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                tracing::warn!(%name, %uuid, "lock handle dropped without release, releasing");
                let coordinator = self.coordinator.clone();
                let ticket = self.ticket.clone();
                runtime.spawn(async move {
                    if let Err(e) = coordinator.release_ticket(&ticket).await {
                        tracing::error!(%name, %uuid, error = %e, "release of dropped lock handle failed");
                    }
                });
            }
            Err(_) => {
                tracing::error!(%name, %uuid, "lock handle dropped outside a runtime, ticket orphaned");
            }
        }
    }
}

/// Outcome of a release
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Release {
    pub ticket: Ticket,
    /// The queued ticket this release granted, if any
    pub handed_off_to: Option<Ticket>,
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ticket-queue mutex coordinated through a ledger
//!
//! Acquisition appends a ticket, scans the ledger and grants the lock if no
//! older ticket of the same name is live. Otherwise the ticket waits in the
//! ledger; nothing polls. Whoever releases the lock scans the ledger, removes
//! its ticket and grants the next ticket in line.
//!
//! Grant decisions come from ledger scans only. The coordinator keeps three
//! in-process tables that never feed a decision:
//! - pending grants: the completion channel of every ticket this coordinator
//!   wrote and has not granted yet, keyed by uuid. Resolving an entry removes
//!   it, so a ticket is granted at most once even when its own scan and a
//!   hand-off race.
//! - holds: the tickets this coordinator granted and has not released, with
//!   their long-hold warning timers.
//! - the event broadcast.
//!
//! Known race: the insert and the scan are not atomic. On a ledger that does
//! not honor read-your-writes, two requesters can both see no older ticket
//! and both be granted. This is not prevented; when both grants happen in the
//! same coordinator it is detected and reported as
//! [`LockEvent::RaceDetected`].

use super::queue;
use super::{Acquisition, CoordinationError, LockEvent, LockHandle, Release};
use crate::config::CoordinatorConfig;
use crate::id::{IdGen, UuidIdGen};
use crate::ledger::{Ledger, Ticket};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct Hold {
    name: String,
    granted_at: Instant,
    warning: JoinHandle<()>,
}

struct Shared<L: Ledger, G: IdGen> {
    ledger: L,
    ids: G,
    config: CoordinatorConfig,
    pending: Mutex<HashMap<String, oneshot::Sender<LockHandle<L, G>>>>,
    holds: Mutex<HashMap<String, Hold>>,
    events: broadcast::Sender<LockEvent>,
}

/// Grants and releases named locks; clones share all state
pub struct Coordinator<L: Ledger, G: IdGen = UuidIdGen> {
    shared: Arc<Shared<L, G>>,
}

impl<L: Ledger, G: IdGen> Clone for Coordinator<L, G> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<L: Ledger> Coordinator<L, UuidIdGen> {
    pub fn new(ledger: L, config: CoordinatorConfig) -> Self {
        Self::with_id_gen(ledger, config, UuidIdGen)
    }
}

impl<L: Ledger, G: IdGen> Coordinator<L, G> {
    pub fn with_id_gen(ledger: L, config: CoordinatorConfig, ids: G) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                ledger,
                ids,
                config,
                pending: Mutex::new(HashMap::new()),
                holds: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    pub fn ledger(&self) -> &L {
        &self.shared.ledger
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.shared.config
    }

    /// Receive lock events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LockEvent> {
        self.shared.events.subscribe()
    }

    /// Tickets written by this coordinator and not granted yet
    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    /// Tickets granted by this coordinator and not released yet
    pub fn held_count(&self) -> usize {
        self.holds().len()
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<String, oneshot::Sender<LockHandle<L, G>>>> {
        self.shared.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn holds(&self) -> MutexGuard<'_, HashMap<String, Hold>> {
        self.shared.holds.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: LockEvent) {
        // No subscribers is fine
        let _ = self.shared.events.send(event);
    }

    /// Request the lock `name`
    ///
    /// Returns once the ticket is written and checked. The returned
    /// [`Acquisition`] is already granted if no older ticket was live;
    /// otherwise it resolves when the ticket ahead of it is released.
    pub async fn acquire(&self, name: &str) -> Result<Acquisition<L, G>, CoordinationError> {
        let request = self.shared.ids.ticket(name);
        let uuid = request.uuid.clone();
        let (sender, receiver) = oneshot::channel();
        // Registered before the insert: a hand-off can arrive as soon as the ticket is visible
        self.pending().insert(uuid.clone(), sender);

        let ticket = match self.shared.ledger.insert(request).await {
            Ok(ticket) => ticket,
            Err(source) => {
                self.pending().remove(&uuid);
                tracing::error!(name, %uuid, error = %source, "ticket insert failed");
                return Err(CoordinationError::Insert {
                    name: name.to_string(),
                    source,
                });
            }
        };

        let tickets = match self.shared.ledger.list_all().await {
            Ok(tickets) => tickets,
            Err(source) => {
                self.pending().remove(&uuid);
                tracing::warn!(
                    name,
                    %uuid,
                    id = %ticket.id,
                    error = %source,
                    "ledger scan failed, ticket left in an indeterminate state"
                );
                return Err(CoordinationError::Scan {
                    name: name.to_string(),
                    uuid,
                    source,
                });
            }
        };

        match queue::find_conflict(&tickets, &ticket) {
            None => {
                self.grant(ticket.clone(), false);
            }
            Some(ahead) => {
                tracing::debug!(
                    name,
                    %uuid,
                    id = %ticket.id,
                    behind = %ahead.uuid,
                    behind_id = %ahead.id,
                    "lock busy, queued"
                );
                self.emit(LockEvent::Queued {
                    name: name.to_string(),
                    uuid,
                    id: ticket.id,
                    behind: ahead.uuid.clone(),
                });
            }
        }

        Ok(Acquisition::new(ticket, receiver))
    }

    /// Request the lock `name` and wait until it is granted
    pub async fn lock(&self, name: &str) -> Result<LockHandle<L, G>, CoordinationError> {
        self.acquire(name).await?.granted().await
    }

    /// Release a granted lock and hand it to the next ticket in line
    ///
    /// Only the holder can release, since releasing consumes its handle. A
    /// queued ticket cannot be released in its place:
    ///
    /// ```compile_fail
    /// # async fn release_queued(coordinator: tally_core::Coordinator<tally_core::MemoryLedger>) {
    /// let queued = coordinator.acquire("A").await.unwrap();
    /// coordinator.release(queued.ticket()).await.unwrap();
    /// # }
    /// ```
    pub async fn release(&self, handle: LockHandle<L, G>) -> Result<Release, CoordinationError> {
        handle.release().await
    }

    /// Remove `ticket` and hand the lock to the next ticket in line
    ///
    /// Releasing a ticket that is no longer in the ledger removes nothing and
    /// grants nothing.
    pub(crate) async fn release_ticket(&self, ticket: &Ticket) -> Result<Release, CoordinationError> {
        let held_for = self.end_hold(&ticket.uuid);

        let tickets = self.scan_for_release(ticket).await?;
        let live = tickets.iter().any(|t| t.uuid == ticket.uuid);
        let mut next = if live {
            queue::next_in_line(&tickets, ticket).cloned()
        } else {
            None
        };

        if let Err(source) = self.shared.ledger.remove(&ticket.uuid).await {
            tracing::error!(
                name = %ticket.name,
                uuid = %ticket.uuid,
                error = %source,
                "ticket remove failed, lock blocked until the ticket is cleared"
            );
            return Err(CoordinationError::Remove {
                name: ticket.name.clone(),
                uuid: ticket.uuid.clone(),
                source,
            });
        }

        if !live {
            tracing::debug!(name = %ticket.name, uuid = %ticket.uuid, "ticket already released");
            return Ok(Release {
                ticket: ticket.clone(),
                handed_off_to: None,
            });
        }

        if next.is_none() {
            // A ticket written between the scan and the remove may have seen
            // ours and queued behind it
            let tickets = self.scan_for_release(ticket).await?;
            next = queue::next_in_line(&tickets, ticket).cloned();
        }

        tracing::info!(
            name = %ticket.name,
            uuid = %ticket.uuid,
            id = %ticket.id,
            held_ms = held_for.map(|d| d.as_millis() as u64),
            next = next.as_ref().map(|t| t.uuid.as_str()),
            "lock released"
        );
        self.emit(LockEvent::Released {
            name: ticket.name.clone(),
            uuid: ticket.uuid.clone(),
            id: ticket.id,
            next: next.as_ref().map(|t| t.uuid.clone()),
        });

        let handed_off_to = next.filter(|next| {
            let granted = self.grant(next.clone(), true);
            if !granted {
                tracing::debug!(
                    name = %next.name,
                    next = %next.uuid,
                    "next ticket has no pending request here, already granted or owned elsewhere"
                );
            }
            granted
        });

        Ok(Release {
            ticket: ticket.clone(),
            handed_off_to,
        })
    }

    async fn scan_for_release(&self, ticket: &Ticket) -> Result<Vec<Ticket>, CoordinationError> {
        self.shared.ledger.list_all().await.map_err(|source| {
            tracing::error!(
                name = %ticket.name,
                uuid = %ticket.uuid,
                error = %source,
                "ledger scan failed during release"
            );
            CoordinationError::Scan {
                name: ticket.name.clone(),
                uuid: ticket.uuid.clone(),
                source,
            }
        })
    }

    /// Resolve the pending request for `ticket`; false if there is none
    fn grant(&self, ticket: Ticket, handed_off: bool) -> bool {
        let Some(sender) = self.pending().remove(&ticket.uuid) else {
            return false;
        };

        let holders: Vec<String> = self
            .holds()
            .iter()
            .filter(|(_, hold)| hold.name == ticket.name)
            .map(|(uuid, _)| uuid.clone())
            .collect();
        if !holders.is_empty() {
            tracing::error!(
                name = %ticket.name,
                uuid = %ticket.uuid,
                ?holders,
                "lock granted while already held, ledger reads are not consistent"
            );
            self.emit(LockEvent::RaceDetected {
                name: ticket.name.clone(),
                uuid: ticket.uuid.clone(),
                holders,
            });
        }

        let warning = self.arm_warning(&ticket);
        self.holds().insert(
            ticket.uuid.clone(),
            Hold {
                name: ticket.name.clone(),
                granted_at: Instant::now(),
                warning,
            },
        );

        tracing::info!(
            name = %ticket.name,
            uuid = %ticket.uuid,
            id = %ticket.id,
            handed_off,
            "lock granted"
        );
        self.emit(LockEvent::Granted {
            name: ticket.name.clone(),
            uuid: ticket.uuid.clone(),
            id: ticket.id,
            handed_off,
        });

        if sender.send(LockHandle::new(self.clone(), ticket)).is_err() {
            // The returned handle is dropped here, which releases it
            tracing::debug!("requester went away before the grant");
        }
        true
    }

    fn arm_warning(&self, ticket: &Ticket) -> JoinHandle<()> {
        let threshold = self.shared.config.warning_threshold;
        let events = self.shared.events.clone();
        let name = ticket.name.clone();
        let uuid = ticket.uuid.clone();

        tokio::spawn(async move {
            tokio::time::sleep(threshold).await;
            tracing::warn!(
                %name,
                %uuid,
                threshold_ms = threshold.as_millis() as u64,
                "lock is taking an abnormally long time"
            );
            let _ = events.send(LockEvent::HeldTooLong {
                name,
                uuid,
                threshold,
            });
        })
    }

    /// Forget a hold and cancel its warning; returns how long it was held
    fn end_hold(&self, uuid: &str) -> Option<Duration> {
        let hold = self.holds().remove(uuid)?;
        hold.warning.abort();
        Some(hold.granted_at.elapsed())
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;

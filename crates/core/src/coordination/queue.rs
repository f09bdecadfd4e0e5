// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue rules evaluated over a ledger scan
//!
//! For every name, live tickets form a queue ordered by id. The head of the
//! queue is the holder.

use crate::ledger::Ticket;

/// The oldest ticket `ticket` has to wait for, if any
pub fn find_conflict<'a>(tickets: &'a [Ticket], ticket: &Ticket) -> Option<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| t.name == ticket.name && t.uuid != ticket.uuid && t.id < ticket.id)
        .min_by_key(|t| t.id)
}

/// The ticket that takes over once `ticket` is gone
pub fn next_in_line<'a>(tickets: &'a [Ticket], ticket: &Ticket) -> Option<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| t.name == ticket.name && t.uuid != ticket.uuid)
        .min_by_key(|t| t.id)
}

/// The head of the queue for `name`
pub fn holder<'a>(tickets: &'a [Ticket], name: &str) -> Option<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| t.name == name)
        .min_by_key(|t| t.id)
}

/// The whole queue for `name`, head first
pub fn queue_for<'a>(tickets: &'a [Ticket], name: &str) -> Vec<&'a Ticket> {
    let mut queue: Vec<&Ticket> = tickets.iter().filter(|t| t.name == name).collect();
    queue.sort_by_key(|t| t.id);
    queue
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

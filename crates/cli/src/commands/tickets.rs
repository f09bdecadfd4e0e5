// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ticket commands

use crate::output::{self, format_age, OutputFormat};
use crate::CliStore;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tally_adapters::TracedLedger;
use tally_core::coordination::queue;
use tally_core::{Ledger, LedgerError, Ticket};

#[derive(Subcommand)]
pub enum TicketsCommand {
    /// List live tickets, oldest first
    List {
        /// Only tickets for this lock name
        #[arg(long)]
        name: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List tickets older than a threshold
    Orphans {
        /// Minimum age, e.g. "30s" or "5m"
        #[arg(long, value_parser = humantime::parse_duration, default_value = "1m")]
        older_than: Duration,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Remove tickets left behind by crashed holders
    Clear {
        /// Ticket uuids to remove
        #[arg(required_unless_present = "name")]
        uuids: Vec<String>,
        /// Remove every ticket for this lock name
        #[arg(long, conflicts_with = "uuids")]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketState {
    Holding,
    Waiting,
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketState::Holding => write!(f, "holding"),
            TicketState::Waiting => write!(f, "waiting"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketRow {
    pub id: u64,
    pub uuid: String,
    pub name: String,
    pub state: TicketState,
    pub age_secs: Option<u64>,
}

impl fmt::Display for TicketRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let age = format_age(self.age_secs.map(Duration::from_secs));
        write!(
            f,
            "{:<6} {:<20} {:<8} {:<8} {}",
            self.id, self.name, self.state, age, self.uuid
        )
    }
}

/// What `clear` removed, and which uuids had no ticket
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ClearOutcome {
    pub removed: Vec<Ticket>,
    pub missing: Vec<String>,
}

pub async fn handle(store: &CliStore, command: TicketsCommand) -> anyhow::Result<()> {
    let ledger = TracedLedger::new(store.coordinator().ledger().clone());
    let now = Utc::now();

    match command {
        TicketsCommand::List { name, json } => {
            let rows = list(&ledger, name.as_deref(), now).await?;
            output::print_list(&rows, OutputFormat::from_json_flag(json), "No tickets");
        }
        TicketsCommand::Orphans { older_than, json } => {
            let rows = orphans(&ledger, older_than, now).await?;
            output::print_list(&rows, OutputFormat::from_json_flag(json), "No orphaned tickets");
        }
        TicketsCommand::Clear { uuids, name } => {
            let outcome = clear(&ledger, &uuids, name.as_deref()).await?;
            for ticket in &outcome.removed {
                println!("Removed {} ({} #{})", ticket.uuid, ticket.name, ticket.id);
            }
            for uuid in &outcome.missing {
                println!("No ticket {}", uuid);
            }
            println!("{} ticket(s) removed", outcome.removed.len());
        }
    }

    Ok(())
}

/// Live tickets oldest first, each marked holding or waiting
pub async fn list<L: Ledger>(
    ledger: &L,
    name: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Vec<TicketRow>, LedgerError> {
    let tickets = ledger.list_all().await?;
    let mut rows = rows(&tickets, now);
    if let Some(name) = name {
        rows.retain(|row| row.name == name);
    }
    Ok(rows)
}

/// Tickets at least `older_than` old; tickets of unknown age are included
pub async fn orphans<L: Ledger>(
    ledger: &L,
    older_than: Duration,
    now: DateTime<Utc>,
) -> Result<Vec<TicketRow>, LedgerError> {
    let mut rows = list(ledger, None, now).await?;
    rows.retain(|row| match row.age_secs {
        Some(age) => age >= older_than.as_secs(),
        None => true,
    });
    Ok(rows)
}

/// Remove tickets by uuid, or every ticket for `name`
///
/// Removal does not wake anyone: waiters belong to processes that are gone.
pub async fn clear<L: Ledger>(
    ledger: &L,
    uuids: &[String],
    name: Option<&str>,
) -> Result<ClearOutcome, LedgerError> {
    let tickets = ledger.list_all().await?;
    let mut outcome = ClearOutcome::default();

    let targets: Vec<&Ticket> = match name {
        Some(name) => queue::queue_for(&tickets, name),
        None => {
            let mut targets = Vec::new();
            for uuid in uuids {
                match tickets.iter().find(|t| &t.uuid == uuid) {
                    Some(ticket) => targets.push(ticket),
                    None => outcome.missing.push(uuid.clone()),
                }
            }
            targets
        }
    };

    for ticket in targets {
        ledger.remove(&ticket.uuid).await?;
        tracing::info!(name = %ticket.name, uuid = %ticket.uuid, id = %ticket.id, "ticket cleared");
        outcome.removed.push(ticket.clone());
    }

    Ok(outcome)
}

fn rows(tickets: &[Ticket], now: DateTime<Utc>) -> Vec<TicketRow> {
    let mut sorted: Vec<&Ticket> = tickets.iter().collect();
    sorted.sort_by_key(|t| t.id);

    sorted
        .into_iter()
        .map(|ticket| {
            let holding = queue::holder(tickets, &ticket.name).is_some_and(|h| h.uuid == ticket.uuid);
            TicketRow {
                id: ticket.id.0,
                uuid: ticket.uuid.clone(),
                name: ticket.name.clone(),
                state: if holding {
                    TicketState::Holding
                } else {
                    TicketState::Waiting
                },
                // A createdAt ahead of `now` is clock skew, not an unknown age
                age_secs: ticket
                    .age(now)
                    .map(|age| age.to_std().unwrap_or_default().as_secs()),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "tickets_tests.rs"]
mod tests;

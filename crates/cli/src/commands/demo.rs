// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process contention run

use crate::CliStore;
use anyhow::bail;
use clap::Args;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tally_core::{Driver, Store, StoreError};
use tokio::sync::mpsc;

#[derive(Args)]
pub struct DemoArgs {
    /// Number of contending workers
    #[arg(long, default_value_t = 4)]
    pub workers: usize,
    /// Lock name the workers contend for
    #[arg(long, default_value = "demo")]
    pub name: String,
    /// How long each worker holds the lock
    #[arg(long, value_parser = humantime::parse_duration, default_value = "50ms")]
    pub hold: Duration,
}

/// One worker's turn holding the lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub worker: usize,
    pub ticket: u64,
    pub waited_ms: u64,
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "worker {:<3} ticket {:<6} waited {}ms",
            self.worker, self.ticket, self.waited_ms
        )
    }
}

pub async fn handle(store: &CliStore, args: DemoArgs) -> anyhow::Result<()> {
    let grants = run(store, args.workers, &args.name, args.hold).await?;
    for grant in &grants {
        println!("{}", grant);
    }

    if !in_ticket_order(&grants) {
        bail!("grants out of ticket order");
    }
    println!("{} grants in ticket order", grants.len());
    Ok(())
}

/// Spawn `workers` tasks that each take `name` for `hold`, returning grants
/// in the order they happened
pub async fn run<D: Driver>(
    store: &Store<D>,
    workers: usize,
    name: &str,
    hold: Duration,
) -> Result<Vec<Grant>, StoreError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut tasks = Vec::with_capacity(workers);

    for worker in 0..workers {
        let store = store.clone();
        let name = name.to_string();
        let tx = tx.clone();
        tasks.push(tokio::spawn(async move {
            let start = Instant::now();
            let transaction = store.transaction(&name).await?;
            // Sent while holding, so the channel sees grants in order
            let _ = tx.send(Grant {
                worker,
                ticket: transaction.ticket().id.0,
                waited_ms: start.elapsed().as_millis() as u64,
            });
            tokio::time::sleep(hold).await;
            transaction.release().await?;
            Ok::<_, StoreError>(())
        }));
    }
    drop(tx);

    for task in tasks {
        match task.await {
            Ok(result) => result?,
            Err(e) => tracing::error!(error = %e, "demo worker panicked"),
        }
    }

    let mut grants = Vec::with_capacity(workers);
    while let Some(grant) = rx.recv().await {
        grants.push(grant);
    }
    Ok(grants)
}

pub fn in_ticket_order(grants: &[Grant]) -> bool {
    grants.windows(2).all(|pair| pair[0].ticket < pair[1].ticket)
}

#[cfg(test)]
#[path = "demo_tests.rs"]
mod tests;

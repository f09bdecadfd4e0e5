// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tally - named locks over a durable record store

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{compact, demo, tickets};
use std::path::PathBuf;
use std::sync::Arc;
use tally_adapters::TracedDriver;
use tally_core::{Store, TallyConfig};
use tally_storage::WalDriver;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Config file looked up inside the store directory
const CONFIG_FILE: &str = "tally.toml";

#[derive(Parser)]
#[command(name = "tally", version, about = "Tally - named locks over a shared record store")]
struct Cli {
    /// Store directory
    #[arg(long, global = true, env = "TALLY_STORE")]
    store: Option<PathBuf>,

    /// Config file (default: <store>/tally.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and clear lock tickets
    Tickets {
        #[command(subcommand)]
        command: tickets::TicketsCommand,
    },
    /// Run workers contending for one lock
    Demo(demo::DemoArgs),
    /// Compact the write-ahead log
    Compact,
}

/// The store every command works against
pub type CliStore = Store<TracedDriver<WalDriver>>;

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    let dir = store_dir(cli.store)?;
    let config_path = cli.config.unwrap_or_else(|| dir.join(CONFIG_FILE));
    let config = TallyConfig::load_or_default(&config_path)?;

    let store = open_store(dir, config).await?;

    match cli.command {
        Commands::Tickets { command } => tickets::handle(&store, command).await?,
        Commands::Demo(args) => demo::handle(&store, args).await?,
        Commands::Compact => compact::handle(&store)?,
    }

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn store_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let data = dirs::data_dir().context("no data directory on this platform; pass --store")?;
    Ok(data.join("tally"))
}

async fn open_store(dir: PathBuf, config: TallyConfig) -> Result<CliStore> {
    let driver = WalDriver::open(&dir)
        .with_context(|| format!("failed to open store at {}", dir.display()))?;
    let store = Store::from_config(Arc::new(TracedDriver::new(driver)), config);
    store.initialize().await?;
    Ok(store)
}

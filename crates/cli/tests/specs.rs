//! Behavioral specifications for the tally CLI.
//!
//! These tests are black-box: they invoke the CLI binary and verify
//! stdout, stderr, and exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

// tickets/
#[path = "specs/tickets/clear.rs"]
mod tickets_clear;
#[path = "specs/tickets/list.rs"]
mod tickets_list;

// store/
#[path = "specs/store/compact.rs"]
mod store_compact;
#[path = "specs/store/demo.rs"]
mod store_demo;

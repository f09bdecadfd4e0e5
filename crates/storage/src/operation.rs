// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL operation types
//!
//! Every mutation of a [`WalDriver`](crate::WalDriver) is logged as one
//! operation, already resolved: inserts carry their assigned id and updates
//! carry the full rows they produce, so replay never re-runs a query.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_core::{Record, Schema, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Define {
        collection: String,
        schema: Schema,
    },
    Alter {
        collection: String,
        schema: Schema,
    },
    Drop {
        collection: String,
    },
    Insert {
        collection: String,
        record: Record,
    },
    /// Rows replaced whole, matched by id
    Replace {
        collection: String,
        records: Vec<Record>,
    },
    Delete {
        collection: String,
        ids: Vec<Value>,
    },
    /// A whole collection, including its id sequence; written by compaction
    Restore {
        collection: String,
        table: Table,
    },
}

impl Operation {
    pub fn collection(&self) -> &str {
        match self {
            Operation::Define { collection, .. }
            | Operation::Alter { collection, .. }
            | Operation::Drop { collection }
            | Operation::Insert { collection, .. }
            | Operation::Replace { collection, .. }
            | Operation::Delete { collection, .. }
            | Operation::Restore { collection, .. } => collection,
        }
    }
}

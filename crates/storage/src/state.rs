// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use crate::operation::Operation;
use std::collections::HashMap;
use tally_core::Table;

/// Collections as of the last applied operation
#[derive(Debug, Default)]
pub struct MaterializedState {
    pub tables: HashMap<String, Table>,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, collection: &str) -> Option<&Table> {
        self.tables.get(collection)
    }

    /// Apply an operation to update the state
    ///
    /// Operations are validated before they are logged, so applying never
    /// fails; on replay a row for an unknown collection defines it implicitly.
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::Define { collection, schema } => {
                self.tables
                    .insert(collection.clone(), Table::new(schema.clone()));
            }

            Operation::Alter { collection, schema } => {
                self.tables
                    .entry(collection.clone())
                    .or_default()
                    .set_schema(schema.clone());
            }

            Operation::Drop { collection } => {
                self.tables.remove(collection);
            }

            Operation::Insert { collection, record } => {
                self.tables
                    .entry(collection.clone())
                    .or_default()
                    .restore(record.clone());
            }

            Operation::Replace {
                collection,
                records,
            } => {
                if let Some(table) = self.tables.get_mut(collection) {
                    table.replace(records);
                }
            }

            Operation::Delete { collection, ids } => {
                if let Some(table) = self.tables.get_mut(collection) {
                    table.remove_ids(ids);
                }
            }

            Operation::Restore { collection, table } => {
                self.tables.insert(collection.clone(), table.clone());
            }
        }
    }

    /// Operations that rebuild this state from nothing, in collection order
    pub fn snapshot(&self) -> Vec<Operation> {
        let mut names: Vec<&String> = self.tables.keys().collect();
        names.sort();
        names
            .into_iter()
            .filter_map(|name| {
                self.tables.get(name).map(|table| Operation::Restore {
                    collection: name.clone(),
                    table: table.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

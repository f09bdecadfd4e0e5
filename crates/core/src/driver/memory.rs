// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory storage driver

use super::{Driver, DriverError, Table};
use crate::criteria::Criteria;
use crate::record::{Record, Schema};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Volatile driver holding every collection in process memory
///
/// Clones share the same collections. Creating into an undefined collection
/// defines it with an empty schema.
#[derive(Clone, Default)]
pub struct MemoryDriver {
    tables: Arc<Mutex<HashMap<String, Table>>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, HashMap<String, Table>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of a collection's rows in insertion order
    pub fn rows(&self, collection: &str) -> Vec<Record> {
        self.tables()
            .get(collection)
            .map(|table| table.rows().to_vec())
            .unwrap_or_default()
    }

    /// Names of all defined collections, sorted
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    fn identity(&self) -> &str {
        "memory"
    }

    async fn define(&self, collection: &str, schema: &Schema) -> Result<(), DriverError> {
        let mut tables = self.tables();
        if tables.contains_key(collection) {
            return Err(DriverError::CollectionExists(collection.to_string()));
        }
        tables.insert(collection.to_string(), Table::new(schema.clone()));
        Ok(())
    }

    async fn describe(&self, collection: &str) -> Result<Option<Schema>, DriverError> {
        Ok(self.tables().get(collection).map(|t| t.schema().clone()))
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), DriverError> {
        self.tables().remove(collection);
        Ok(())
    }

    async fn alter(&self, collection: &str, schema: &Schema) -> Result<(), DriverError> {
        match self.tables().get_mut(collection) {
            Some(table) => {
                table.set_schema(schema.clone());
                Ok(())
            }
            None => Err(DriverError::CollectionNotFound(collection.to_string())),
        }
    }

    async fn create(&self, collection: &str, values: Record) -> Result<Record, DriverError> {
        self.tables()
            .entry(collection.to_string())
            .or_default()
            .insert(values)
    }

    async fn find(&self, collection: &str, criteria: &Criteria) -> Result<Vec<Record>, DriverError> {
        Ok(self
            .tables()
            .get(collection)
            .map(|table| table.find(criteria))
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: &str,
        criteria: &Criteria,
        values: Record,
    ) -> Result<Vec<Record>, DriverError> {
        Ok(self
            .tables()
            .get_mut(collection)
            .map(|table| table.update(criteria, &values))
            .unwrap_or_default())
    }

    async fn destroy(
        &self,
        collection: &str,
        criteria: &Criteria,
    ) -> Result<Vec<Record>, DriverError> {
        Ok(self
            .tables()
            .get_mut(collection)
            .map(|table| table.destroy(criteria))
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

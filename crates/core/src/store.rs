// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record store over a storage driver
//!
//! A [`Store`] normalizes criteria, maintains timestamps and default primary
//! keys, and provides named transactions backed by a ticket collection that
//! lives in the same driver as the application's data.

use crate::config::{CoordinatorConfig, StoreConfig, TallyConfig};
use crate::coordination::{CoordinationError, Coordinator, LockHandle};
use crate::criteria::{Criteria, CriteriaError, IntoCriteria};
use crate::driver::{Driver, DriverError};
use crate::ledger::{CollectionLedger, LedgerError};
use crate::record::{Attribute, Definition, Record, Schema, CREATED_AT, ID, UPDATED_AT};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    InvalidCriteria(#[from] CriteriaError),
    #[error("trying to define a collection ({0}) which already exists")]
    AlreadyDefined(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Coordination(#[from] CoordinationError),
}

/// How [`Store::sync`] reconciles a definition with the stored schema
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Drop the collection and define it again
    Drop,
    /// Define if missing, otherwise merge the definition's attributes in
    Alter,
    /// Leave the stored schema alone
    #[default]
    Safe,
}

/// A transaction lock held through a store
pub type Transaction<D> = LockHandle<CollectionLedger<D>>;

/// Record store wrapping a driver
pub struct Store<D: Driver> {
    driver: Arc<D>,
    config: StoreConfig,
    coordinator: Coordinator<CollectionLedger<D>>,
}

impl<D: Driver> Clone for Store<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            config: self.config.clone(),
            coordinator: self.coordinator.clone(),
        }
    }
}

impl<D: Driver> Store<D> {
    pub fn new(driver: Arc<D>, config: StoreConfig, coordinator: CoordinatorConfig) -> Self {
        let ledger = CollectionLedger::new(Arc::clone(&driver), coordinator.ledger_collection.clone());
        Self {
            driver,
            config,
            coordinator: Coordinator::new(ledger, coordinator),
        }
    }

    pub fn from_config(driver: Arc<D>, config: TallyConfig) -> Self {
        Self::new(driver, config.store, config.coordinator)
    }

    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Coordinator behind [`Store::transaction`]
    pub fn coordinator(&self) -> &Coordinator<CollectionLedger<D>> {
        &self.coordinator
    }

    /// Initialize the driver and make sure the ticket collection exists
    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.driver.initialize().await?;
        self.coordinator.ledger().ensure_defined().await?;
        tracing::debug!(
            driver = self.driver.identity(),
            tickets = self.coordinator.ledger().collection(),
            "store initialized"
        );
        Ok(())
    }

    pub async fn teardown(&self) -> Result<(), StoreError> {
        Ok(self.driver.teardown().await?)
    }

    pub async fn initialize_collection(&self, collection: &str) -> Result<(), StoreError> {
        Ok(self.driver.initialize_collection(collection).await?)
    }

    pub async fn teardown_collection(&self, collection: &str) -> Result<(), StoreError> {
        Ok(self.driver.teardown_collection(collection).await?)
    }

    // -- DDL --

    /// Define a new collection, returning the schema handed to the driver
    pub async fn define(
        &self,
        collection: &str,
        definition: Definition,
    ) -> Result<Schema, StoreError> {
        if self.driver.describe(collection).await?.is_some() {
            return Err(StoreError::AlreadyDefined(collection.to_string()));
        }

        let schema = self.schema_for(definition);
        self.driver.define(collection, &schema).await?;
        tracing::debug!(collection, attributes = schema.len(), "collection defined");
        Ok(schema)
    }

    pub async fn describe(&self, collection: &str) -> Result<Option<Schema>, StoreError> {
        Ok(self.driver.describe(collection).await?)
    }

    pub async fn drop(&self, collection: &str) -> Result<(), StoreError> {
        Ok(self.driver.drop_collection(collection).await?)
    }

    pub async fn alter(&self, collection: &str, schema: &Schema) -> Result<(), StoreError> {
        Ok(self.driver.alter(collection, schema).await?)
    }

    /// Reconcile a definition with what the driver has stored
    pub async fn sync(&self, definition: Definition, mode: SyncMode) -> Result<(), StoreError> {
        let collection = definition.identity.clone();
        match mode {
            SyncMode::Safe => Ok(()),
            SyncMode::Drop => {
                self.drop(&collection).await?;
                self.define(&collection, definition).await?;
                Ok(())
            }
            SyncMode::Alter => {
                let Some(mut schema) = self.describe(&collection).await? else {
                    self.define(&collection, definition).await?;
                    return Ok(());
                };
                for (name, spec) in definition.attributes {
                    schema.insert(name, spec.expand());
                }
                self.alter(&collection, &schema).await
            }
        }
    }

    fn schema_for(&self, definition: Definition) -> Schema {
        let mut schema: Schema = definition
            .attributes
            .into_iter()
            .map(|(name, spec)| (name, spec.expand()))
            .collect();

        if self.config.default_pk && !schema.contains_key(ID) {
            schema.insert(ID.to_string(), Attribute::primary_key_id());
        }
        if self.config.created_at {
            schema
                .entry(CREATED_AT.to_string())
                .or_insert_with(Attribute::timestamp);
        }
        if self.config.updated_at {
            schema
                .entry(UPDATED_AT.to_string())
                .or_insert_with(Attribute::timestamp);
        }
        schema
    }

    // -- DQL --

    pub async fn create(&self, collection: &str, mut values: Record) -> Result<Record, StoreError> {
        let now = Value::String(Utc::now().to_rfc3339());
        if self.config.created_at {
            values.insert(CREATED_AT.to_string(), now.clone());
        }
        if self.config.updated_at {
            values.insert(UPDATED_AT.to_string(), now);
        }
        Ok(self.driver.create(collection, values).await?)
    }

    pub async fn find(
        &self,
        collection: &str,
        criteria: impl IntoCriteria,
    ) -> Result<Vec<Record>, StoreError> {
        let criteria = criteria.into_criteria()?;
        Ok(self.driver.find(collection, &criteria).await?)
    }

    pub async fn update(
        &self,
        collection: &str,
        criteria: impl IntoCriteria,
        mut values: Record,
    ) -> Result<Vec<Record>, StoreError> {
        let criteria = criteria.into_criteria()?;
        if self.config.updated_at {
            values.insert(UPDATED_AT.to_string(), Value::String(Utc::now().to_rfc3339()));
        }
        Ok(self.driver.update(collection, &criteria, values).await?)
    }

    pub async fn destroy(
        &self,
        collection: &str,
        criteria: impl IntoCriteria,
    ) -> Result<Vec<Record>, StoreError> {
        let criteria = criteria.into_criteria()?;
        Ok(self.driver.destroy(collection, &criteria).await?)
    }

    // -- Compound --

    /// Return the first record matching `criteria`, creating `values` if none does
    ///
    /// Runs under the `<collection>:findOrCreate` transaction, so concurrent
    /// callers sharing the ticket collection never both create.
    pub async fn find_or_create(
        &self,
        collection: &str,
        criteria: impl IntoCriteria,
        values: Record,
    ) -> Result<Record, StoreError> {
        let criteria = criteria.into_criteria()?;
        let lock = self.transaction(&format!("{collection}:findOrCreate")).await?;

        let outcome = self.find_or_create_locked(collection, &criteria, values).await;
        let released = lock.release().await;
        let record = outcome?;
        released?;
        Ok(record)
    }

    async fn find_or_create_locked(
        &self,
        collection: &str,
        criteria: &Criteria,
        values: Record,
    ) -> Result<Record, StoreError> {
        let found = self.driver.find(collection, criteria).await?;
        match found.into_iter().next() {
            Some(record) => Ok(record),
            None => self.create(collection, values).await,
        }
    }

    pub async fn find_and_update(
        &self,
        collection: &str,
        criteria: impl IntoCriteria,
        values: Record,
    ) -> Result<Vec<Record>, StoreError> {
        self.update(collection, criteria, values).await
    }

    pub async fn find_and_destroy(
        &self,
        collection: &str,
        criteria: impl IntoCriteria,
    ) -> Result<Vec<Record>, StoreError> {
        self.destroy(collection, criteria).await
    }

    // -- Aggregate --

    /// Create each record in order, stopping at the first failure
    pub async fn create_all(
        &self,
        collection: &str,
        values: Vec<Record>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut created = Vec::with_capacity(values.len());
        for record in values {
            created.push(self.create(collection, record).await?);
        }
        Ok(created)
    }

    pub async fn update_all(
        &self,
        collection: &str,
        values: Record,
    ) -> Result<Vec<Record>, StoreError> {
        self.update(collection, Criteria::all(), values).await
    }

    pub async fn destroy_all(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        self.destroy(collection, Criteria::all()).await
    }

    // -- Concurrency --

    /// Acquire the named transaction lock, waiting behind earlier requests
    pub async fn transaction(&self, name: &str) -> Result<Transaction<D>, StoreError> {
        Ok(self.coordinator.lock(name).await?)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

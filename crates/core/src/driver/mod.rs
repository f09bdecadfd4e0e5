// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage driver contract
//!
//! A driver is the backend a [`Store`](crate::store::Store) wraps. Lifecycle and
//! DDL methods are optional and default to no-ops; DQL methods default to
//! [`DriverError::Unsupported`] so a partial driver fails loudly.

mod memory;
mod table;

pub use memory::MemoryDriver;
pub use table::Table;

use crate::criteria::Criteria;
use crate::record::{Record, Schema};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from storage drivers
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("no {0}() method defined in driver")]
    Unsupported(&'static str),
    #[error("collection not found: {0}")]
    CollectionNotFound(String),
    #[error("collection already exists: {0}")]
    CollectionExists(String),
    #[error("duplicate value {value} for unique attribute {attribute}")]
    UniqueViolation { attribute: String, value: Value },
    #[error("driver unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Backend(String),
}

/// Backend storage for collections of records
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Name of this driver, used in logs
    fn identity(&self) -> &str;

    async fn initialize(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn teardown(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn initialize_collection(&self, _collection: &str) -> Result<(), DriverError> {
        Ok(())
    }

    /// Flush anything buffered for a collection
    async fn teardown_collection(&self, _collection: &str) -> Result<(), DriverError> {
        Ok(())
    }

    async fn define(&self, _collection: &str, _schema: &Schema) -> Result<(), DriverError> {
        Ok(())
    }

    /// Current schema, or `None` if the collection does not exist
    async fn describe(&self, _collection: &str) -> Result<Option<Schema>, DriverError> {
        Ok(None)
    }

    async fn drop_collection(&self, _collection: &str) -> Result<(), DriverError> {
        Ok(())
    }

    async fn alter(&self, _collection: &str, _schema: &Schema) -> Result<(), DriverError> {
        Ok(())
    }

    /// Insert a record, returning it as stored (with its assigned `id`)
    async fn create(&self, _collection: &str, _values: Record) -> Result<Record, DriverError> {
        Err(DriverError::Unsupported("create"))
    }

    async fn find(
        &self,
        _collection: &str,
        _criteria: &Criteria,
    ) -> Result<Vec<Record>, DriverError> {
        Err(DriverError::Unsupported("find"))
    }

    /// Merge `values` into matching records, returning them as updated
    async fn update(
        &self,
        _collection: &str,
        _criteria: &Criteria,
        _values: Record,
    ) -> Result<Vec<Record>, DriverError> {
        Err(DriverError::Unsupported("update"))
    }

    /// Delete matching records, returning what was removed
    async fn destroy(
        &self,
        _collection: &str,
        _criteria: &Criteria,
    ) -> Result<Vec<Record>, DriverError> {
        Err(DriverError::Unsupported("destroy"))
    }
}

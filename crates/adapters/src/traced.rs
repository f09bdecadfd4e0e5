// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced ledger and driver wrappers for consistent observability

use async_trait::async_trait;
use std::time::Instant;
use tally_core::{
    Criteria, Driver, DriverError, Ledger, LedgerError, NewTicket, Record, Schema, Ticket,
};
use tracing::Instrument;

/// Wrapper that adds tracing to any Ledger
#[derive(Clone)]
pub struct TracedLedger<L> {
    inner: L,
}

impl<L> TracedLedger<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

#[async_trait]
impl<L: Ledger> Ledger for TracedLedger<L> {
    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, LedgerError> {
        let span = tracing::info_span!("ledger.insert", name = %ticket.name, uuid = %ticket.uuid);

        async move {
            tracing::debug!("inserting ticket");
            let start = Instant::now();
            let result = self.inner.insert(ticket).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(stored) => tracing::debug!(id = %stored.id, elapsed_ms, "ticket inserted"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "insert failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn list_all(&self) -> Result<Vec<Ticket>, LedgerError> {
        let start = Instant::now();
        let result = self.inner.list_all().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(tickets) => tracing::trace!(count = tickets.len(), elapsed_ms, "scanned ledger"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "ledger scan failed"),
        }
        result
    }

    async fn remove(&self, uuid: &str) -> Result<(), LedgerError> {
        let span = tracing::info_span!("ledger.remove", uuid);

        async move {
            let start = Instant::now();
            let result = self.inner.remove(uuid).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "ticket removed"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "remove failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any Driver
#[derive(Clone)]
pub struct TracedDriver<D> {
    inner: D,
}

impl<D> TracedDriver<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

/// Collections must be named; an empty name would address nothing
fn require_collection(collection: &str) -> Result<(), DriverError> {
    if collection.trim().is_empty() {
        tracing::error!("collection name is empty");
        return Err(DriverError::Backend("collection name is empty".to_string()));
    }
    Ok(())
}

#[async_trait]
impl<D: Driver> Driver for TracedDriver<D> {
    fn identity(&self) -> &str {
        self.inner.identity()
    }

    async fn initialize(&self) -> Result<(), DriverError> {
        let span = tracing::info_span!("driver.initialize", driver = self.inner.identity());

        async move {
            let start = Instant::now();
            let result = self.inner.initialize().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "driver ready"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "initialize failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn teardown(&self) -> Result<(), DriverError> {
        let result = self.inner.teardown().await;
        if let Err(e) = &result {
            tracing::warn!(driver = self.inner.identity(), error = %e, "teardown failed");
        }
        result
    }

    async fn initialize_collection(&self, collection: &str) -> Result<(), DriverError> {
        require_collection(collection)?;
        self.inner.initialize_collection(collection).await
    }

    async fn teardown_collection(&self, collection: &str) -> Result<(), DriverError> {
        require_collection(collection)?;
        self.inner.teardown_collection(collection).await
    }

    async fn define(&self, collection: &str, schema: &Schema) -> Result<(), DriverError> {
        let span = tracing::info_span!("driver.define", collection);

        async move {
            require_collection(collection)?;
            tracing::info!(attributes = schema.len(), "defining collection");
            let result = self.inner.define(collection, schema).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "define failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn describe(&self, collection: &str) -> Result<Option<Schema>, DriverError> {
        let result = self.inner.describe(collection).await;
        tracing::trace!(
            collection,
            exists = ?result.as_ref().map(Option::is_some).ok(),
            "described"
        );
        result
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), DriverError> {
        let span = tracing::info_span!("driver.drop", collection);

        async move {
            require_collection(collection)?;
            let result = self.inner.drop_collection(collection).await;
            match &result {
                Ok(()) => tracing::info!("collection dropped"),
                Err(e) => tracing::error!(error = %e, "drop failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn alter(&self, collection: &str, schema: &Schema) -> Result<(), DriverError> {
        let span = tracing::info_span!("driver.alter", collection);

        async move {
            require_collection(collection)?;
            let result = self.inner.alter(collection, schema).await;
            match &result {
                Ok(()) => tracing::info!(attributes = schema.len(), "collection altered"),
                Err(e) => tracing::error!(error = %e, "alter failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn create(&self, collection: &str, values: Record) -> Result<Record, DriverError> {
        let span = tracing::debug_span!("driver.create", collection);

        async move {
            require_collection(collection)?;
            let start = Instant::now();
            let result = self.inner.create(collection, values).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(record) => tracing::debug!(
                    id = ?record.get(tally_core::record::ID),
                    elapsed_ms,
                    "record created"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "create failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn find(&self, collection: &str, criteria: &Criteria) -> Result<Vec<Record>, DriverError> {
        let start = Instant::now();
        let result = self.inner.find(collection, criteria).await;
        tracing::trace!(
            collection,
            count = result.as_ref().map(Vec::len).ok(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "found"
        );
        result
    }

    async fn update(
        &self,
        collection: &str,
        criteria: &Criteria,
        values: Record,
    ) -> Result<Vec<Record>, DriverError> {
        let span = tracing::debug_span!("driver.update", collection);

        async move {
            require_collection(collection)?;
            let result = self.inner.update(collection, criteria, values).await;
            match &result {
                Ok(records) => tracing::debug!(count = records.len(), "records updated"),
                Err(e) => tracing::error!(error = %e, "update failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn destroy(
        &self,
        collection: &str,
        criteria: &Criteria,
    ) -> Result<Vec<Record>, DriverError> {
        let span = tracing::debug_span!("driver.destroy", collection);

        async move {
            require_collection(collection)?;
            let result = self.inner.destroy(collection, criteria).await;
            match &result {
                Ok(records) => tracing::debug!(count = records.len(), "records destroyed"),
                Err(e) => tracing::error!(error = %e, "destroy failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

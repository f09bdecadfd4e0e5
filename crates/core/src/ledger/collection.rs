// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ledger stored as an ordinary collection of a storage driver

use super::{Ledger, LedgerError, NewTicket, Ticket, TicketSeq};
use crate::criteria::{Criteria, Sort};
use crate::driver::Driver;
use crate::record::{record_id, Attribute, Record, Schema, CREATED_AT, ID};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

/// Collection the ledger uses unless configured otherwise
pub const DEFAULT_COLLECTION: &str = "tally_tickets";

/// A ledger whose tickets are rows of a driver collection
///
/// Ticket ids are the driver's record ids, so the driver must assign them in
/// strictly increasing order.
pub struct CollectionLedger<D> {
    driver: Arc<D>,
    collection: String,
}

impl<D> Clone for CollectionLedger<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            collection: self.collection.clone(),
        }
    }
}

impl<D: Driver> CollectionLedger<D> {
    pub fn new(driver: Arc<D>, collection: impl Into<String>) -> Self {
        Self {
            driver,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Schema of the ticket collection
    pub fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.insert(ID.to_string(), Attribute::primary_key_id());
        schema.insert("uuid".to_string(), Attribute::new("STRING").with_unique());
        schema.insert("name".to_string(), Attribute::new("STRING"));
        schema.insert(CREATED_AT.to_string(), Attribute::timestamp());
        schema
    }

    /// Define the ticket collection if the driver does not have it yet
    pub async fn ensure_defined(&self) -> Result<(), LedgerError> {
        if self.driver.describe(&self.collection).await?.is_none() {
            tracing::debug!(collection = %self.collection, "defining ticket collection");
            self.driver.define(&self.collection, &Self::schema()).await?;
        }
        Ok(())
    }
}

/// Parse a stored row back into a ticket
pub fn ticket_from_record(record: &Record) -> Result<Ticket, LedgerError> {
    let malformed = |what: &str| LedgerError::Malformed(format!("{what} in {}", Value::Object(record.clone())));

    let id = record_id(record).ok_or_else(|| malformed("missing numeric id"))?;
    let uuid = record
        .get("uuid")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing uuid"))?;
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing name"))?;
    let created_at = record
        .get(CREATED_AT)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Ok(Ticket {
        id: TicketSeq(id),
        uuid: uuid.to_string(),
        name: name.to_string(),
        created_at,
    })
}

#[async_trait]
impl<D: Driver> Ledger for CollectionLedger<D> {
    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, LedgerError> {
        let mut values = Record::new();
        values.insert("uuid".to_string(), Value::String(ticket.uuid));
        values.insert("name".to_string(), Value::String(ticket.name));
        values.insert(CREATED_AT.to_string(), Value::String(Utc::now().to_rfc3339()));

        let stored = self.driver.create(&self.collection, values).await?;
        ticket_from_record(&stored)
    }

    async fn list_all(&self) -> Result<Vec<Ticket>, LedgerError> {
        let criteria = Criteria::all().with_order(Sort::asc(ID));
        self.driver
            .find(&self.collection, &criteria)
            .await?
            .iter()
            .map(ticket_from_record)
            .collect()
    }

    async fn remove(&self, uuid: &str) -> Result<(), LedgerError> {
        let criteria = Criteria::all().where_eq("uuid", uuid);
        self.driver.destroy(&self.collection, &criteria).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory collection semantics shared by drivers
//!
//! A table assigns ids from its own sequence rather than relying on any
//! engine's autoincrement: every id handed out is strictly greater than all
//! ids seen before, and the sequence never moves backwards, even when the
//! rows holding the largest ids are destroyed.

use super::DriverError;
use crate::criteria::Criteria;
use crate::record::{Record, Schema, ID};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    schema: Schema,
    rows: Vec<Record>,
    next_id: u64,
}

impl Default for Table {
    fn default() -> Self {
        Self::new(Schema::new())
    }
}

impl Table {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            next_id: 1,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn set_schema(&mut self, schema: Schema) {
        self.schema = schema;
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The id the next insert without an explicit id will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Move the sequence forward; never moves it back
    pub fn advance_sequence(&mut self, next_id: u64) {
        self.next_id = self.next_id.max(next_id);
    }

    /// Build the record an insert would store, without storing it
    pub fn prepare(&self, mut values: Record) -> Result<Record, DriverError> {
        if values.get(ID).map_or(true, Value::is_null) {
            values.insert(ID.to_string(), Value::from(self.next_id));
        }

        for (attribute, value) in &values {
            let unique = attribute == ID
                || self
                    .schema
                    .get(attribute)
                    .is_some_and(|a| a.unique || a.primary_key);
            if !unique || value.is_null() {
                continue;
            }
            if self.rows.iter().any(|row| row.get(attribute) == Some(value)) {
                return Err(DriverError::UniqueViolation {
                    attribute: attribute.clone(),
                    value: value.clone(),
                });
            }
        }

        Ok(values)
    }

    /// Store an already prepared record
    pub fn restore(&mut self, record: Record) {
        if let Some(id) = record.get(ID).and_then(Value::as_u64) {
            self.advance_sequence(id.saturating_add(1));
        }
        self.rows.push(record);
    }

    pub fn insert(&mut self, values: Record) -> Result<Record, DriverError> {
        let record = self.prepare(values)?;
        self.restore(record.clone());
        Ok(record)
    }

    pub fn find(&self, criteria: &Criteria) -> Vec<Record> {
        criteria.apply(self.rows.iter().cloned())
    }

    /// The matching records as they would look after an update
    pub fn preview_update(&self, criteria: &Criteria, values: &Record) -> Vec<Record> {
        self.find(criteria)
            .into_iter()
            .map(|mut row| {
                for (attribute, value) in values {
                    if attribute != ID {
                        row.insert(attribute.clone(), value.clone());
                    }
                }
                row
            })
            .collect()
    }

    /// Replace stored rows with updated versions, matched by id
    pub fn replace(&mut self, records: &[Record]) {
        for record in records {
            let Some(id) = record.get(ID) else { continue };
            if let Some(row) = self.rows.iter_mut().find(|row| row.get(ID) == Some(id)) {
                *row = record.clone();
            }
        }
    }

    pub fn update(&mut self, criteria: &Criteria, values: &Record) -> Vec<Record> {
        let updated = self.preview_update(criteria, values);
        self.replace(&updated);
        updated
    }

    pub fn remove_ids(&mut self, ids: &[Value]) {
        self.rows
            .retain(|row| row.get(ID).map_or(true, |id| !ids.contains(id)));
    }

    pub fn destroy(&mut self, criteria: &Criteria) -> Vec<Record> {
        let removed = self.find(criteria);
        let ids: Vec<Value> = removed.iter().filter_map(|r| r.get(ID).cloned()).collect();
        self.remove_ids(&ids);
        removed
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;

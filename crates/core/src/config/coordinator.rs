// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::ledger::DEFAULT_COLLECTION;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lock coordinator configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// How long a lock may be held before a warning is logged
    #[serde(with = "humantime_serde")]
    pub warning_threshold: Duration,
    /// Collection holding the tickets when the ledger lives in a store
    pub ledger_collection: String,
    /// Buffer size of the lock event broadcast
    pub event_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            warning_threshold: Duration::from_secs(2),
            ledger_collection: DEFAULT_COLLECTION.to_string(),
            event_capacity: 256,
        }
    }
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_warning_threshold(mut self, threshold: Duration) -> Self {
        self.warning_threshold = threshold;
        self
    }

    pub fn with_ledger_collection(mut self, collection: impl Into<String>) -> Self {
        self.ledger_collection = collection.into();
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

/// Record store configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Add an autoincrement `id` primary key to definitions without one
    pub default_pk: bool,
    /// Maintain a `createdAt` attribute
    pub created_at: bool,
    /// Maintain an `updatedAt` attribute
    pub updated_at: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_pk: true,
            created_at: true,
            updated_at: true,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_pk(mut self, enabled: bool) -> Self {
        self.default_pk = enabled;
        self
    }

    pub fn with_created_at(mut self, enabled: bool) -> Self {
        self.created_at = enabled;
        self
    }

    pub fn with_updated_at(mut self, enabled: bool) -> Self {
        self.updated_at = enabled;
        self
    }
}

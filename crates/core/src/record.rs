// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Records and collection schemas
//!
//! Records are loose JSON objects. Schemas describe their attributes the way the
//! storage driver sees them; definitions are the user-facing form, where an
//! attribute may be given as just its type name.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single row in a collection
pub type Record = serde_json::Map<String, Value>;

/// Attribute name to attribute, as stored by a driver
pub type Schema = BTreeMap<String, Attribute>;

/// Primary key attribute name
pub const ID: &str = "id";
/// Creation timestamp attribute name
pub const CREATED_AT: &str = "createdAt";
/// Last-update timestamp attribute name
pub const UPDATED_AT: &str = "updatedAt";

/// A fully specified collection attribute
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, rename = "autoIncrement", skip_serializing_if = "is_false")]
    pub auto_increment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    #[serde(default, rename = "primaryKey", skip_serializing_if = "is_false")]
    pub primary_key: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Attribute {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            auto_increment: false,
            default: None,
            unique: false,
            primary_key: false,
        }
    }

    /// The autoincrementing integer primary key added to collections by default
    pub fn primary_key_id() -> Self {
        Self::new("INTEGER")
            .with_auto_increment()
            .with_default(Value::String("AUTO_INCREMENT".to_string()))
            .with_unique()
            .with_primary_key()
    }

    /// A date attribute defaulting to the insertion time
    pub fn timestamp() -> Self {
        Self::new("DATE").with_default(Value::String("NOW".to_string()))
    }

    pub fn with_auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// An attribute as written in a definition: either a bare type name or a full attribute
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeSpec {
    Short(String),
    Full(Attribute),
}

impl AttributeSpec {
    pub fn expand(self) -> Attribute {
        match self {
            AttributeSpec::Short(kind) => Attribute::new(kind),
            AttributeSpec::Full(attribute) => attribute,
        }
    }
}

impl From<Attribute> for AttributeSpec {
    fn from(attribute: Attribute) -> Self {
        AttributeSpec::Full(attribute)
    }
}

impl From<&str> for AttributeSpec {
    fn from(kind: &str) -> Self {
        AttributeSpec::Short(kind.to_string())
    }
}

/// A collection definition as supplied by the application
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub identity: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeSpec>,
}

impl Definition {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, spec: impl Into<AttributeSpec>) -> Self {
        self.attributes.insert(name.into(), spec.into());
        self
    }
}

/// Read a record's numeric primary key
pub fn record_id(record: &Record) -> Option<u64> {
    record.get(ID).and_then(Value::as_u64)
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query criteria
//!
//! Callers may pass criteria in several shapes: nothing, a bare id, a plain
//! attribute map, or a map with operational keys. Everything is normalized
//! into a [`Criteria`] before it reaches a driver.

use crate::record::{Record, ID};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use thiserror::Error;

/// Operational keys that mark a criteria object as already structured
const OPERATIONAL_KEYS: [&str; 5] = ["where", "limit", "skip", "offset", "order"];

/// Errors from criteria normalization
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    #[error("invalid options/criteria: {0}")]
    Invalid(String),
    #[error("invalid order clause: {0}")]
    InvalidOrder(String),
    #[error("invalid {field}: expected a non-negative integer, got {value}")]
    InvalidCount { field: &'static str, value: String },
}

/// Sort direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One sort key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// Canonical query criteria
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Criteria {
    /// Attribute equality filter; `None` matches every record
    pub filter: Option<Record>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
    pub offset: Option<usize>,
    pub order: Vec<Sort>,
}

impl Criteria {
    /// Criteria matching every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Criteria matching a single primary key
    pub fn by_id(id: u64) -> Self {
        Self::all().where_eq(ID, id)
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter
            .get_or_insert_with(Record::new)
            .insert(field.into(), value.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_order(mut self, sort: Sort) -> Self {
        self.order.push(sort);
        self
    }

    /// Normalize loosely shaped criteria
    pub fn normalize(criteria: Option<&Value>) -> Result<Self, CriteriaError> {
        let Some(value) = criteria else {
            return Ok(Self::all());
        };

        match value {
            Value::Null => Ok(Self::all()),
            Value::Object(map) => Self::from_object(map),
            Value::Number(_) | Value::String(_) => match positive_number(value) {
                Some(id) => Ok(Self::all().where_eq(ID, id)),
                None => Err(CriteriaError::Invalid(value.to_string())),
            },
            other => Err(CriteriaError::Invalid(other.to_string())),
        }
    }

    fn from_object(map: &Record) -> Result<Self, CriteriaError> {
        let structured = OPERATIONAL_KEYS
            .iter()
            .any(|key| map.get(*key).is_some_and(is_truthy));

        if !structured {
            return Ok(Self {
                filter: Some(coerce_numbers(map.clone())),
                ..Self::default()
            });
        }

        let filter = match map.get("where") {
            None | Some(Value::Null) => None,
            Some(Value::Object(filter)) => Some(coerce_numbers(filter.clone())),
            Some(other) => return Err(CriteriaError::Invalid(other.to_string())),
        };

        Ok(Self {
            filter,
            limit: count(map, "limit")?,
            skip: count(map, "skip")?,
            offset: count(map, "offset")?,
            order: match map.get("order") {
                None | Some(Value::Null) => Vec::new(),
                Some(order) => parse_order(order)?,
            },
        })
    }

    /// Check a record against the filter
    pub fn matches(&self, record: &Record) -> bool {
        let Some(filter) = &self.filter else {
            return true;
        };

        filter.iter().all(|(field, expected)| {
            let actual = record.get(field).unwrap_or(&Value::Null);
            match expected {
                Value::Array(options) => options.iter().any(|option| values_equal(actual, option)),
                _ => values_equal(actual, expected),
            }
        })
    }

    /// Filter, sort and page a set of records
    pub fn apply(&self, rows: impl IntoIterator<Item = Record>) -> Vec<Record> {
        let mut rows: Vec<Record> = rows.into_iter().filter(|r| self.matches(r)).collect();

        if !self.order.is_empty() {
            rows.sort_by(|a, b| {
                self.order
                    .iter()
                    .map(|sort| {
                        let ordering = compare_values(
                            a.get(&sort.field).unwrap_or(&Value::Null),
                            b.get(&sort.field).unwrap_or(&Value::Null),
                        );
                        match sort.direction {
                            Direction::Asc => ordering,
                            Direction::Desc => ordering.reverse(),
                        }
                    })
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let skip = self.skip.or(self.offset).unwrap_or(0);
        let rows = rows.into_iter().skip(skip);
        match self.limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        }
    }
}

/// Anything a store accepts as query criteria
pub trait IntoCriteria {
    fn into_criteria(self) -> Result<Criteria, CriteriaError>;
}

impl IntoCriteria for Criteria {
    fn into_criteria(self) -> Result<Criteria, CriteriaError> {
        Ok(self)
    }
}

impl IntoCriteria for &Value {
    fn into_criteria(self) -> Result<Criteria, CriteriaError> {
        Criteria::normalize(Some(self))
    }
}

impl IntoCriteria for Value {
    fn into_criteria(self) -> Result<Criteria, CriteriaError> {
        Criteria::normalize(Some(&self))
    }
}

impl IntoCriteria for Option<Value> {
    fn into_criteria(self) -> Result<Criteria, CriteriaError> {
        Criteria::normalize(self.as_ref())
    }
}

impl IntoCriteria for u64 {
    fn into_criteria(self) -> Result<Criteria, CriteriaError> {
        Ok(Criteria::by_id(self))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A strictly positive finite number, from a number or a numeric string
fn positive_number(value: &Value) -> Option<Value> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n > 0.0).then(|| number_value(n))
}

/// Numeric strings in a filter are compared as numbers
fn coerce_numbers(mut filter: Record) -> Record {
    for value in filter.values_mut() {
        if let Value::String(s) = value {
            if let Ok(n) = s.trim().parse::<f64>() {
                if n.is_finite() && n != 0.0 {
                    *value = number_value(n);
                }
            }
        }
    }
    filter
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

fn count(map: &Record, field: &'static str) -> Result<Option<usize>, CriteriaError> {
    let invalid = |value: &Value| CriteriaError::InvalidCount {
        field,
        value: value.to_string(),
    };
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value @ Value::Number(n)) => n
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| invalid(value)),
        Some(value @ Value::String(s)) => s
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| invalid(value)),
        Some(other) => Err(invalid(other)),
    }
}

fn parse_order(order: &Value) -> Result<Vec<Sort>, CriteriaError> {
    match order {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(parse_sort_clause)
            .collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => parse_sort_clause(s.trim()),
                other => Err(CriteriaError::InvalidOrder(other.to_string())),
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(field, direction)| {
                let direction = match direction {
                    Value::String(s) => parse_direction(s)?,
                    Value::Number(n) if n.as_i64() == Some(1) => Direction::Asc,
                    Value::Number(n) if n.as_i64() == Some(-1) => Direction::Desc,
                    other => return Err(CriteriaError::InvalidOrder(other.to_string())),
                };
                Ok(Sort {
                    field: field.clone(),
                    direction,
                })
            })
            .collect(),
        other => Err(CriteriaError::InvalidOrder(other.to_string())),
    }
}

fn parse_sort_clause(clause: &str) -> Result<Sort, CriteriaError> {
    let mut parts = clause.split_whitespace();
    let field = parts
        .next()
        .ok_or_else(|| CriteriaError::InvalidOrder(clause.to_string()))?;
    let direction = match parts.next() {
        None => Direction::Asc,
        Some(direction) => parse_direction(direction)?,
    };
    if parts.next().is_some() {
        return Err(CriteriaError::InvalidOrder(clause.to_string()));
    }
    Ok(Sort {
        field: field.to_string(),
        direction,
    })
}

fn parse_direction(direction: &str) -> Result<Direction, CriteriaError> {
    match direction.to_ascii_lowercase().as_str() {
        "asc" => Ok(Direction::Asc),
        "desc" => Ok(Direction::Desc),
        _ => Err(CriteriaError::InvalidOrder(direction.to_string())),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Missing and null sort first, then booleans, numbers, strings
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
#[path = "criteria_tests.rs"]
mod tests;

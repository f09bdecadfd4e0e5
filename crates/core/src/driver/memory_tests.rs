// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::record::Attribute;
use serde_json::json;

fn values(value: serde_json::Value) -> Record {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn define_then_describe_returns_schema() {
    let driver = MemoryDriver::new();
    let mut schema = Schema::new();
    schema.insert("name".to_string(), Attribute::new("STRING"));

    driver.define("users", &schema).await.unwrap();
    assert_eq!(driver.describe("users").await.unwrap(), Some(schema));
    assert_eq!(driver.describe("missing").await.unwrap(), None);
}

#[tokio::test]
async fn define_twice_fails() {
    let driver = MemoryDriver::new();
    driver.define("users", &Schema::new()).await.unwrap();
    let err = driver.define("users", &Schema::new()).await.unwrap_err();
    assert!(matches!(err, DriverError::CollectionExists(name) if name == "users"));
}

#[tokio::test]
async fn create_into_undefined_collection_defines_it() {
    let driver = MemoryDriver::new();
    let record = driver
        .create("tickets", values(json!({ "name": "a" })))
        .await
        .unwrap();

    assert_eq!(record["id"], json!(1));
    assert_eq!(driver.collections(), vec!["tickets".to_string()]);
}

#[tokio::test]
async fn clones_share_collections() {
    let driver = MemoryDriver::new();
    let other = driver.clone();
    driver.create("c", values(json!({}))).await.unwrap();
    assert_eq!(other.rows("c").len(), 1);
}

#[tokio::test]
async fn find_update_destroy_on_missing_collection_are_empty() {
    let driver = MemoryDriver::new();
    assert!(driver.find("none", &Criteria::all()).await.unwrap().is_empty());
    assert!(driver
        .update("none", &Criteria::all(), Record::new())
        .await
        .unwrap()
        .is_empty());
    assert!(driver.destroy("none", &Criteria::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn alter_missing_collection_fails() {
    let driver = MemoryDriver::new();
    let err = driver.alter("none", &Schema::new()).await.unwrap_err();
    assert!(matches!(err, DriverError::CollectionNotFound(_)));
}

#[tokio::test]
async fn drop_removes_rows() {
    let driver = MemoryDriver::new();
    driver.create("c", values(json!({}))).await.unwrap();
    driver.drop_collection("c").await.unwrap();
    assert!(driver.rows("c").is_empty());
    assert!(driver.collections().is_empty());
}

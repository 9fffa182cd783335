//! Shared fixtures for integration tests
//!
//! Registry layout:
//! - form_list --parentID--> lahuojihua --maker--> charger --leader(name)--> person
//! - form_list --owner--> person (no traversal key)
//! - form_list --kind--> formtype (excluded target)
//! - item --owner(name)--> person

#![allow(dead_code)]

use std::sync::Arc;

use aerorel::executor::{DocumentStore, MemoryStore, StoreError, StoreFuture};
use aerorel::filter::MatchExpr;
use aerorel::planner::{PlannerOptions, Stage};
use aerorel::schema::{AttributeDef, ResourceSchema, ScalarType, SchemaRegistry};
use serde_json::{json, Value};

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::from_schemas(vec![
        ResourceSchema::new("person", "1")
            .with_attribute(AttributeDef::scalar("name", ScalarType::String))
            .with_attribute(AttributeDef::scalar("age", ScalarType::Int)),
        ResourceSchema::new("charger", "2")
            .with_attribute(AttributeDef::scalar("name", ScalarType::String))
            .with_attribute(AttributeDef::relation("leader", "person").with_traversal_key("name")),
        ResourceSchema::new("lahuojihua", "1")
            .with_attribute(AttributeDef::scalar("title", ScalarType::String))
            .with_attribute(AttributeDef::relation("maker", "charger")),
        ResourceSchema::new("form_list", "3")
            .with_attribute(AttributeDef::scalar("title", ScalarType::String))
            .with_attribute(AttributeDef::scalar("qty", ScalarType::Int))
            .with_attribute(AttributeDef::relation("parentID", "lahuojihua"))
            .with_attribute(AttributeDef::relation("owner", "person"))
            .with_attribute(AttributeDef::relation("kind", "formtype"))
            .with_attribute(
                AttributeDef::scalar("maker_name", ScalarType::String)
                    .inherited_from("~/maker/name"),
            )
            .with_extra_path("~/title:Plan"),
        ResourceSchema::new("formtype", "1"),
        ResourceSchema::new("item", "1")
            .with_attribute(AttributeDef::scalar("name", ScalarType::String))
            .with_attribute(AttributeDef::scalar("qty", ScalarType::Int))
            .with_attribute(AttributeDef::relation("owner", "person").with_traversal_key("name")),
    ])
    .expect("fixture registry is valid")
}

pub fn store() -> MemoryStore {
    MemoryStore::new()
        .with_documents(
            "person",
            vec![
                json!({"id": "p1", "name": "Bob", "age": 41}),
                json!({"id": "p2", "name": "Alice", "age": 29}),
                json!({"id": "p3", "name": "Bobby", "age": 17}),
            ],
        )
        .with_documents(
            "charger",
            vec![
                json!({"id": "c1", "name": "Acme", "leader": {"id": "p1"}}),
                json!({"id": "c2", "name": "Zenith", "leader": {"id": "p2"}}),
            ],
        )
        .with_documents(
            "lahuojihua",
            vec![
                json!({"id": "l1", "title": "north", "maker": {"id": "c1"}}),
                json!({"id": "l2", "title": "south", "maker": {"id": "c2"}}),
            ],
        )
        .with_documents(
            "form_list",
            vec![
                json!({"id": "f1", "title": "alpha", "qty": 5, "parentID": {"id": "l1"}, "owner": {"id": "42"}}),
                json!({"id": "f2", "title": "beta", "qty": 9, "parentID": {"id": "l2"}, "owner": {"id": "p2"}}),
                json!({"id": "f3", "title": "gamma", "qty": 1}),
            ],
        )
        .with_documents(
            "item",
            vec![
                json!({"id": "i1", "name": "bolt", "qty": 3, "owner": {"id": "p2"}}),
                json!({"id": "i2", "name": "nut", "qty": 8, "owner": {"id": "p1"}}),
                json!({"id": "i3", "name": "gear", "qty": 12, "owner": {"id": "p3"}}),
            ],
        )
}

pub fn shared() -> (Arc<SchemaRegistry>, Arc<MemoryStore>, PlannerOptions) {
    (Arc::new(registry()), Arc::new(store()), PlannerOptions::default())
}

/// Ids of documents in order
pub fn ids(documents: &[Value]) -> Vec<&str> {
    documents
        .iter()
        .filter_map(|d| d.get("id").and_then(Value::as_str))
        .collect()
}

/// Store where one round-trip always fails
pub struct FailingStore {
    inner: MemoryStore,
    fail_fetch: bool,
    fail_count: bool,
}

impl FailingStore {
    pub fn fetch_fails() -> Self {
        Self {
            inner: store(),
            fail_fetch: true,
            fail_count: false,
        }
    }

    pub fn count_fails() -> Self {
        Self {
            inner: store(),
            fail_fetch: false,
            fail_count: true,
        }
    }
}

impl DocumentStore for FailingStore {
    fn aggregate<'a>(
        &'a self,
        collection: &'a str,
        pipeline: &'a [Stage],
    ) -> StoreFuture<'a, Vec<Value>> {
        if self.fail_fetch {
            Box::pin(async { Err(StoreError::new("aggregate: connection reset")) })
        } else {
            self.inner.aggregate(collection, pipeline)
        }
    }

    fn count<'a>(&'a self, collection: &'a str, criteria: &'a MatchExpr) -> StoreFuture<'a, u64> {
        if self.fail_count {
            Box::pin(async { Err(StoreError::new("count: connection reset")) })
        } else {
            self.inner.count(collection, criteria)
        }
    }
}

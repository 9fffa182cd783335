//! Write-side store seams
//!
//! `DocumentWriter` persists documents; `SequenceGenerator` hands out
//! monotonic per-name integers used as numeric `ID`s.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::executor::{MemoryStore, StoreError, StoreFuture};

/// A store accepting document writes
pub trait DocumentWriter: Send + Sync {
    /// Appends a document to `collection`
    fn insert<'a>(&'a self, collection: &'a str, document: Value) -> StoreFuture<'a, ()>;

    /// Sets the keys of `patch` on the document whose `id_field` equals `id`.
    ///
    /// Returns the updated document, or `None` if nothing matched.
    fn update<'a>(
        &'a self,
        collection: &'a str,
        id_field: &'a str,
        id: &'a str,
        patch: &'a Map<String, Value>,
    ) -> StoreFuture<'a, Option<Value>>;

    /// Removes the document whose `id_field` equals `id`.
    ///
    /// Returns the removed document, or `None` if nothing matched.
    fn delete<'a>(
        &'a self,
        collection: &'a str,
        id_field: &'a str,
        id: &'a str,
    ) -> StoreFuture<'a, Option<Value>>;
}

/// Named monotonic counters
pub trait SequenceGenerator: Send + Sync {
    /// Next value of sequence `name`; the first value is 1
    fn next<'a>(&'a self, name: &'a str) -> StoreFuture<'a, i64>;
}

/// In-process sequence counters
#[derive(Debug, Default)]
pub struct MemorySequence {
    counters: Mutex<HashMap<String, i64>>,
}

impl MemorySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value handed out for `name`, 0 if none
    pub fn current(&self, name: &str) -> i64 {
        self.counters
            .lock()
            .map(|c| c.get(name).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn advance(&self, name: &str) -> Result<i64, StoreError> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| StoreError::new("sequence lock poisoned"))?;
        let counter = counters.entry(name.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

impl SequenceGenerator for MemorySequence {
    fn next<'a>(&'a self, name: &'a str) -> StoreFuture<'a, i64> {
        Box::pin(async move { self.advance(name) })
    }
}

impl DocumentWriter for MemoryStore {
    fn insert<'a>(&'a self, collection: &'a str, document: Value) -> StoreFuture<'a, ()> {
        Box::pin(async move { MemoryStore::insert(self, collection, document) })
    }

    fn update<'a>(
        &'a self,
        collection: &'a str,
        id_field: &'a str,
        id: &'a str,
        patch: &'a Map<String, Value>,
    ) -> StoreFuture<'a, Option<Value>> {
        Box::pin(async move { self.patch(collection, id_field, &Value::from(id), patch) })
    }

    fn delete<'a>(
        &'a self,
        collection: &'a str,
        id_field: &'a str,
        id: &'a str,
    ) -> StoreFuture<'a, Option<Value>> {
        Box::pin(async move { self.remove(collection, id_field, &Value::from(id)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_sequences_are_independent() {
        let seq = MemorySequence::new();
        assert_eq!(seq.next("item_ID").await.unwrap(), 1);
        assert_eq!(seq.next("item_ID").await.unwrap(), 2);
        assert_eq!(seq.next("person_ID").await.unwrap(), 1);
        assert_eq!(seq.current("item_ID"), 2);
        assert_eq!(seq.current("other"), 0);
    }

    #[tokio::test]
    async fn test_memory_store_update_merges_keys() {
        let store = MemoryStore::new().with_documents(
            "item",
            vec![json!({"id": "a", "name": "bolt", "qty": 1})],
        );
        let patch = json!({"qty": 5}).as_object().cloned().unwrap();

        let updated = DocumentWriter::update(&store, "item", "id", "a", &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated, json!({"id": "a", "name": "bolt", "qty": 5}));

        let missing = DocumentWriter::update(&store, "item", "id", "zz", &patch)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}

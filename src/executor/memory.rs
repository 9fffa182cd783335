//! In-process document store
//!
//! Holds collections in memory and evaluates pipelines stage by stage with
//! document-store semantics. Used by tests and local tooling.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};
use super::sorter::ResultSorter;
use super::store::{DocumentStore, StoreFuture};
use crate::filter::{lookup_path, MatchExpr};
use crate::planner::{Flatten, Join, Stage};

/// In-memory collections keyed by name
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_documents(self, collection: &str, documents: Vec<Value>) -> Self {
        if let Ok(mut collections) = self.collections.write() {
            collections
                .entry(collection.to_string())
                .or_default()
                .extend(documents);
        }
        self
    }

    /// Appends a document to a collection
    pub fn insert(&self, collection: &str, document: Value) -> StoreResult<()> {
        let mut collections = self.write()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    /// Sets the top-level keys of `patch` on the first document whose
    /// `field` equals `id`; returns the updated document
    pub fn patch(
        &self,
        collection: &str,
        field: &str,
        id: &Value,
        patch: &Map<String, Value>,
    ) -> StoreResult<Option<Value>> {
        let mut collections = self.write()?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(slot) = docs.iter_mut().find(|d| d.get(field) == Some(id)) else {
            return Ok(None);
        };
        if let Value::Object(map) = slot {
            for (key, value) in patch {
                map.insert(key.clone(), value.clone());
            }
        }
        Ok(Some(slot.clone()))
    }

    /// Removes the first document whose `field` equals `id`
    pub fn remove(&self, collection: &str, field: &str, id: &Value) -> StoreResult<Option<Value>> {
        let mut collections = self.write()?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(position) = docs.iter().position(|d| d.get(field) == Some(id)) else {
            return Ok(None);
        };
        Ok(Some(docs.remove(position)))
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn write(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<Value>>>> {
        self.collections
            .write()
            .map_err(|_| StoreError::new("memory store lock poisoned"))
    }

    /// Evaluates a pipeline synchronously
    pub fn run_pipeline(&self, collection: &str, pipeline: &[Stage]) -> StoreResult<Vec<Value>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::new("memory store lock poisoned"))?;

        let mut documents = collections.get(collection).cloned().unwrap_or_default();
        for stage in pipeline {
            documents = match stage {
                Stage::Match(expr) => documents.into_iter().filter(|d| expr.matches(d)).collect(),
                Stage::Lookup(join) => {
                    let foreign = collections.get(&join.from).map(Vec::as_slice).unwrap_or(&[]);
                    documents.into_iter().map(|d| lookup(d, join, foreign)).collect()
                }
                Stage::Unwind(flatten) => {
                    documents.into_iter().flat_map(|d| unwind(d, flatten)).collect()
                }
                Stage::Sort(specs) => {
                    ResultSorter::sort(&mut documents, specs);
                    documents
                }
                Stage::Skip(n) => documents.into_iter().skip(to_usize(*n)).collect(),
                Stage::Limit(n) => documents.into_iter().take(to_usize(*n)).collect(),
            };
        }
        Ok(documents)
    }

    /// Counts documents matching `criteria`
    pub fn count_matching(&self, collection: &str, criteria: &MatchExpr) -> StoreResult<u64> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::new("memory store lock poisoned"))?;
        let count = collections
            .get(collection)
            .map_or(0, |docs| docs.iter().filter(|d| criteria.matches(d)).count());
        Ok(count as u64)
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// Attaches every foreign document whose foreign field equals one of the
/// local values as an array under the alias
fn lookup(mut document: Value, join: &Join, foreign: &[Value]) -> Value {
    let local: Vec<Value> = lookup_path(&document, &join.local_field)
        .into_iter()
        .flat_map(|v| match v {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        })
        .collect();

    let matched: Vec<Value> = foreign
        .iter()
        .filter(|f| {
            lookup_path(f, &join.foreign_field)
                .into_iter()
                .any(|v| local.contains(v))
        })
        .cloned()
        .collect();

    if let Value::Object(map) = &mut document {
        map.insert(join.alias.clone(), Value::Array(matched));
    }
    document
}

/// One output document per array element under the alias
fn unwind(document: Value, flatten: &Flatten) -> Vec<Value> {
    let Value::Object(mut map) = document else {
        return Vec::new();
    };

    let elements = match map.remove(&flatten.alias) {
        Some(Value::Array(items)) if !items.is_empty() => items,
        Some(Value::Array(_)) | Some(Value::Null) | None => {
            if !flatten.preserve_null_and_empty {
                return Vec::new();
            }
            if let Some(index) = &flatten.index_field {
                map.insert(index.clone(), Value::Null);
            }
            return vec![Value::Object(map)];
        }
        Some(single) => {
            map.insert(flatten.alias.clone(), single);
            if let Some(index) = &flatten.index_field {
                map.insert(index.clone(), Value::Null);
            }
            return vec![Value::Object(map)];
        }
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(i, element)| {
            let mut out = map.clone();
            out.insert(flatten.alias.clone(), element);
            if let Some(index) = &flatten.index_field {
                out.insert(index.clone(), Value::from(i as u64));
            }
            Value::Object(out)
        })
        .collect()
}

impl DocumentStore for MemoryStore {
    fn aggregate<'a>(
        &'a self,
        collection: &'a str,
        pipeline: &'a [Stage],
    ) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async move { self.run_pipeline(collection, pipeline) })
    }

    fn count<'a>(&'a self, collection: &'a str, criteria: &'a MatchExpr) -> StoreFuture<'a, u64> {
        Box::pin(async move { self.count_matching(collection, criteria) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Predicate;
    use crate::planner::SortSpec;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_documents(
                "item",
                vec![
                    json!({"id": "i1", "name": "bolt", "owner": {"id": "p1"}}),
                    json!({"id": "i2", "name": "nut", "owner": {"id": "p2"}}),
                    json!({"id": "i3", "name": "gear"}),
                ],
            )
            .with_documents(
                "person",
                vec![
                    json!({"id": "p1", "name": "bob"}),
                    json!({"id": "p2", "name": "alice"}),
                ],
            )
    }

    fn owner_join() -> [Stage; 2] {
        [
            Stage::Lookup(Join {
                from: "person".into(),
                local_field: "owner.id".into(),
                foreign_field: "id".into(),
                alias: "__owner".into(),
            }),
            Stage::Unwind(Flatten::preserving("__owner").with_index_field("__owner_index")),
        ]
    }

    #[test]
    fn test_lookup_and_unwind_preserve_unmatched() {
        let docs = store().run_pipeline("item", &owner_join()).unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0]["__owner"]["name"], json!("bob"));
        assert_eq!(docs[0]["__owner_index"], json!(0));
        assert!(docs[2].get("__owner").is_none());
        assert_eq!(docs[2]["__owner_index"], json!(null));
    }

    #[test]
    fn test_unwind_without_preserve_drops_unmatched() {
        let [lookup, _] = owner_join();
        let pipeline = vec![
            lookup,
            Stage::Unwind(Flatten {
                alias: "__owner".into(),
                preserve_null_and_empty: false,
                index_field: None,
            }),
        ];
        assert_eq!(store().run_pipeline("item", &pipeline).unwrap().len(), 2);
    }

    #[test]
    fn test_match_sort_skip_limit() {
        let mut pipeline = owner_join().to_vec();
        pipeline.push(Stage::Match(MatchExpr::field(
            "__owner.name",
            Predicate::SubstringPattern("i".into()),
        )));
        pipeline.push(Stage::Sort(vec![SortSpec::asc("name")]));
        let docs = store().run_pipeline("item", &pipeline).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["id"], json!("i2"));

        let paged = store()
            .run_pipeline(
                "item",
                &[
                    Stage::Match(MatchExpr::All),
                    Stage::Sort(vec![SortSpec::desc("name")]),
                    Stage::Skip(1),
                    Stage::Limit(1),
                ],
            )
            .unwrap();
        assert_eq!(paged[0]["name"], json!("gear"));
    }

    #[test]
    fn test_patch_and_remove() {
        let store = store();
        let mut patch = Map::new();
        patch.insert("name".to_string(), json!("screw"));

        let patched = store.patch("item", "id", &json!("i1"), &patch).unwrap();
        assert_eq!(patched.unwrap()["name"], json!("screw"));
        assert!(store.patch("item", "id", &json!("i9"), &patch).unwrap().is_none());
        assert!(store.remove("item", "id", &json!("i9")).unwrap().is_none());
        assert!(store.remove("item", "id", &json!("i2")).unwrap().is_some());
        assert_eq!(store.len("item"), 2);
    }

    #[tokio::test]
    async fn test_trait_count_uses_criteria() {
        let store = store();
        let criteria = MatchExpr::field("owner.id", Predicate::Equals(json!("p1")));
        assert_eq!(store.count("item", &criteria).await.unwrap(), 1);
        assert_eq!(store.count("missing", &MatchExpr::All).await.unwrap(), 0);
    }
}

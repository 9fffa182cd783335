//! Result types for search execution

use serde::Serialize;
use serde_json::Value;

use crate::planner::{ExtraField, SchemaRef};

/// Result of one search
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// Documents in pipeline order
    pub documents: Vec<Value>,
    /// Count of documents matching the base criteria, ignoring paging
    pub total: u64,
    /// Schemas the client should refresh
    pub touched_schemas: Vec<SchemaRef>,
    /// Extra-field descriptors in order
    pub extra_fields: Vec<ExtraField>,
    /// Requested includes that name relation attributes
    pub include: Vec<String>,
}

impl SearchResult {
    /// Returns true if no documents matched
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the number of documents returned
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns an iterator over the documents
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.documents.iter()
    }
}

/// Result of a single-document lookup
#[derive(Debug, Clone, Serialize)]
pub struct FoundDocument {
    pub document: Value,
    pub touched_schemas: Vec<SchemaRef>,
    pub extra_fields: Vec<ExtraField>,
}

impl FoundDocument {
    /// Takes the first document of a search, if any
    pub fn from_search(result: SearchResult) -> Option<Self> {
        let SearchResult {
            documents,
            touched_schemas,
            extra_fields,
            ..
        } = result;
        let document = documents.into_iter().next()?;
        Some(Self {
            document,
            touched_schemas,
            extra_fields,
        })
    }
}

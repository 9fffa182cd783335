//! Search request structures
//!
//! Defines the parsed request representation consumed by the planner.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::filter::FilterValue;
use crate::schema::SchemaRegistry;

/// Page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl PageSpec {
    pub fn new(offset: Option<u64>, limit: Option<u64>) -> Self {
        Self { offset, limit }
    }
}

/// Schema versions the client already holds, as `name@version` pairs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CachedSchemas {
    entries: Vec<(String, String)>,
}

impl CachedSchemas {
    /// Parses a comma-separated `name@version` list.
    ///
    /// Empty entries and entries without `@` are ignored.
    pub fn parse(header: &str) -> Self {
        let entries = header
            .split(',')
            .map(str::trim)
            .filter_map(|entry| entry.split_once('@'))
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .collect();
        Self { entries }
    }

    /// Version the client claims to hold for `name`
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// True only when the client's version equals the registry's current one
    pub fn holds_current(&self, name: &str, registry: &SchemaRegistry) -> bool {
        match (self.version_of(name), registry.version_of(name)) {
            (Some(held), Some(current)) => held == current,
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders back to header form
    pub fn to_header(&self) -> String {
        self.entries
            .iter()
            .map(|(n, v)| format!("{}@{}", n, v))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Serialize for CachedSchemas {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_header())
    }
}

impl<'de> Deserialize<'de> for CachedSchemas {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let header = String::deserialize(deserializer)?;
        Ok(CachedSchemas::parse(&header))
    }
}

/// One search request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Requested resource type
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Identifier lookup; ignores `filter` when present
    pub id: Option<String>,
    /// Filter map: attribute name or relationship path to token(s)
    pub filter: BTreeMap<String, FilterValue>,
    /// Sort keys, optionally prefixed `>` (ascending) or `<` (descending)
    pub sort: Vec<String>,
    pub page: PageSpec,
    /// Relation attributes the caller wants included
    pub include: Vec<String>,
    /// Extra traversal paths in addition to the declared ones
    pub extra_paths: Vec<String>,
    /// Skip declared and explicit extra paths
    pub no_extra: bool,
    /// Schema versions the client already holds
    pub cached_schemas: CachedSchemas,
}

impl SearchRequest {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter.insert(key.into(), value.into());
        self
    }

    pub fn with_sort(mut self, key: impl Into<String>) -> Self {
        self.sort.push(key.into());
        self
    }

    pub fn with_page(mut self, offset: Option<u64>, limit: Option<u64>) -> Self {
        self.page = PageSpec::new(offset, limit);
        self
    }

    pub fn with_include(mut self, relation: impl Into<String>) -> Self {
        self.include.push(relation.into());
        self
    }

    pub fn with_extra_path(mut self, path: impl Into<String>) -> Self {
        self.extra_paths.push(path.into());
        self
    }

    pub fn without_extra(mut self) -> Self {
        self.no_extra = true;
        self
    }

    pub fn with_cached_schemas(mut self, header: &str) -> Self {
        self.cached_schemas = CachedSchemas::parse(header);
        self
    }
}

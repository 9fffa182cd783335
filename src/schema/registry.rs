//! Read-only schema registry
//!
//! Built once by [`SchemaLoader`](super::SchemaLoader) and shared by every
//! in-flight request without locking.

use std::collections::HashMap;

use super::errors::{SchemaError, SchemaResult};
use super::types::ResourceSchema;

/// A relation attribute whose target type is not registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRelation {
    pub resource_type: String,
    pub attribute: String,
    pub target: String,
}

/// Immutable mapping from resource type name to schema
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, ResourceSchema>,
}

impl SchemaRegistry {
    pub(crate) fn from_map(schemas: HashMap<String, ResourceSchema>) -> Self {
        Self { schemas }
    }

    /// Builds a registry from already-validated schemas.
    ///
    /// Duplicate names are rejected the same way the loader rejects them.
    pub fn from_schemas(schemas: impl IntoIterator<Item = ResourceSchema>) -> SchemaResult<Self> {
        let mut map = HashMap::new();
        for schema in schemas {
            schema
                .validate_structure()
                .map_err(|e| SchemaError::malformed_schema(&schema.name, e))?;
            if map.contains_key(&schema.name) {
                return Err(SchemaError::schema_immutable(&schema.name));
            }
            map.insert(schema.name.clone(), schema);
        }
        Ok(Self { schemas: map })
    }

    /// Gets a schema by resource type name.
    pub fn get(&self, name: &str) -> Option<&ResourceSchema> {
        self.schemas.get(name)
    }

    /// Gets a schema or fails with AERO_UNKNOWN_SCHEMA.
    pub fn require(&self, name: &str) -> SchemaResult<&ResourceSchema> {
        self.get(name).ok_or_else(|| SchemaError::unknown_schema(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns the current version of a registered type.
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|s| s.version.as_str())
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Lists relation attributes pointing at unregistered types, sorted by
    /// resource type then attribute.
    pub fn dangling_relations(&self) -> Vec<DanglingRelation> {
        let mut dangling = Vec::new();
        for name in self.names() {
            let Some(schema) = self.get(name) else { continue };
            for (attr, settings) in schema.relations() {
                if !self.contains(&settings.target) {
                    dangling.push(DanglingRelation {
                        resource_type: name.to_string(),
                        attribute: attr.name.clone(),
                        target: settings.target.clone(),
                    });
                }
            }
        }
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeDef, ScalarType};

    #[test]
    fn test_require_unknown() {
        let registry = SchemaRegistry::default();
        let err = registry.require("ghost").unwrap_err();
        assert_eq!(err.code().code(), "AERO_UNKNOWN_SCHEMA");
    }

    #[test]
    fn test_from_schemas_rejects_duplicates() {
        let result = SchemaRegistry::from_schemas(vec![
            ResourceSchema::new("a", "1"),
            ResourceSchema::new("a", "2"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dangling_relations() {
        let registry = SchemaRegistry::from_schemas(vec![
            ResourceSchema::new("item", "1")
                .with_attribute(AttributeDef::relation("owner", "person"))
                .with_attribute(AttributeDef::relation("maker", "company"))
                .with_attribute(AttributeDef::scalar("title", ScalarType::String)),
            ResourceSchema::new("person", "1"),
        ])
        .unwrap();

        let dangling = registry.dangling_relations();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].attribute, "maker");
        assert_eq!(dangling[0].target, "company");
    }

    #[test]
    fn test_names_sorted() {
        let registry = SchemaRegistry::from_schemas(vec![
            ResourceSchema::new("b", "1"),
            ResourceSchema::new("a", "1"),
        ])
        .unwrap();
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.version_of("a"), Some("1"));
    }
}

//! Relationship path resolution
//!
//! Walks a `/`-separated path across the schema graph, one relation hop per
//! segment. Resolution is fail-fast per path: the first bad segment ends the
//! walk and the path is reported incomplete.

use std::fmt;

use super::planner::PlannerOptions;
use crate::schema::SchemaRegistry;

/// Why a hop could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopError {
    /// Attribute missing on the current schema, or not a relation
    InvalidField,
    /// Relation target is not a registered resource type
    InvalidForm,
}

impl HopError {
    pub fn as_str(&self) -> &'static str {
        match self {
            HopError::InvalidField => "invalid_field",
            HopError::InvalidForm => "invalid_form",
        }
    }
}

impl fmt::Display for HopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One step across a relation attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipHop {
    /// Attribute name on the source schema (after up-link rewriting)
    pub field: String,
    /// Target resource type; empty when the attribute itself is invalid
    pub target: String,
    /// Traversal key on the target
    pub traversal_key: String,
    /// Identifier field of the target schema
    pub foreign_field: String,
    /// Resolution failure, if any
    pub error: Option<HopError>,
}

impl RelationshipHop {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    fn invalid(field: String, target: String, error: HopError) -> Self {
        Self {
            field,
            target,
            traversal_key: String::new(),
            foreign_field: String::new(),
            error: Some(error),
        }
    }
}

/// Result of resolving one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Requested segments, as given
    pub segments: Vec<String>,
    /// Hops produced; stops after the first invalid one
    pub hops: Vec<RelationshipHop>,
}

impl ResolvedPath {
    /// True iff every segment produced a valid hop
    pub fn is_complete(&self) -> bool {
        !self.segments.is_empty()
            && self.hops.len() == self.segments.len()
            && self.hops.iter().all(RelationshipHop::is_valid)
    }

    /// The first failure, if any
    pub fn failure(&self) -> Option<(&str, HopError)> {
        self.hops
            .iter()
            .find_map(|hop| hop.error.map(|e| (hop.field.as_str(), e)))
    }

    /// Target of the last hop
    pub fn final_target(&self) -> Option<&str> {
        self.hops.last().map(|hop| hop.target.as_str())
    }
}

/// Resolves relationship paths against a registry
pub struct PathResolver<'a> {
    registry: &'a SchemaRegistry,
    options: &'a PlannerOptions,
}

impl<'a> PathResolver<'a> {
    pub fn new(registry: &'a SchemaRegistry, options: &'a PlannerOptions) -> Self {
        Self { registry, options }
    }

    /// Resolves `segments` starting from `base_type`.
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S], base_type: &str) -> ResolvedPath {
        let mut hops = Vec::with_capacity(segments.len());
        let mut cursor = self.registry.get(base_type);

        for segment in segments {
            let segment = segment.as_ref();
            let field = if segment == self.options.uplink_marker {
                self.options.parent_field.clone()
            } else {
                segment.to_string()
            };

            let settings = cursor
                .and_then(|schema| schema.attribute(&field))
                .and_then(|attr| attr.relation_settings());
            let Some(settings) = settings else {
                hops.push(RelationshipHop::invalid(field, String::new(), HopError::InvalidField));
                break;
            };

            let Some(target_schema) = self.registry.get(&settings.target) else {
                hops.push(RelationshipHop::invalid(
                    field,
                    settings.target.clone(),
                    HopError::InvalidForm,
                ));
                break;
            };

            hops.push(RelationshipHop {
                field,
                target: settings.target.clone(),
                traversal_key: settings.traversal_key_or_default().to_string(),
                foreign_field: target_schema.id_field.clone(),
                error: None,
            });
            cursor = Some(target_schema);
        }

        ResolvedPath {
            segments: segments.iter().map(|s| s.as_ref().to_string()).collect(),
            hops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeDef, ResourceSchema, ScalarType};

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_schemas(vec![
            ResourceSchema::new("form_list", "1")
                .with_attribute(AttributeDef::relation("parentID", "lahuojihua")),
            ResourceSchema::new("lahuojihua", "1")
                .with_attribute(AttributeDef::relation("maker", "charger"))
                .with_attribute(AttributeDef::relation("ghost", "nowhere"))
                .with_attribute(AttributeDef::scalar("title", ScalarType::String)),
            ResourceSchema::new("charger", "1")
                .with_attribute(AttributeDef::relation("leader", "person").with_traversal_key("name")),
            ResourceSchema::new("person", "1")
                .with_attribute(AttributeDef::scalar("name", ScalarType::String)),
        ])
        .unwrap()
    }

    #[test]
    fn test_uplink_marker_rewritten() {
        let registry = registry();
        let options = PlannerOptions::default();
        let resolver = PathResolver::new(&registry, &options);

        let path = resolver.resolve(&["~", "maker", "leader"], "form_list");
        assert!(path.is_complete());

        let fields: Vec<&str> = path.hops.iter().map(|h| h.field.as_str()).collect();
        assert_eq!(fields, vec!["parentID", "maker", "leader"]);
        assert_eq!(path.hops[2].traversal_key, "name");
        assert_eq!(path.hops[0].traversal_key, "id");
        assert_eq!(path.final_target(), Some("person"));
    }

    #[test]
    fn test_missing_or_scalar_attribute_is_invalid_field() {
        let registry = registry();
        let options = PlannerOptions::default();
        let resolver = PathResolver::new(&registry, &options);

        let path = resolver.resolve(&["nope", "maker"], "lahuojihua");
        assert!(!path.is_complete());
        assert_eq!(path.hops.len(), 1);
        assert_eq!(path.failure(), Some(("nope", HopError::InvalidField)));

        let scalar = resolver.resolve(&["title"], "lahuojihua");
        assert_eq!(scalar.failure(), Some(("title", HopError::InvalidField)));
    }

    #[test]
    fn test_unregistered_target_is_invalid_form() {
        let registry = registry();
        let options = PlannerOptions::default();
        let resolver = PathResolver::new(&registry, &options);

        let path = resolver.resolve(&["ghost", "anything"], "lahuojihua");
        assert!(!path.is_complete());
        assert_eq!(path.hops.len(), 1);
        assert_eq!(path.hops[0].error, Some(HopError::InvalidForm));
        assert_eq!(path.hops[0].target, "nowhere");
    }

    #[test]
    fn test_empty_path_is_incomplete() {
        let registry = registry();
        let options = PlannerOptions::default();
        let resolver = PathResolver::new(&registry, &options);
        let empty: [&str; 0] = [];
        assert!(!resolver.resolve(&empty, "lahuojihua").is_complete());
    }
}

//! Resource schema type definitions
//!
//! Supported attribute kinds:
//! - scalar: string, int, float, bool, timestamp, uuid, any
//! - relation: reference to another resource type (one or many)
//!
//! Relationship settings are resolved into [`AttributeKind`] once, when the
//! schema is deserialized, and never re-inspected per request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::TryFrom;

/// Traversal key used when a relation does not declare one
pub const DEFAULT_TRAVERSAL_KEY: &str = "id";

/// Key holding the referenced identifier inside a relation value
pub const REFERENCE_ID_KEY: &str = "id";

/// Scalar attribute types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// Non-empty UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
    /// RFC 3339 timestamp or epoch milliseconds
    Timestamp,
    /// UUID in any accepted textual form
    Uuid,
    /// Anything, passed through unchanged
    Any,
}

impl ScalarType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Bool => "bool",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Uuid => "uuid",
            ScalarType::Any => "any",
        }
    }

    /// Parses a type name as written in schema files
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(ScalarType::String),
            "int" | "integer" => Some(ScalarType::Int),
            "float" | "number" => Some(ScalarType::Float),
            "bool" | "boolean" => Some(ScalarType::Bool),
            "timestamp" | "date" => Some(ScalarType::Timestamp),
            "uuid" => Some(ScalarType::Uuid),
            "any" => Some(ScalarType::Any),
            _ => None,
        }
    }
}

/// Relation cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    One,
    Many,
}

/// Settings of a relation attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSettings {
    /// Target resource type (also the target collection)
    pub target: String,
    /// One or many
    pub cardinality: Cardinality,
    /// Field on the target used to resolve/display the related document
    pub traversal_key: Option<String>,
}

impl RelationSettings {
    /// Returns the declared traversal key, or the identifier when none is declared
    pub fn traversal_key_or_default(&self) -> &str {
        self.traversal_key.as_deref().unwrap_or(DEFAULT_TRAVERSAL_KEY)
    }
}

/// Closed attribute variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    Scalar(ScalarType),
    Relation(RelationSettings),
}

/// Attribute definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDef {
    /// Attribute name
    pub name: String,
    /// Scalar type or relation settings
    pub kind: AttributeKind,
    /// Relationship path this attribute's value is inherited from
    pub inherited: Option<String>,
}

impl AttributeDef {
    /// Create a scalar attribute
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Scalar(scalar),
            inherited: None,
        }
    }

    /// Create a to-one relation attribute without a traversal key
    pub fn relation(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Relation(RelationSettings {
                target: target.into(),
                cardinality: Cardinality::One,
                traversal_key: None,
            }),
            inherited: None,
        }
    }

    /// Set the traversal key (relations only)
    pub fn with_traversal_key(mut self, key: impl Into<String>) -> Self {
        if let AttributeKind::Relation(settings) = &mut self.kind {
            settings.traversal_key = Some(key.into());
        }
        self
    }

    /// Mark the relation as to-many (relations only)
    pub fn many(mut self) -> Self {
        if let AttributeKind::Relation(settings) = &mut self.kind {
            settings.cardinality = Cardinality::Many;
        }
        self
    }

    /// Declare the path this attribute inherits its value from
    pub fn inherited_from(mut self, path: impl Into<String>) -> Self {
        self.inherited = Some(path.into());
        self
    }

    /// Returns relation settings if this is a relation
    pub fn relation_settings(&self) -> Option<&RelationSettings> {
        match &self.kind {
            AttributeKind::Relation(settings) => Some(settings),
            AttributeKind::Scalar(_) => None,
        }
    }

    /// Returns the scalar type if this is a scalar
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match &self.kind {
            AttributeKind::Scalar(scalar) => Some(*scalar),
            AttributeKind::Relation(_) => None,
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, AttributeKind::Relation(_))
    }
}

/// Complete resource schema
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct ResourceSchema {
    /// Resource type name (also the collection name)
    pub name: String,
    /// Schema version, compared against client-cached versions
    pub version: String,
    /// Identifier field on documents of this type
    pub id_field: String,
    /// Declared extra traversal paths (`seg/seg/field[:Title],...`)
    pub extra_paths: Vec<String>,
    /// Attributes keyed by name
    pub attributes: BTreeMap<String, AttributeDef>,
}

impl ResourceSchema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            id_field: DEFAULT_TRAVERSAL_KEY.to_string(),
            extra_paths: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.insert(attribute.name.clone(), attribute);
        self
    }

    /// Add a declared extra path
    pub fn with_extra_path(mut self, path: impl Into<String>) -> Self {
        self.extra_paths.push(path.into());
        self
    }

    /// Looks up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.get(name)
    }

    /// Relation attributes in name order
    pub fn relations(&self) -> impl Iterator<Item = (&AttributeDef, &RelationSettings)> {
        self.attributes
            .values()
            .filter_map(|attr| attr.relation_settings().map(|settings| (attr, settings)))
    }

    /// (attribute name, path) for every inherited attribute, in name order
    pub fn inherited_paths(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .values()
            .filter_map(|attr| attr.inherited.as_deref().map(|path| (attr.name.as_str(), path)))
    }

    /// Validates the schema structure itself (not a document)
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Schema must have a non-empty name".into());
        }
        if self.id_field.trim().is_empty() {
            return Err("Schema identifier field must not be empty".into());
        }

        for attr in self.attributes.values() {
            if let Some(settings) = attr.relation_settings() {
                if settings.target.trim().is_empty() {
                    return Err(format!("Relation '{}' must declare a target", attr.name));
                }
                if matches!(settings.traversal_key.as_deref(), Some(k) if k.trim().is_empty()) {
                    return Err(format!(
                        "Relation '{}' declares an empty traversal key",
                        attr.name
                    ));
                }
            }
            if matches!(attr.inherited.as_deref(), Some(p) if !p.contains('/')) {
                return Err(format!(
                    "Inherited path of '{}' must contain at least two segments",
                    attr.name
                ));
            }
        }

        Ok(())
    }
}

/// On-disk attribute shape
#[derive(Debug, Clone, Deserialize)]
struct RawAttribute {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    cardinality: Cardinality,
    #[serde(default)]
    traversal_key: Option<String>,
    #[serde(default)]
    inherited: Option<String>,
}

/// On-disk schema shape
#[derive(Debug, Clone, Deserialize)]
struct RawSchema {
    name: String,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default = "default_id_field")]
    id_field: String,
    #[serde(default)]
    extra_paths: Vec<String>,
    #[serde(default)]
    attributes: BTreeMap<String, RawAttribute>,
}

fn default_version() -> String {
    "1".to_string()
}

fn default_id_field() -> String {
    DEFAULT_TRAVERSAL_KEY.to_string()
}

impl TryFrom<RawSchema> for ResourceSchema {
    type Error = String;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        let mut attributes = BTreeMap::new();

        for (name, attr) in raw.attributes {
            let kind = if attr.type_name == "relation" {
                let target = attr
                    .target
                    .ok_or_else(|| format!("Relation '{}' must declare a target", name))?;
                AttributeKind::Relation(RelationSettings {
                    target,
                    cardinality: attr.cardinality,
                    traversal_key: attr.traversal_key,
                })
            } else {
                let scalar = ScalarType::from_name(&attr.type_name).ok_or_else(|| {
                    format!("Attribute '{}' has unknown type '{}'", name, attr.type_name)
                })?;
                AttributeKind::Scalar(scalar)
            };

            attributes.insert(
                name.clone(),
                AttributeDef {
                    name,
                    kind,
                    inherited: attr.inherited,
                },
            );
        }

        // Paths are newline-separated in some exported schemas
        let extra_paths = raw
            .extra_paths
            .iter()
            .flat_map(|entry| entry.split('\n'))
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ResourceSchema {
            name: raw.name,
            version: raw.version,
            id_field: raw.id_field,
            extra_paths,
            attributes,
        })
    }
}

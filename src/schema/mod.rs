//! Schema subsystem for aerorel
//!
//! Resource schemas describe attributes and the relationships between
//! resource types. They are loaded once at startup and are read-only for the
//! lifetime of the process.
//!
//! # Design Principles
//!
//! - Relationship settings are resolved into a closed variant at load time
//! - The registry is an explicit value, injected wherever it is needed
//! - Filter values are cast against declared types only, never inferred

mod errors;
mod loader;
mod registry;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity, ValidationDetails};
pub use loader::SchemaLoader;
pub use registry::{DanglingRelation, SchemaRegistry};
pub use types::{
    AttributeDef, AttributeKind, Cardinality, RelationSettings, ResourceSchema, ScalarType,
    DEFAULT_TRAVERSAL_KEY, REFERENCE_ID_KEY,
};
pub use validator::TypedValidator;

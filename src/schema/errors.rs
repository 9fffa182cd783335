//! Schema error types
//!
//! Error codes:
//! - AERO_SCHEMA_MALFORMED (FATAL)
//! - AERO_SCHEMA_IMMUTABLE (FATAL)
//! - AERO_UNKNOWN_SCHEMA (REJECT)
//! - AERO_FILTER_CAST_FAILED (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
    /// Registry cannot be built, process must not start serving
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema file unreadable or structurally invalid
    AeroSchemaMalformed,
    /// Resource type registered twice
    AeroSchemaImmutable,
    /// Resource type not found in the registry
    AeroUnknownSchema,
    /// Filter value could not be cast to the declared attribute type
    AeroFilterCastFailed,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::AeroSchemaMalformed => "AERO_SCHEMA_MALFORMED",
            SchemaErrorCode::AeroSchemaImmutable => "AERO_SCHEMA_IMMUTABLE",
            SchemaErrorCode::AeroUnknownSchema => "AERO_UNKNOWN_SCHEMA",
            SchemaErrorCode::AeroFilterCastFailed => "AERO_FILTER_CAST_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::AeroSchemaMalformed | SchemaErrorCode::AeroSchemaImmutable => {
                Severity::Fatal
            }
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Cast failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Attribute or path the value was cast for (empty when unknown)
    pub field: String,
    /// Expected type
    pub expected: String,
    /// Raw value found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Returns a copy bound to the given field name
    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "expected {}, got '{}'", self.expected, self.actual)
        } else {
            write!(
                f,
                "field '{}': expected {}, got '{}'",
                self.field, self.expected, self.actual
            )
        }
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Resource type if applicable
    resource_type: Option<String>,
    /// Cast details if applicable
    details: Option<ValidationDetails>,
}

impl SchemaError {
    /// Create an error for a malformed schema file or definition
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::AeroSchemaMalformed,
            message: format!("Malformed schema '{}': {}", path.into(), reason.into()),
            resource_type: None,
            details: None,
        }
    }

    /// Create a schema immutable error (duplicate registration)
    pub fn schema_immutable(resource_type: impl Into<String>) -> Self {
        let name = resource_type.into();
        Self {
            code: SchemaErrorCode::AeroSchemaImmutable,
            message: format!("Resource type '{}' is already registered", name),
            resource_type: Some(name),
            details: None,
        }
    }

    /// Create an unknown schema error
    pub fn unknown_schema(resource_type: impl Into<String>) -> Self {
        let name = resource_type.into();
        Self {
            code: SchemaErrorCode::AeroUnknownSchema,
            message: format!("Resource type '{}' not found", name),
            resource_type: Some(name),
            details: None,
        }
    }

    /// Create a cast failure error
    pub fn cast_failed(details: ValidationDetails) -> Self {
        Self {
            code: SchemaErrorCode::AeroFilterCastFailed,
            message: format!("Filter value rejected: {}", details),
            resource_type: None,
            details: Some(details),
        }
    }

    /// Attach the attribute name to a cast failure
    pub fn with_field(self, field: &str) -> Self {
        match self.details {
            Some(details) if details.field.is_empty() => {
                Self::cast_failed(details.for_field(field))
            }
            _ => self,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the resource type if applicable
    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    /// Returns cast details if applicable
    pub fn details(&self) -> Option<&ValidationDetails> {
        self.details.as_ref()
    }

    /// Returns true for filter cast failures
    pub fn is_cast_failure(&self) -> bool {
        self.code == SchemaErrorCode::AeroFilterCastFailed
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

//! Planner error types
//!
//! Error codes:
//! - AERO_UNKNOWN_RESOURCE (REJECT)
//! - AERO_FILTER_CAST_FAILED (REJECT)
//!
//! Unresolvable relationship paths are not errors: they are dropped and
//! logged, and planning continues.

use std::fmt;

use crate::schema::{SchemaError, ValidationDetails};

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Requested resource type is not registered
    AeroUnknownResource,
    /// Filter value could not be cast to the declared type
    AeroFilterCastFailed,
}

impl PlannerErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::AeroUnknownResource => "AERO_UNKNOWN_RESOURCE",
            PlannerErrorCode::AeroFilterCastFailed => "AERO_FILTER_CAST_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone)]
pub struct PlannerError {
    /// Error code
    code: PlannerErrorCode,
    /// Human-readable message
    message: String,
    /// Resource type if applicable
    resource_type: Option<String>,
    /// Cast details for validation failures
    details: Option<ValidationDetails>,
}

impl PlannerError {
    /// Create an unknown resource error
    pub fn unknown_resource(resource_type: impl Into<String>) -> Self {
        let name = resource_type.into();
        Self {
            code: PlannerErrorCode::AeroUnknownResource,
            message: format!("Resource type '{}' is not registered", name),
            resource_type: Some(name),
            details: None,
        }
    }

    /// Create a validation error from cast details
    pub fn cast_failed(details: ValidationDetails) -> Self {
        Self {
            code: PlannerErrorCode::AeroFilterCastFailed,
            message: format!("Filter value rejected: {}", details),
            resource_type: None,
            details: Some(details),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
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
    pub fn is_validation(&self) -> bool {
        self.code == PlannerErrorCode::AeroFilterCastFailed
    }
}

impl From<SchemaError> for PlannerError {
    fn from(err: SchemaError) -> Self {
        match err.details() {
            Some(details) if err.is_cast_failure() => Self::cast_failed(details.clone()),
            _ => Self::unknown_resource(err.resource_type().unwrap_or(err.message())),
        }
    }
}

impl fmt::Display for PlannerError {
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

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PlannerErrorCode::AeroUnknownResource.code(),
            "AERO_UNKNOWN_RESOURCE"
        );
        assert_eq!(
            PlannerErrorCode::AeroFilterCastFailed.code(),
            "AERO_FILTER_CAST_FAILED"
        );
    }

    #[test]
    fn test_cast_failure_converts_with_details() {
        let schema_err = SchemaError::cast_failed(ValidationDetails::new("qty", "int", "x"));
        let err = PlannerError::from(schema_err);
        assert!(err.is_validation());
        assert_eq!(err.details().unwrap().field, "qty");
    }

    #[test]
    fn test_unknown_schema_converts_to_unknown_resource() {
        let err = PlannerError::from(SchemaError::unknown_schema("ghost"));
        assert_eq!(err.code(), PlannerErrorCode::AeroUnknownResource);
        assert!(err.to_string().contains("ghost"));
    }
}

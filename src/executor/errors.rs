//! Search and store error types
//!
//! Error codes:
//! - AERO_UNKNOWN_RESOURCE (404)
//! - AERO_FILTER_CAST_FAILED (400)
//! - AERO_RESOURCE_NOT_FOUND (404)
//! - AERO_STORE_FAILED (500)

use thiserror::Error;

use crate::planner::{PlannerError, PlannerErrorCode};
use crate::schema::ValidationDetails;

/// Failure reported by a document store, propagated verbatim
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the search orchestrator
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Requested resource type is not registered
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// Filter value failed to cast to its declared type
    #[error("Invalid filter: {message}")]
    Validation {
        message: String,
        details: Option<ValidationDetails>,
    },

    /// No document with the requested identifier
    #[error("Resource not found: {resource_type}/{id}")]
    NotFound { resource_type: String, id: String },

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store round-trip failed
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}

impl SearchError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::UnknownResource(_) => "AERO_UNKNOWN_RESOURCE",
            SearchError::Validation { .. } => "AERO_FILTER_CAST_FAILED",
            SearchError::NotFound { .. } => "AERO_RESOURCE_NOT_FOUND",
            SearchError::Store(_) => "AERO_STORE_FAILED",
        }
    }

    /// HTTP-like status for the host framework
    pub fn status_code(&self) -> u16 {
        match self {
            SearchError::Validation { .. } => 400,
            SearchError::UnknownResource(_) | SearchError::NotFound { .. } => 404,
            SearchError::Store(_) => 500,
        }
    }

    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        SearchError::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<PlannerError> for SearchError {
    fn from(err: PlannerError) -> Self {
        match err.code() {
            PlannerErrorCode::AeroUnknownResource => {
                SearchError::UnknownResource(err.resource_type().unwrap_or_default().to_string())
            }
            PlannerErrorCode::AeroFilterCastFailed => SearchError::Validation {
                message: err.message().to_string(),
                details: err.details().cloned(),
            },
        }
    }
}

/// Result type for orchestrator operations
pub type OrchestratorResult<T> = Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(SearchError::UnknownResource("x".into()).status_code(), 404);
        assert_eq!(SearchError::not_found("item", "1").status_code(), 404);
        assert_eq!(SearchError::Store(StoreError::new("down")).status_code(), 500);
        assert_eq!(
            SearchError::Validation {
                message: "bad".into(),
                details: None
            }
            .status_code(),
            400
        );
    }

    #[test]
    fn test_codes() {
        assert_eq!(SearchError::not_found("item", "1").code(), "AERO_RESOURCE_NOT_FOUND");
        assert_eq!(SearchError::from(StoreError::new("x")).code(), "AERO_STORE_FAILED");
    }

    #[test]
    fn test_store_error_propagates_verbatim() {
        let err = SearchError::from(StoreError::new("connection reset"));
        assert_eq!(err.to_string(), "Store failure: connection reset");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_from_planner_error() {
        let err = SearchError::from(PlannerError::cast_failed(ValidationDetails::new(
            "qty", "int", "x",
        )));
        assert_eq!(err.code(), "AERO_FILTER_CAST_FAILED");
        match err {
            SearchError::Validation { details, .. } => {
                assert_eq!(details.unwrap().field, "qty")
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

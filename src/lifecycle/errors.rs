//! Write lifecycle error types
//!
//! Error codes:
//! - AERO_WRITE_REJECTED (400)
//! - AERO_INVALID_DOCUMENT (400)
//! - AERO_RESOURCE_NOT_FOUND (404)
//! - AERO_SEQUENCE_FAILED (500)
//! - AERO_STORE_FAILED (500)

use thiserror::Error;

use crate::executor::StoreError;

/// Errors surfaced by the resource writer
#[derive(Debug, Clone, Error)]
pub enum WriteError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// An interceptor refused the write
    #[error("Write rejected by {interceptor}: {reason}")]
    Rejected { interceptor: String, reason: String },

    /// Payload is not a JSON object
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// No document with the requested identifier
    #[error("Resource not found: {resource_type}/{id}")]
    NotFound { resource_type: String, id: String },

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Sequence generator failed to produce an ID
    #[error("Sequence failure: {0}")]
    Sequence(String),

    /// Store write failed
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}

impl WriteError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            WriteError::Rejected { .. } => "AERO_WRITE_REJECTED",
            WriteError::InvalidDocument(_) => "AERO_INVALID_DOCUMENT",
            WriteError::NotFound { .. } => "AERO_RESOURCE_NOT_FOUND",
            WriteError::Sequence(_) => "AERO_SEQUENCE_FAILED",
            WriteError::Store(_) => "AERO_STORE_FAILED",
        }
    }

    /// HTTP-like status for the host framework
    pub fn status_code(&self) -> u16 {
        match self {
            WriteError::Rejected { .. } | WriteError::InvalidDocument(_) => 400,
            WriteError::NotFound { .. } => 404,
            WriteError::Sequence(_) | WriteError::Store(_) => 500,
        }
    }

    pub fn rejected(interceptor: impl Into<String>, reason: impl Into<String>) -> Self {
        WriteError::Rejected {
            interceptor: interceptor.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        WriteError::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// Result type for write operations
pub type WriteResult<T> = Result<T, WriteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = WriteError::rejected("audit", "locked");
        assert_eq!(err.to_string(), "Write rejected by audit: locked");
        assert_eq!(err.code(), "AERO_WRITE_REJECTED");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_store_failure_is_server_error() {
        let err = WriteError::from(StoreError::new("disk full"));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.code(), "AERO_STORE_FAILED");
    }
}

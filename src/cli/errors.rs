//! CLI-specific error types
//!
//! Every CLI error is fatal: it is printed to stderr and the process exits
//! non-zero.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration or schema loading failed
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// stdin/stdout or request file failure
    #[error("I/O error: {0}")]
    Io(String),

    /// Request JSON did not parse
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Planner rejected the request
    #[error("Request rejected: {code}: {reason}")]
    Rejected { code: String, reason: String },

    /// Relations point at unregistered types
    #[error("{0} dangling relation(s) found")]
    DanglingRelations(usize),
}

impl CliError {
    /// Get the error code string
    pub fn code(&self) -> &str {
        match self {
            CliError::Config(err) => err.code(),
            CliError::Io(_) => "AERO_CLI_IO_ERROR",
            CliError::InvalidRequest(_) => "AERO_CLI_INVALID_REQUEST",
            CliError::Rejected { code, .. } => code,
            CliError::DanglingRelations(_) => "AERO_CLI_DANGLING_RELATIONS",
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

//! Observability events for aerorel
//!
//! Events are explicit and typed. Each has a stable upper-snake name that
//! is emitted as the `event` field of the log record.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Startup
    /// Configuration loaded
    ConfigLoaded,
    /// Schema registry built
    SchemasLoaded,
    /// Relation attribute points at an unregistered type
    DanglingRelation,

    // Search
    /// Search request planned
    SearchPlanned,
    /// Search executed successfully
    SearchExecuted,
    /// Search rejected (unknown type, cast failure)
    SearchRejected,
    /// Store round-trip failed
    SearchFailed,
    /// Relationship path could not be resolved and was dropped
    PathDropped,
    /// Relation skipped during expansion
    RelationSkipped,
    /// Compiled pipeline (debug)
    PipelineCompiled,

    // Write lifecycle
    /// Write rejected by an interceptor
    WriteRejected,
    /// Write committed to the store
    WriteCommitted,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::DanglingRelation => "DANGLING_RELATION",
            Event::SearchPlanned => "SEARCH_PLANNED",
            Event::SearchExecuted => "SEARCH_EXECUTED",
            Event::SearchRejected => "SEARCH_REJECTED",
            Event::SearchFailed => "SEARCH_FAILED",
            Event::PathDropped => "PATH_DROPPED",
            Event::RelationSkipped => "RELATION_SKIPPED",
            Event::PipelineCompiled => "PIPELINE_COMPILED",
            Event::WriteRejected => "WRITE_REJECTED",
            Event::WriteCommitted => "WRITE_COMMITTED",
        }
    }

    /// Returns true for events that indicate a degraded request
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::DanglingRelation
                | Event::PathDropped
                | Event::RelationSkipped
                | Event::SearchRejected
                | Event::WriteRejected
        )
    }

    /// Returns true for events that indicate a failed operation
    pub fn is_error(&self) -> bool {
        matches!(self, Event::SearchFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

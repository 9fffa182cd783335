//! Structured logger
//!
//! A thin facade over `tracing`: one call emits one record whose `event`
//! field carries the stable event name. Resource type, error code and
//! reason are recorded as their own fields; the remaining pairs are
//! rendered in key order into `fields`.

use std::fmt;

use super::events::Event;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Debug,
    /// Normal operations
    Info,
    /// Recoverable issues
    Warn,
    /// Operation failures
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    /// Default severity for an event
    pub fn for_event(event: Event) -> Self {
        if event.is_error() {
            Severity::Error
        } else if event.is_warning() {
            Severity::Warn
        } else {
            Severity::Info
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured logger
pub struct Logger;

impl Logger {
    /// Emits a typed event at its default severity
    pub fn event(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::for_event(event), event.as_str(), fields);
    }

    /// Emits an event name with the given severity.
    ///
    /// `type`, `code` and `reason` become `resource_type`, `code` and
    /// `reason` fields; everything else is rendered into `fields`.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let record = Record::split(fields);
        macro_rules! emit {
            ($level:ident) => {
                tracing::$level!(
                    event = event,
                    resource_type = record.resource_type,
                    code = record.code,
                    reason = record.reason,
                    fields = %record.rest,
                )
            };
        }
        match severity {
            Severity::Debug => emit!(debug),
            Severity::Info => emit!(info),
            Severity::Warn => emit!(warn),
            Severity::Error => emit!(error),
        }
    }

    pub fn debug(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Debug, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

/// Fields of one log record
#[derive(Debug, Default, PartialEq, Eq)]
struct Record<'a> {
    resource_type: Option<&'a str>,
    code: Option<&'a str>,
    reason: Option<&'a str>,
    rest: String,
}

impl<'a> Record<'a> {
    fn split(fields: &[(&'a str, &'a str)]) -> Self {
        let mut record = Record::default();
        let mut rest = Vec::with_capacity(fields.len());
        for &(key, value) in fields {
            match key {
                "type" => record.resource_type = Some(value),
                "code" => record.code = Some(value),
                "reason" => record.reason = Some(value),
                _ => rest.push((key, value)),
            }
        }
        record.rest = render_fields(&rest);
        record
    }
}

/// Renders `k=v` pairs sorted by key
fn render_fields(fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

//! Observability subsystem for aerorel
//!
//! Provides:
//! - Typed lifecycle events with stable names
//! - Structured logging through `tracing`
//! - Scope-based begin/complete logging
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on planning or execution
//! 3. One log record = one event
//!
//! # Usage
//!
//! ```ignore
//! use aerorel::observability::{Event, Logger, ObservationScope};
//!
//! Logger::event(Event::PathDropped, &[("path", "owner/name")]);
//!
//! let scope = ObservationScope::new("SEARCH");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{init_tracing, Logger, Severity};
pub use scope::{ObservationScope, Timer};

//! aerorel - relationship paths compiled to aggregation pipelines
//!
//! Turns a search request over schema-described resources into a document
//! store aggregation pipeline: base criteria, one join per relationship hop,
//! filters pushed onto joined documents, sort and page window.

pub mod cli;
pub mod config;
pub mod executor;
pub mod filter;
pub mod lifecycle;
pub mod observability;
pub mod planner;
pub mod schema;
pub mod util;

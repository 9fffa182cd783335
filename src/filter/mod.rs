//! Filter subsystem for aerorel
//!
//! Parses filter tokens into typed predicates and compiles filter maps into
//! match criteria.
//!
//! # Design Principles
//!
//! - No inference: tokens are cast only against the declared attribute type
//! - Deterministic: keys compile in sorted order
//! - Pattern operands are literal text, never client-supplied regex

mod ast;
mod criteria;
mod parser;

pub use ast::{compare_values, lookup_path, FilterValue, MatchExpr, Predicate};
pub use criteria::compile_criteria;
pub(crate) use criteria::compile_alternatives;
pub use parser::parse_token;

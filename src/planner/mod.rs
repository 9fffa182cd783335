//! Query planner subsystem for aerorel
//!
//! Compiles a search request into an aggregation pipeline: base criteria,
//! one join/flatten pair per relationship hop, pushed-down filters on joined
//! documents, sort and page window.
//!
//! # Design Principles
//!
//! - Deterministic: same request and registry, same plan
//! - Planning is synchronous and never touches the store
//! - Unresolvable paths are dropped and logged, never fatal
//! - Joins are deduplicated by (from, localField, alias)

mod errors;
mod explain;
mod pipeline;
mod plan;
mod planner;
mod request;
mod resolver;

pub use errors::{PlannerError, PlannerErrorCode, PlannerResult};
pub use explain::ExplainPlan;
pub use pipeline::{
    alias_for, synthesize, Flatten, Join, PipelineBuilder, SortDirection, SortSpec, Stage,
    ALIAS_PREFIX,
};
pub use plan::{ExtraField, QueryPlan, SchemaRef};
pub use planner::{relation_alias, PlannerOptions, QueryPlanner};
pub use request::{CachedSchemas, PageSpec, SearchRequest};
pub use resolver::{HopError, PathResolver, RelationshipHop, ResolvedPath};

//! CLI command implementations
//!
//! Both commands load the config and schema directory, then run offline:
//! no store is contacted.

use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::observability::init_tracing;
use crate::planner::{ExplainPlan, PlannerOptions, QueryPlanner, SearchRequest};
use crate::schema::SchemaRegistry;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_json, write_text};

/// Dangling relation entry in the check report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingEntry {
    pub resource_type: String,
    pub attribute: String,
    pub target: String,
}

/// Output of `aerorel check`
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub schemas: Vec<String>,
    pub dangling: Vec<DanglingEntry>,
}

impl CheckReport {
    /// Builds the report for a loaded registry
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        Self {
            schemas: registry.names().into_iter().map(str::to_string).collect(),
            dangling: registry
                .dangling_relations()
                .into_iter()
                .map(|d| DanglingEntry {
                    resource_type: d.resource_type,
                    attribute: d.attribute,
                    target: d.target,
                })
                .collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty()
    }
}

/// Parse CLI args and run
pub fn run() -> CliResult<()> {
    init_tracing("warn");
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Explain {
            config,
            request,
            text,
        } => explain(&config, &request, text),
        Command::Check { config } => check(&config),
    }
}

/// Plans a request without executing it
pub fn plan_explain(
    registry: &SchemaRegistry,
    options: &PlannerOptions,
    request: &SearchRequest,
) -> ExplainPlan {
    match QueryPlanner::new(registry, options).plan(request) {
        Ok(plan) => ExplainPlan::from_plan(&plan),
        Err(err) => ExplainPlan::from_error(&err),
    }
}

/// Print the plan for one request.
///
/// The explain output is printed even when the request is rejected; the
/// command then fails with the rejection.
pub fn explain(config_path: &Path, request_source: &str, text: bool) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let registry = config.load_registry()?;
    let request = read_request(request_source)?;

    let explain = plan_explain(&registry, &config.planner_options(), &request);
    if text {
        write_text(&explain.to_string())?;
    } else {
        write_json(&explain)?;
    }

    if explain.accepted {
        Ok(())
    } else {
        Err(CliError::Rejected {
            code: explain.rejection_code.unwrap_or_default(),
            reason: explain.rejection_reason.unwrap_or_default(),
        })
    }
}

/// Report schemas and dangling relations
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let registry = config.load_registry()?;

    let report = CheckReport::from_registry(&registry);
    write_json(&report)?;

    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::DanglingRelations(report.dangling.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeDef, ResourceSchema, ScalarType};

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_schemas(vec![
            ResourceSchema::new("item", "1")
                .with_attribute(AttributeDef::scalar("qty", ScalarType::Int))
                .with_attribute(AttributeDef::relation("owner", "person")),
            ResourceSchema::new("person", "1")
                .with_attribute(AttributeDef::scalar("name", ScalarType::String))
                .with_attribute(AttributeDef::relation("team", "team")),
        ])
        .unwrap()
    }

    #[test]
    fn test_plan_explain_accepted() {
        let request = SearchRequest::new("item").with_filter("qty", ">2");
        let explain = plan_explain(&registry(), &PlannerOptions::default(), &request);
        assert!(explain.accepted);
        assert_eq!(explain.collection.as_deref(), Some("item"));
    }

    #[test]
    fn test_plan_explain_rejected() {
        let request = SearchRequest::new("item").with_filter("qty", "many");
        let explain = plan_explain(&registry(), &PlannerOptions::default(), &request);
        assert!(!explain.accepted);
        assert_eq!(
            explain.rejection_code.as_deref(),
            Some("AERO_FILTER_CAST_FAILED")
        );
    }

    #[test]
    fn test_check_report_lists_dangling() {
        let report = CheckReport::from_registry(&registry());
        assert_eq!(report.schemas, vec!["item", "person"]);
        assert_eq!(
            report.dangling,
            vec![DanglingEntry {
                resource_type: "person".into(),
                attribute: "team".into(),
                target: "team".into(),
            }]
        );
        assert!(!report.is_clean());
    }
}

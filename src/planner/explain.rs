//! Explain output
//!
//! Serializable and human-readable views of a plan or a planning failure.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::errors::PlannerError;
use super::plan::{ExtraField, QueryPlan, SchemaRef};

/// Explain output
#[derive(Debug, Clone, Serialize)]
pub struct ExplainPlan {
    /// Whether planning succeeded
    pub accepted: bool,
    /// Collection aggregated over
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Pipeline in wire form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Value>,
    /// Criteria used for the total count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_criteria: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_fields: Vec<ExtraField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub touched_schemas: Vec<SchemaRef>,
    /// Rejection error code (if rejected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_code: Option<String>,
    /// Rejection reason (if rejected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a successful query plan
    pub fn from_plan(plan: &QueryPlan) -> Self {
        Self {
            accepted: true,
            collection: Some(plan.collection.clone()),
            pipeline: Some(plan.pipeline_document()),
            count_criteria: Some(plan.criteria.to_document()),
            extra_fields: plan.extra_fields.clone(),
            touched_schemas: plan.touched_schemas.clone(),
            rejection_code: None,
            rejection_reason: None,
        }
    }

    /// Creates an explain plan from a planning error
    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            collection: None,
            pipeline: None,
            count_criteria: None,
            extra_fields: Vec::new(),
            touched_schemas: Vec::new(),
            rejection_code: Some(err.code().code().to_string()),
            rejection_reason: Some(err.message().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if let Some(collection) = &self.collection {
                writeln!(f, "Collection: {}", collection)?;
            }
            if let Some(Value::Array(stages)) = &self.pipeline {
                writeln!(f, "Pipeline:")?;
                for stage in stages {
                    writeln!(f, "  {}", stage)?;
                }
            }
            if !self.extra_fields.is_empty() {
                writeln!(f, "Extra fields:")?;
                for field in &self.extra_fields {
                    writeln!(f, "  - {} -> {}", field.path, field.value_path())?;
                }
            }
            if !self.touched_schemas.is_empty() {
                let names: Vec<String> = self
                    .touched_schemas
                    .iter()
                    .map(|s| format!("{}@{}", s.name, s.version))
                    .collect();
                writeln!(f, "Schemas: {}", names.join(","))?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}

//! Query plan
//!
//! Immutable, built fresh per request; nothing in it outlives the request.

use serde::Serialize;
use serde_json::Value;

use super::pipeline::{SortSpec, Stage};
use super::request::PageSpec;
use crate::filter::MatchExpr;

/// Descriptor of one field reached through an extra traversal path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtraField {
    /// Alias the joined document lives under
    pub alias: String,
    /// Leaf field on the joined document
    pub field: String,
    /// Display title, when declared
    pub title: Option<String>,
    /// Resource type owning the leaf field
    pub table: String,
    /// `seg/.../field` as written
    pub path: String,
    /// Attribute inheriting its value through this path
    pub inherited_by: Option<String>,
}

impl ExtraField {
    /// Dotted path of the value inside result documents
    pub fn value_path(&self) -> String {
        format!("{}.{}", self.alias, self.field)
    }
}

/// A schema the response references, with the version sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaRef {
    pub name: String,
    pub version: String,
}

/// Plan for one search request
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Collection to aggregate over
    pub collection: String,
    /// Base criteria; also used alone for the total count
    pub criteria: MatchExpr,
    /// Join, flatten and pushed-down match stages in order
    pub expansion: Vec<Stage>,
    /// Sort keys after rewriting
    pub sort: Vec<SortSpec>,
    /// Page window
    pub page: PageSpec,
    /// Extra-field descriptors in order
    pub extra_fields: Vec<ExtraField>,
    /// Schemas the client does not hold at their current version
    pub touched_schemas: Vec<SchemaRef>,
    /// Requested includes that name relation attributes
    pub include: Vec<String>,
}

impl QueryPlan {
    /// Full stage list: base match, expansion, sort, skip, limit
    pub fn pipeline(&self) -> Vec<Stage> {
        let mut stages = Vec::with_capacity(self.expansion.len() + 4);
        stages.push(Stage::Match(self.criteria.clone()));
        stages.extend(self.expansion.iter().cloned());
        if !self.sort.is_empty() {
            stages.push(Stage::Sort(self.sort.clone()));
        }
        if let Some(offset) = self.page.offset {
            stages.push(Stage::Skip(offset));
        }
        if let Some(limit) = self.page.limit {
            stages.push(Stage::Limit(limit));
        }
        stages
    }

    /// Pipeline in document-store wire form
    pub fn pipeline_document(&self) -> Value {
        Value::Array(self.pipeline().iter().map(Stage::to_document).collect())
    }

    /// Number of join stages
    pub fn join_count(&self) -> usize {
        self.expansion
            .iter()
            .filter(|s| matches!(s, Stage::Lookup(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan() -> QueryPlan {
        QueryPlan {
            collection: "item".into(),
            criteria: MatchExpr::All,
            expansion: Vec::new(),
            sort: Vec::new(),
            page: PageSpec::default(),
            extra_fields: Vec::new(),
            touched_schemas: Vec::new(),
            include: Vec::new(),
        }
    }

    #[test]
    fn test_minimal_pipeline_is_single_match() {
        assert_eq!(plan().pipeline_document(), json!([{"$match": {}}]));
    }

    #[test]
    fn test_pipeline_tail_order() {
        let mut plan = plan();
        plan.sort = vec![SortSpec::asc("name")];
        plan.page = PageSpec::new(Some(20), Some(10));

        let names: Vec<&str> = plan.pipeline().iter().map(Stage::name).collect();
        assert_eq!(names, vec!["$match", "$sort", "$skip", "$limit"]);
        assert_eq!(plan.join_count(), 0);
    }

    #[test]
    fn test_extra_field_value_path() {
        let field = ExtraField {
            alias: "__owner".into(),
            field: "name".into(),
            title: None,
            table: "person".into(),
            path: "owner/name".into(),
            inherited_by: None,
        };
        assert_eq!(field.value_path(), "__owner.name");
    }
}

//! Search Orchestration Tests
//!
//! End-to-end searches against the in-memory store:
//! - Base criteria, pushed-down relation filters and extra-path filters
//! - Sort rewriting onto joined fields
//! - Total counts ignore paging and pushed-down filters
//! - Touched schemas honour the cached-schema header
//! - Fetch or count failure yields exactly one error

mod common;

use std::sync::Arc;

use aerorel::executor::{SearchError, SearchOrchestrator};
use aerorel::filter::FilterValue;
use aerorel::planner::{PlannerOptions, SchemaRef, SearchRequest, Stage};
use common::{ids, shared, FailingStore};
use serde_json::json;

fn orchestrator() -> SearchOrchestrator<aerorel::executor::MemoryStore> {
    let (registry, store, options) = shared();
    SearchOrchestrator::new(registry, store, options)
}

// =============================================================================
// Base Criteria
// =============================================================================

#[tokio::test]
async fn test_unfiltered_search_returns_everything() {
    let result = orchestrator()
        .search(&SearchRequest::new("form_list"))
        .await
        .unwrap();

    assert_eq!(ids(&result.documents), vec!["f1", "f2", "f3"]);
    assert_eq!(result.total, 3);
}

#[tokio::test]
async fn test_relation_without_traversal_key_matches_reference_id() {
    let request = SearchRequest::new("form_list").with_filter("owner", "42");
    let result = orchestrator().search(&request).await.unwrap();

    assert_eq!(ids(&result.documents), vec!["f1"]);
    assert_eq!(result.total, 1);
}

#[tokio::test]
async fn test_multiple_tokens_are_alternatives() {
    let request = SearchRequest::new("form_list").with_filter("title", vec!["alpha", "gamma"]);
    let result = orchestrator().search(&request).await.unwrap();

    assert_eq!(ids(&result.documents), vec!["f1", "f3"]);
    assert_eq!(result.total, 2);
}

#[tokio::test]
async fn test_unknown_filter_keys_are_ignored() {
    let request = SearchRequest::new("form_list").with_filter("colour", "red");
    let result = orchestrator().search(&request).await.unwrap();
    assert_eq!(result.total, 3);
}

#[tokio::test]
async fn test_empty_list_filter_matches_everything() {
    let request = SearchRequest::new("item")
        .with_filter("qty", FilterValue::Many(vec![]))
        .with_filter("owner", FilterValue::Many(vec![]));
    let orchestrator = orchestrator();

    let plan = orchestrator.plan(&request).unwrap();
    assert_eq!(plan.pipeline_document()[0], json!({"$match": {}}));

    let result = orchestrator.search(&request).await.unwrap();
    assert_eq!(ids(&result.documents), vec!["i1", "i2", "i3"]);
    assert_eq!(result.total, 3);
}

// =============================================================================
// Pushed-Down Filters
// =============================================================================

#[tokio::test]
async fn test_traversal_key_filter_applies_to_joined_document() {
    let request = SearchRequest::new("item").with_filter("owner", "~bob");
    let result = orchestrator().search(&request).await.unwrap();

    // Exact match: "Bob" but not "Bobby"
    assert_eq!(ids(&result.documents), vec!["i2"]);
    // Count runs on the base criteria only
    assert_eq!(result.total, 3);
}

#[tokio::test]
async fn test_substring_filter_on_traversal_key() {
    let request = SearchRequest::new("item").with_filter("owner", ":bob");
    let result = orchestrator().search(&request).await.unwrap();
    assert_eq!(ids(&result.documents), vec!["i2", "i3"]);
}

#[tokio::test]
async fn test_extra_path_filter() {
    let request = SearchRequest::new("form_list").with_filter("~/maker/name", "~acme");
    let result = orchestrator().search(&request).await.unwrap();

    assert_eq!(ids(&result.documents), vec!["f1"]);
    assert_eq!(result.documents[0]["__parentID/maker"]["name"], json!("Acme"));
}

#[tokio::test]
async fn test_request_extra_path_three_hops() {
    let request = SearchRequest::new("form_list")
        .with_extra_path("~/maker/leader/name:Leader")
        .with_filter("~/maker/leader/name", "~alice");
    let result = orchestrator().search(&request).await.unwrap();

    assert_eq!(ids(&result.documents), vec!["f2"]);
    let leader = result
        .extra_fields
        .iter()
        .find(|f| f.path == "~/maker/leader/name")
        .unwrap();
    assert_eq!(leader.alias, "__parentID/maker/leader");
    assert_eq!(leader.table, "person");
    assert_eq!(leader.title.as_deref(), Some("Leader"));
}

#[tokio::test]
async fn test_unresolvable_extra_path_is_dropped() {
    let request = SearchRequest::new("form_list").with_extra_path("~/nothing/name");
    let result = orchestrator().search(&request).await.unwrap();

    assert_eq!(result.total, 3);
    assert!(result
        .extra_fields
        .iter()
        .all(|f| f.path != "~/nothing/name"));
}

// =============================================================================
// Sort and Paging
// =============================================================================

#[tokio::test]
async fn test_sort_on_relation_uses_traversal_key() {
    let request = SearchRequest::new("item").with_sort("<owner");
    let result = orchestrator().search(&request).await.unwrap();

    // Bobby, Bob, Alice
    assert_eq!(ids(&result.documents), vec!["i3", "i2", "i1"]);
}

#[tokio::test]
async fn test_sort_on_extra_path() {
    let request = SearchRequest::new("form_list").with_sort("<~/maker/name");
    let result = orchestrator().search(&request).await.unwrap();

    // Zenith, Acme, then the document without a parent
    assert_eq!(ids(&result.documents), vec!["f2", "f1", "f3"]);
}

#[tokio::test]
async fn test_total_ignores_page_window() {
    let request = SearchRequest::new("form_list")
        .with_sort(">qty")
        .with_page(Some(1), Some(1));
    let result = orchestrator().search(&request).await.unwrap();

    assert_eq!(ids(&result.documents), vec!["f1"]);
    assert_eq!(result.total, 3);
}

// =============================================================================
// Response Metadata
// =============================================================================

#[tokio::test]
async fn test_touched_schemas_in_encounter_order() {
    let result = orchestrator()
        .search(&SearchRequest::new("form_list"))
        .await
        .unwrap();

    let names: Vec<&str> = result
        .touched_schemas
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["form_list", "person", "lahuojihua", "charger"]);
}

#[tokio::test]
async fn test_cached_schemas_only_skip_current_versions() {
    let request = SearchRequest::new("form_list").with_cached_schemas("person@1,charger@1");
    let result = orchestrator().search(&request).await.unwrap();

    assert!(!result.touched_schemas.iter().any(|s| s.name == "person"));
    assert!(result.touched_schemas.contains(&SchemaRef {
        name: "charger".into(),
        version: "2".into(),
    }));
}

#[tokio::test]
async fn test_inherited_path_survives_no_extra() {
    let request = SearchRequest::new("form_list").without_extra();
    let result = orchestrator().search(&request).await.unwrap();

    assert_eq!(result.extra_fields.len(), 1);
    let inherited = &result.extra_fields[0];
    assert_eq!(inherited.path, "~/maker/name");
    assert_eq!(inherited.inherited_by.as_deref(), Some("maker_name"));
    assert_eq!(result.documents[0]["__parentID/maker"]["name"], json!("Acme"));
}

#[tokio::test]
async fn test_include_keeps_relation_attributes_only() {
    let request = SearchRequest::new("form_list")
        .with_include("owner")
        .with_include("title");
    let result = orchestrator().search(&request).await.unwrap();
    assert_eq!(result.include, vec!["owner"]);
}

#[tokio::test]
async fn test_excluded_target_is_never_joined() {
    let orchestrator = orchestrator();
    let plan = orchestrator.plan(&SearchRequest::new("form_list")).unwrap();

    assert!(!plan
        .pipeline()
        .iter()
        .any(|stage| matches!(stage, Stage::Lookup(join) if join.from == "formtype")));
}

// =============================================================================
// Identifier Lookup
// =============================================================================

#[tokio::test]
async fn test_find_by_id() {
    let found = orchestrator().find("form_list", "f2").await.unwrap();

    assert_eq!(found.document["title"], json!("beta"));
    assert_eq!(found.extra_fields.len(), 1);
}

#[tokio::test]
async fn test_find_missing_is_not_found() {
    let err = orchestrator().find("form_list", "f9").await.unwrap_err();

    assert!(matches!(err, SearchError::NotFound { ref id, .. } if id == "f9"));
    assert_eq!(err.status_code(), 404);
}

// =============================================================================
// Rejections and Failures
// =============================================================================

#[tokio::test]
async fn test_cast_failure_is_validation_error() {
    let request = SearchRequest::new("form_list").with_filter("qty", ">many");
    let err = orchestrator().search(&request).await.unwrap_err();

    assert_eq!(err.code(), "AERO_FILTER_CAST_FAILED");
    assert_eq!(err.status_code(), 400);
    match err {
        SearchError::Validation { details, .. } => {
            assert_eq!(details.unwrap().field, "qty");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_resource_type() {
    let err = orchestrator()
        .search(&SearchRequest::new("ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "AERO_UNKNOWN_RESOURCE");
}

#[tokio::test]
async fn test_fetch_failure_is_single_error() {
    let (registry, _, options) = shared();
    let orchestrator =
        SearchOrchestrator::new(registry, Arc::new(FailingStore::fetch_fails()), options);

    let err = orchestrator
        .search(&SearchRequest::new("form_list"))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Store(ref e) if e.message() == "aggregate: connection reset"));
}

#[tokio::test]
async fn test_count_failure_is_single_error() {
    let (registry, _, _) = shared();
    let orchestrator = SearchOrchestrator::new(
        registry,
        Arc::new(FailingStore::count_fails()),
        PlannerOptions::default(),
    );

    let err = orchestrator
        .search(&SearchRequest::new("form_list"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "AERO_STORE_FAILED");
    assert_eq!(err.to_string(), "Store failure: count: connection reset");
}

#[tokio::test]
async fn test_find_store_failure_propagates() {
    let (registry, _, options) = shared();
    let orchestrator =
        SearchOrchestrator::new(registry, Arc::new(FailingStore::fetch_fails()), options);

    let err = orchestrator.find("form_list", "f1").await.unwrap_err();
    assert!(matches!(err, SearchError::Store(_)));
    assert_eq!(err.code(), "AERO_STORE_FAILED");
    assert_ne!(err.status_code(), 404);
}

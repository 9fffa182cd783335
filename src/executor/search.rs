//! Search orchestration
//!
//! Plans a request, then issues the fetch (full pipeline) and the count
//! (base criteria only) concurrently. Completion requires both; the first
//! failure aborts the search and no partial result is returned.

use std::sync::Arc;

use super::errors::{OrchestratorResult, SearchError};
use super::result::{FoundDocument, SearchResult};
use super::store::DocumentStore;
use crate::observability::{Event, Logger, ObservationScope};
use crate::planner::{PlannerOptions, QueryPlan, QueryPlanner, SearchRequest};
use crate::schema::SchemaRegistry;

/// Runs searches against a document store
pub struct SearchOrchestrator<S: DocumentStore> {
    registry: Arc<SchemaRegistry>,
    store: Arc<S>,
    options: PlannerOptions,
}

impl<S: DocumentStore> SearchOrchestrator<S> {
    pub fn new(registry: Arc<SchemaRegistry>, store: Arc<S>, options: PlannerOptions) -> Self {
        Self {
            registry,
            store,
            options,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Plans without executing
    pub fn plan(&self, request: &SearchRequest) -> OrchestratorResult<QueryPlan> {
        let planner = QueryPlanner::new(&self.registry, &self.options);
        planner.plan(request).map_err(|err| {
            Logger::event(
                Event::SearchRejected,
                &[
                    ("code", err.code().code()),
                    ("reason", err.message()),
                    ("type", request.resource_type.as_str()),
                ],
            );
            SearchError::from(err)
        })
    }

    /// Runs a search.
    ///
    /// # Errors
    ///
    /// - `UnknownResource` when the type is not registered
    /// - `Validation` when a filter value does not cast
    /// - `Store` when either store round-trip fails
    pub async fn search(&self, request: &SearchRequest) -> OrchestratorResult<SearchResult> {
        let scope =
            ObservationScope::with_fields("SEARCH", &[("type", request.resource_type.as_str())]);

        let plan = match self.plan(request) {
            Ok(plan) => plan,
            Err(err) => {
                scope.fail(&err.to_string());
                return Err(err);
            }
        };

        let pipeline = plan.pipeline();
        let joins = plan.join_count().to_string();
        Logger::event(
            Event::SearchPlanned,
            &[
                ("joins", joins.as_str()),
                ("stages", pipeline.len().to_string().as_str()),
                ("type", plan.collection.as_str()),
            ],
        );
        if self.options.log_pipelines {
            Logger::debug(
                Event::PipelineCompiled.as_str(),
                &[("pipeline", plan.pipeline_document().to_string().as_str())],
            );
        }

        let fetch = self.store.aggregate(&plan.collection, &pipeline);
        let count = self.store.count(&plan.collection, &plan.criteria);

        let (documents, total) = match tokio::try_join!(fetch, count) {
            Ok(outcome) => outcome,
            Err(err) => {
                Logger::event(
                    Event::SearchFailed,
                    &[("reason", err.message()), ("type", plan.collection.as_str())],
                );
                scope.fail(err.message());
                return Err(SearchError::Store(err));
            }
        };

        let returned = documents.len().to_string();
        let total_str = total.to_string();
        Logger::event(
            Event::SearchExecuted,
            &[
                ("returned", returned.as_str()),
                ("total", total_str.as_str()),
                ("type", plan.collection.as_str()),
            ],
        );
        scope.complete_with_fields(&[("returned", returned.as_str())]);

        Ok(SearchResult {
            documents,
            total,
            touched_schemas: plan.touched_schemas,
            extra_fields: plan.extra_fields,
            include: plan.include,
        })
    }

    /// Fetches one document by identifier.
    ///
    /// Runs a search with the identifier set and extra paths disabled;
    /// zero results is `NotFound`, store failures propagate unchanged.
    pub async fn find(&self, resource_type: &str, id: &str) -> OrchestratorResult<FoundDocument> {
        let request = SearchRequest::new(resource_type).with_id(id).without_extra();
        let result = self.search(&request).await?;
        FoundDocument::from_search(result).ok_or_else(|| SearchError::not_found(resource_type, id))
    }
}

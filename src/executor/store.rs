//! Document store seam
//!
//! The store executes pipelines; this crate only builds them. Futures are
//! boxed so the trait stays object-safe.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use super::errors::StoreResult;
use crate::filter::MatchExpr;
use crate::planner::Stage;

/// Boxed future returned by store operations
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// A document store able to run aggregation pipelines
pub trait DocumentStore: Send + Sync {
    /// Runs `pipeline` over `collection`
    fn aggregate<'a>(
        &'a self,
        collection: &'a str,
        pipeline: &'a [Stage],
    ) -> StoreFuture<'a, Vec<Value>>;

    /// Counts documents in `collection` matching `criteria`
    fn count<'a>(&'a self, collection: &'a str, criteria: &'a MatchExpr) -> StoreFuture<'a, u64>;
}

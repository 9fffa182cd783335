//! Search executor subsystem for aerorel
//!
//! Executes query plans against a [`DocumentStore`].
//!
//! # Execution Flow (strict order)
//!
//! 1. Plan the request (synchronous, no store access)
//! 2. Issue fetch and count concurrently
//! 3. Wait for both; the first failure wins
//! 4. Return documents, total and response metadata
//!
//! # Invariants
//!
//! - No partial results on failure
//! - No retries or timeouts at this layer

mod errors;
mod memory;
mod result;
mod search;
mod sorter;
mod store;

pub use errors::{OrchestratorResult, SearchError, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use result::{FoundDocument, SearchResult};
pub use search::SearchOrchestrator;
pub use sorter::ResultSorter;
pub use store::{DocumentStore, StoreFuture};

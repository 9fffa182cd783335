//! Write lifecycle for aerorel
//!
//! Every write passes through an ordered interceptor chain before it
//! reaches the store.
//!
//! # Write Flow (strict order)
//!
//! 1. Run `before` hooks; the first refusal aborts the write
//! 2. Assign `ID` from the `<type>_ID` sequence (create only)
//! 3. Write to the store
//! 4. Run `after` hooks with the stored document
//!
//! Update and delete of a missing document fail with `NotFound`.

mod errors;
mod interceptor;
mod store;
mod writer;

pub use errors::{WriteError, WriteResult};
pub use interceptor::{Interceptor, InterceptorChain, WriteEvent, WriteOp};
pub use store::{DocumentWriter, MemorySequence, SequenceGenerator};
pub use writer::{sequence_name, ResourceWriter, SEQUENCE_ID_FIELD};

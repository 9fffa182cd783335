//! Small shared helpers

mod set;

pub use set::{add_to_set, Placement};

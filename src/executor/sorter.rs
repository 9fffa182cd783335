//! Result sorting for in-process pipeline evaluation
//!
//! Sorts by several keys in order; sort is stable and deterministic.

use serde_json::Value;

use crate::filter::{compare_values, lookup_path};
use crate::planner::{SortDirection, SortSpec};

/// Sorts result documents
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts documents by each spec in turn; ties keep their input order.
    pub fn sort(documents: &mut [Value], specs: &[SortSpec]) {
        documents.sort_by(|a, b| {
            for spec in specs {
                let a_val = lookup_path(a, &spec.field).into_iter().next();
                let b_val = lookup_path(b, &spec.field).into_iter().next();

                let ordering = match spec.direction {
                    SortDirection::Asc => compare_values(a_val, b_val),
                    SortDirection::Desc => compare_values(a_val, b_val).reverse(),
                };
                if ordering.is_ne() {
                    return ordering;
                }
            }
            std::cmp::Ordering::Equal
        });
    }
}

//! Criteria compiler
//!
//! Turns a client filter map into base match criteria for one resource type.
//! Keys are visited in sorted order so identical requests compile
//! identically.

use std::collections::BTreeMap;

use super::ast::{FilterValue, MatchExpr};
use super::parser::parse_token;
use crate::schema::{
    AttributeKind, ResourceSchema, ScalarType, SchemaError, SchemaResult, ValidationDetails,
    REFERENCE_ID_KEY,
};

/// Compiles the base match criteria for `schema`.
///
/// Keys containing `/`, undeclared keys and relations with a declared
/// traversal key are skipped here; the planner handles them during
/// expansion. Empty lists are skipped like absent keys.
pub fn compile_criteria(
    filter: &BTreeMap<String, FilterValue>,
    schema: &ResourceSchema,
) -> SchemaResult<MatchExpr> {
    let mut clauses = Vec::new();

    for (key, value) in filter {
        if key.contains('/') || value.is_empty() {
            continue;
        }
        let Some(attr) = schema.attribute(key) else {
            continue;
        };

        let clause = match &attr.kind {
            AttributeKind::Relation(settings) if settings.traversal_key.is_some() => continue,
            AttributeKind::Relation(_) => {
                let Some(tokens) = value.tokens() else {
                    continue;
                };
                let path = format!("{}.{}", key, REFERENCE_ID_KEY);
                compile_alternatives(&path, &tokens, None)?
            }
            AttributeKind::Scalar(scalar) => {
                let Some(tokens) = value.tokens() else {
                    return Err(SchemaError::cast_failed(ValidationDetails::new(
                        key.as_str(),
                        scalar.type_name(),
                        "<object>",
                    )));
                };
                compile_alternatives(key, &tokens, Some(*scalar))
                    .map_err(|e| e.with_field(key))?
            }
        };
        clauses.push(clause);
    }

    Ok(MatchExpr::and(clauses))
}

/// ORs the predicates parsed from each token onto `path`
pub(crate) fn compile_alternatives(
    path: &str,
    tokens: &[&str],
    scalar: Option<ScalarType>,
) -> SchemaResult<MatchExpr> {
    let mut alternatives = Vec::with_capacity(tokens.len());
    for token in tokens {
        alternatives.push(MatchExpr::field(path, parse_token(token, scalar)?));
    }
    Ok(MatchExpr::or(alternatives))
}

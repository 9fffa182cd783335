//! Filter token parser
//!
//! Grammar: `<v`, `<=v`, `>v`, `>=v`, `~v` (exact, case-insensitive),
//! `:v` (substring, case-insensitive), bare `v` (equality).

use serde_json::Value;

use super::ast::Predicate;
use crate::schema::{SchemaResult, ScalarType, TypedValidator};

/// Parses a filter token into a typed predicate.
///
/// The operand is cast against `scalar`; with no type it stays a string.
pub fn parse_token(token: &str, scalar: Option<ScalarType>) -> SchemaResult<Predicate> {
    let cast = |rest: &str| TypedValidator::cast_opt(rest, scalar);

    if let Some(rest) = token.strip_prefix("<=") {
        return Ok(Predicate::LessOrEqual(cast(rest)?));
    }
    if let Some(rest) = token.strip_prefix('<') {
        return Ok(Predicate::LessThan(cast(rest)?));
    }
    if let Some(rest) = token.strip_prefix(">=") {
        return Ok(Predicate::GreaterOrEqual(cast(rest)?));
    }
    if let Some(rest) = token.strip_prefix('>') {
        return Ok(Predicate::GreaterThan(cast(rest)?));
    }
    if let Some(rest) = token.strip_prefix('~') {
        return Ok(Predicate::ExactPattern(pattern_text(cast(rest)?)));
    }
    if let Some(rest) = token.strip_prefix(':') {
        return Ok(Predicate::SubstringPattern(pattern_text(cast(rest)?)));
    }
    Ok(Predicate::Equals(cast(token)?))
}

fn pattern_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comparison_prefixes() {
        assert_eq!(
            parse_token("<5", Some(ScalarType::Int)).unwrap(),
            Predicate::LessThan(json!(5))
        );
        assert_eq!(
            parse_token("<=5", Some(ScalarType::Int)).unwrap(),
            Predicate::LessOrEqual(json!(5))
        );
        assert_eq!(
            parse_token(">5", Some(ScalarType::Int)).unwrap(),
            Predicate::GreaterThan(json!(5))
        );
        assert_eq!(
            parse_token(">=5", Some(ScalarType::Int)).unwrap(),
            Predicate::GreaterOrEqual(json!(5))
        );
    }

    #[test]
    fn test_pattern_prefixes() {
        let exact = parse_token("~bob", Some(ScalarType::String)).unwrap();
        assert!(exact.matches(&json!("Bob")));
        assert!(!exact.matches(&json!("Bobby")));

        let substring = parse_token(":bo", Some(ScalarType::String)).unwrap();
        assert!(substring.matches(&json!("Bobby")));
        assert!(substring.matches(&json!("abode")));
    }

    #[test]
    fn test_bare_token_is_equality() {
        assert_eq!(
            parse_token("true", Some(ScalarType::Bool)).unwrap(),
            Predicate::Equals(json!(true))
        );
    }

    #[test]
    fn test_untyped_token_stays_string() {
        assert_eq!(parse_token("<5", None).unwrap(), Predicate::LessThan(json!("5")));
        assert_eq!(parse_token("42", None).unwrap(), Predicate::Equals(json!("42")));
    }

    #[test]
    fn test_cast_failure_is_validation_error() {
        let err = parse_token(">abc", Some(ScalarType::Int)).unwrap_err();
        assert!(err.is_cast_failure());
        assert_eq!(err.details().unwrap().actual, "abc");
    }

    #[test]
    fn test_typed_pattern_uses_cast_text() {
        assert_eq!(
            parse_token("~7", Some(ScalarType::Int)).unwrap(),
            Predicate::ExactPattern("7".into())
        );
    }
}

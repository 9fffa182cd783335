//! Filter AST structures
//!
//! Defines predicates produced by the token parser and the match expressions
//! compiled from filter maps. Both render to the document-store wire form and
//! can be evaluated in-process against JSON documents.

use std::cmp::Ordering;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Upper bound on compiled pattern size
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// A raw filter value as supplied by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Single token
    One(String),
    /// Alternatives, combined by OR
    Many(Vec<String>),
    /// Object-valued filter
    Nested(Map<String, Value>),
}

impl FilterValue {
    /// Returns the tokens of a scalar or list filter
    pub fn tokens(&self) -> Option<Vec<&str>> {
        match self {
            FilterValue::One(token) => Some(vec![token.as_str()]),
            FilterValue::Many(tokens) => Some(tokens.iter().map(String::as_str).collect()),
            FilterValue::Nested(_) => None,
        }
    }

    /// True for a list filter with no alternatives
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterValue::Many(tokens) if tokens.is_empty())
    }
}

impl From<&str> for FilterValue {
    fn from(token: &str) -> Self {
        FilterValue::One(token.to_string())
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(tokens: Vec<&str>) -> Self {
        FilterValue::Many(tokens.into_iter().map(str::to_string).collect())
    }
}

/// A single typed predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// field < value
    LessThan(Value),
    /// field <= value
    LessOrEqual(Value),
    /// field > value
    GreaterThan(Value),
    /// field >= value
    GreaterOrEqual(Value),
    /// Whole-value match, case-insensitive
    ExactPattern(String),
    /// Substring match, case-insensitive
    SubstringPattern(String),
    /// field == value
    Equals(Value),
}

impl Predicate {
    /// Returns the operation name for explain output
    pub fn op_name(&self) -> &'static str {
        match self {
            Predicate::LessThan(_) => "lt",
            Predicate::LessOrEqual(_) => "lte",
            Predicate::GreaterThan(_) => "gt",
            Predicate::GreaterOrEqual(_) => "gte",
            Predicate::ExactPattern(_) => "exact",
            Predicate::SubstringPattern(_) => "contains",
            Predicate::Equals(_) => "eq",
        }
    }

    /// Regex source for pattern predicates. The text is matched literally.
    fn pattern_source(&self) -> Option<String> {
        match self {
            Predicate::ExactPattern(text) => Some(format!("^{}$", regex::escape(text))),
            Predicate::SubstringPattern(text) => Some(regex::escape(text)),
            _ => None,
        }
    }

    /// Renders the operand side of a `$match` entry
    pub fn to_document(&self) -> Value {
        if let Some(source) = self.pattern_source() {
            return json!({"$regex": source, "$options": "i"});
        }
        match self {
            Predicate::LessThan(v) => json!({ "$lt": v }),
            Predicate::LessOrEqual(v) => json!({ "$lte": v }),
            Predicate::GreaterThan(v) => json!({ "$gt": v }),
            Predicate::GreaterOrEqual(v) => json!({ "$gte": v }),
            Predicate::Equals(v) => v.clone(),
            Predicate::ExactPattern(_) | Predicate::SubstringPattern(_) => Value::Null,
        }
    }

    /// Evaluates the predicate against a concrete value.
    ///
    /// Arrays match when any element matches.
    pub fn matches(&self, actual: &Value) -> bool {
        if let Value::Array(items) = actual {
            return items.iter().any(|item| self.matches(item));
        }

        match self {
            Predicate::Equals(expected) => values_equal(actual, expected),
            Predicate::LessThan(bound) => ordered(actual, bound) == Some(Ordering::Less),
            Predicate::LessOrEqual(bound) => {
                matches!(ordered(actual, bound), Some(Ordering::Less | Ordering::Equal))
            }
            Predicate::GreaterThan(bound) => ordered(actual, bound) == Some(Ordering::Greater),
            Predicate::GreaterOrEqual(bound) => {
                matches!(ordered(actual, bound), Some(Ordering::Greater | Ordering::Equal))
            }
            Predicate::ExactPattern(_) | Predicate::SubstringPattern(_) => {
                let Value::String(text) = actual else {
                    return false;
                };
                let Some(source) = self.pattern_source() else {
                    return false;
                };
                RegexBuilder::new(&source)
                    .case_insensitive(true)
                    .size_limit(PATTERN_SIZE_LIMIT)
                    .build()
                    .map(|re| re.is_match(text))
                    .unwrap_or(false)
            }
        }
    }
}

/// Numbers compare numerically, everything else structurally
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => actual == expected,
    }
}

/// Ordering between two values of the same kind; mixed kinds do not compare
fn ordered(actual: &Value, bound: &Value) -> Option<Ordering> {
    match (actual, bound) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Compares two optional JSON values for sorting.
///
/// Ordering rules:
/// - missing < null < bool < number < string < array < object
/// - For same types, natural ordering
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_val), Some(b_val)) => {
            let type_order = |v: &Value| -> u8 {
                match v {
                    Value::Null => 0,
                    Value::Bool(_) => 1,
                    Value::Number(_) => 2,
                    Value::String(_) => 3,
                    Value::Array(_) => 4,
                    Value::Object(_) => 5,
                }
            };

            let a_type = type_order(a_val);
            let b_type = type_order(b_val);
            if a_type != b_type {
                return a_type.cmp(&b_type);
            }

            match (a_val, b_val) {
                (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                (Value::Number(x), Value::Number(y)) => {
                    let x = x.as_f64().unwrap_or(0.0);
                    let y = y.as_f64().unwrap_or(0.0);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
                (Value::String(x), Value::String(y)) => x.cmp(y),
                _ => Ordering::Equal,
            }
        }
    }
}

/// Collects the values found at a dotted path.
///
/// Arrays met before the last segment fan out over their elements.
pub fn lookup_path<'a>(document: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![document];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => {
                    if let Some(child) = map.get(segment) {
                        next.push(child);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        if let Some(child) = item.as_object().and_then(|m| m.get(segment)) {
                            next.push(child);
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }
    current
}

/// Compiled match criteria
#[derive(Debug, Clone, PartialEq)]
pub enum MatchExpr {
    /// Matches every document
    All,
    /// Predicate on a dotted field path
    Field { path: String, predicate: Predicate },
    /// Every child matches
    And(Vec<MatchExpr>),
    /// At least one child matches
    Or(Vec<MatchExpr>),
}

impl MatchExpr {
    pub fn field(path: impl Into<String>, predicate: Predicate) -> Self {
        MatchExpr::Field {
            path: path.into(),
            predicate,
        }
    }

    /// Conjunction; `All` children drop out and single children collapse
    pub fn and(children: Vec<MatchExpr>) -> Self {
        let mut children: Vec<MatchExpr> = children
            .into_iter()
            .filter(|child| !child.is_all())
            .collect();
        match children.len() {
            0 => MatchExpr::All,
            1 => children.remove(0),
            _ => MatchExpr::And(children),
        }
    }

    /// Disjunction; an empty list matches nothing, so callers skip empty filters
    pub fn or(mut children: Vec<MatchExpr>) -> Self {
        if children.iter().any(MatchExpr::is_all) {
            return MatchExpr::All;
        }
        match children.len() {
            1 => children.remove(0),
            _ => MatchExpr::Or(children),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, MatchExpr::All)
    }

    /// Renders the `$match` body
    pub fn to_document(&self) -> Value {
        match self {
            MatchExpr::All => json!({}),
            MatchExpr::Field { path, predicate } => {
                let mut map = Map::new();
                map.insert(path.clone(), predicate.to_document());
                Value::Object(map)
            }
            MatchExpr::And(children) => {
                json!({ "$and": children.iter().map(MatchExpr::to_document).collect::<Vec<_>>() })
            }
            MatchExpr::Or(children) => {
                json!({ "$or": children.iter().map(MatchExpr::to_document).collect::<Vec<_>>() })
            }
        }
    }

    /// Evaluates the expression against a document
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            MatchExpr::All => true,
            MatchExpr::Field { path, predicate } => lookup_path(document, path)
                .into_iter()
                .any(|value| predicate.matches(value)),
            MatchExpr::And(children) => children.iter().all(|c| c.matches(document)),
            MatchExpr::Or(children) => children.iter().any(|c| c.matches(document)),
        }
    }
}

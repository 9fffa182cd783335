//! Pipeline stages and synthesis
//!
//! Turns resolved relationship hops into join/flatten stage pairs and
//! assembles them into an ordered, deduplicated stage list.

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use super::resolver::RelationshipHop;
use crate::filter::MatchExpr;
use crate::schema::REFERENCE_ID_KEY;

/// Prefix marking an alias as joined data
pub const ALIAS_PREFIX: &str = "__";

/// Left outer join against another collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Join {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    pub alias: String,
}

/// Flattens a joined array into one document per element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flatten {
    pub alias: String,
    pub preserve_null_and_empty: bool,
    pub index_field: Option<String>,
}

impl Flatten {
    /// Flatten that keeps documents with no joined match
    pub fn preserving(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            preserve_null_and_empty: true,
            index_field: None,
        }
    }

    /// Records the element index in `field`
    pub fn with_index_field(mut self, field: impl Into<String>) -> Self {
        self.index_field = Some(field.into());
        self
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to sort by (dotted path)
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// One aggregation pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(MatchExpr),
    Lookup(Join),
    Unwind(Flatten),
    Sort(Vec<SortSpec>),
    Skip(u64),
    Limit(u64),
}

impl Stage {
    /// Stage operator name
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "$match",
            Stage::Lookup(_) => "$lookup",
            Stage::Unwind(_) => "$unwind",
            Stage::Sort(_) => "$sort",
            Stage::Skip(_) => "$skip",
            Stage::Limit(_) => "$limit",
        }
    }

    /// Renders the stage in document-store wire form
    pub fn to_document(&self) -> Value {
        let body = match self {
            Stage::Match(expr) => expr.to_document(),
            Stage::Lookup(join) => json!({
                "from": join.from,
                "localField": join.local_field,
                "foreignField": join.foreign_field,
                "as": join.alias,
            }),
            Stage::Unwind(flatten) => {
                let mut body = Map::new();
                body.insert("path".into(), json!(format!("${}", flatten.alias)));
                body.insert(
                    "preserveNullAndEmptyArrays".into(),
                    json!(flatten.preserve_null_and_empty),
                );
                if let Some(index) = &flatten.index_field {
                    body.insert("includeArrayIndex".into(), json!(index));
                }
                Value::Object(body)
            }
            Stage::Sort(specs) => {
                let mut body = Map::new();
                for spec in specs {
                    body.insert(spec.field.clone(), json!(spec.direction.as_i32()));
                }
                Value::Object(body)
            }
            Stage::Skip(n) => json!(n),
            Stage::Limit(n) => json!(n),
        };

        let mut stage = Map::new();
        stage.insert(self.name().to_string(), body);
        Value::Object(stage)
    }
}

/// Alias for a hop path, e.g. `__owner/maker`
pub fn alias_for<S: AsRef<str>>(fields: &[S]) -> String {
    let joined: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
    format!("{}{}", ALIAS_PREFIX, joined.join("/"))
}

/// Builds one join/flatten pair per valid hop.
///
/// Synthesis stops at the first invalid hop.
pub fn synthesize(hops: &[RelationshipHop]) -> Vec<(Join, Flatten)> {
    let mut pairs: Vec<(Join, Flatten)> = Vec::with_capacity(hops.len());
    let mut fields: Vec<&str> = Vec::with_capacity(hops.len());

    for hop in hops.iter().take_while(|hop| hop.is_valid()) {
        let local_field = match pairs.last() {
            Some((previous, _)) => {
                format!("{}.{}.{}", previous.alias, hop.field, REFERENCE_ID_KEY)
            }
            None => format!("{}.{}", hop.field, REFERENCE_ID_KEY),
        };
        fields.push(&hop.field);
        let alias = alias_for(&fields);

        pairs.push((
            Join {
                from: hop.target.clone(),
                local_field,
                foreign_field: hop.foreign_field.clone(),
                alias: alias.clone(),
            },
            Flatten::preserving(alias),
        ));
    }

    pairs
}

/// Ordered stage list with join deduplication
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    stages: Vec<Stage>,
    seen_joins: HashSet<(String, String, String)>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a join and its flatten unless an identical
    /// (from, localField, alias) join is already present.
    ///
    /// Returns true when the pair was added.
    pub fn push_join(&mut self, join: Join, flatten: Flatten) -> bool {
        let key = (
            join.from.clone(),
            join.local_field.clone(),
            join.alias.clone(),
        );
        if !self.seen_joins.insert(key) {
            return false;
        }
        self.stages.push(Stage::Lookup(join));
        self.stages.push(Stage::Unwind(flatten));
        true
    }

    /// Appends any stage
    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    /// Inserts `stage` after the flatten stage of `alias` and any stages
    /// already placed there. Appends when the alias is unknown.
    pub fn insert_after_flatten(&mut self, alias: &str, stage: Stage) {
        let position = self
            .stages
            .iter()
            .position(|s| matches!(s, Stage::Unwind(f) if f.alias == alias));

        let Some(position) = position else {
            self.stages.push(stage);
            return;
        };

        let mut insert_at = position + 1;
        while matches!(self.stages.get(insert_at), Some(Stage::Match(_))) {
            insert_at += 1;
        }
        self.stages.insert(insert_at, stage);
    }

    /// True when a join with this alias is present
    pub fn has_alias(&self, alias: &str) -> bool {
        self.stages
            .iter()
            .any(|s| matches!(s, Stage::Lookup(j) if j.alias == alias))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn build(self) -> Vec<Stage> {
        self.stages
    }
}

//! Query planner
//!
//! Builds a [`QueryPlan`] from a [`SearchRequest`] in a fixed order:
//!
//! 1. Schema lookup
//! 2. Base criteria
//! 3. Relation expansion (attributes in name order)
//! 4. Extra-path expansion (declared, explicit, then inherited paths)
//! 5. Sort rewriting
//! 6. Page window
//!
//! Identical requests against the same registry produce identical plans.

use std::collections::BTreeMap;

use serde_json::Value;

use super::errors::{PlannerError, PlannerResult};
use super::pipeline::{synthesize, Flatten, Join, PipelineBuilder, SortSpec, Stage};
use super::plan::{ExtraField, QueryPlan, SchemaRef};
use super::request::SearchRequest;
use super::resolver::PathResolver;
use crate::filter::{compile_alternatives, compile_criteria, FilterValue, MatchExpr, Predicate};
use crate::observability::{Event, Logger};
use crate::schema::{ResourceSchema, SchemaError, SchemaRegistry, REFERENCE_ID_KEY};
use crate::util::{add_to_set, Placement};

/// Planner knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Path segment standing for the parent reference
    pub uplink_marker: String,
    /// Attribute the up-link marker is rewritten to
    pub parent_field: String,
    /// Relation targets never expanded
    pub excluded_targets: Vec<String>,
    /// Log compiled pipelines at DEBUG
    pub log_pipelines: bool,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            uplink_marker: "~".to_string(),
            parent_field: "parentID".to_string(),
            excluded_targets: vec!["formtype".to_string()],
            log_pipelines: false,
        }
    }
}

impl PlannerOptions {
    pub fn is_excluded(&self, target: &str) -> bool {
        self.excluded_targets.iter().any(|t| t == target)
    }
}

/// One parsed extra-path entry: relation segments plus leaf fields
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExtraPathEntry {
    segments: Vec<String>,
    fields: Vec<(String, Option<String>)>,
}

impl ExtraPathEntry {
    /// Parses `seg/seg/field[:Title][,field2[:Title2]]`.
    ///
    /// Returns None for entries with fewer than two segments.
    fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        let mut parts: Vec<&str> = entry.split('/').map(str::trim).collect();
        if parts.len() < 2 {
            return None;
        }
        let leaf = parts.pop()?;

        let fields: Vec<(String, Option<String>)> = leaf
            .split(',')
            .filter_map(|spec| {
                let (field, title) = match spec.split_once(':') {
                    Some((field, title)) => (field.trim(), Some(title.trim().to_string())),
                    None => (spec.trim(), None),
                };
                (!field.is_empty()).then(|| (field.to_string(), title))
            })
            .collect();
        if fields.is_empty() {
            return None;
        }

        Some(Self {
            segments: parts.into_iter().map(str::to_string).collect(),
            fields,
        })
    }

    fn path_for(&self, field: &str) -> String {
        format!("{}/{}", self.segments.join("/"), field)
    }
}

/// Query planner over a read-only registry
pub struct QueryPlanner<'a> {
    registry: &'a SchemaRegistry,
    options: &'a PlannerOptions,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(registry: &'a SchemaRegistry, options: &'a PlannerOptions) -> Self {
        Self { registry, options }
    }

    /// Plans a search request.
    ///
    /// # Errors
    ///
    /// - AERO_UNKNOWN_RESOURCE when the type is not registered
    /// - AERO_FILTER_CAST_FAILED when a filter value does not cast
    pub fn plan(&self, request: &SearchRequest) -> PlannerResult<QueryPlan> {
        let schema = self
            .registry
            .get(&request.resource_type)
            .ok_or_else(|| PlannerError::unknown_resource(&request.resource_type))?;

        // An identifier lookup ignores the filter map entirely
        let empty = BTreeMap::new();
        let filter = if request.id.is_some() {
            &empty
        } else {
            &request.filter
        };

        let criteria = match &request.id {
            Some(id) => MatchExpr::field(
                schema.id_field.as_str(),
                Predicate::Equals(Value::String(id.clone())),
            ),
            None => compile_criteria(filter, schema)?,
        };

        let mut touched: Vec<String> = Vec::new();
        add_to_set(&mut touched, Placement::Back, [schema.name.clone()]);

        let mut builder = PipelineBuilder::new();
        self.expand_relations(schema, filter, &mut builder, &mut touched)?;
        let extra_fields = self.expand_extra_paths(schema, request, filter, &mut builder, &mut touched)?;

        let sort = self.rewrite_sort(schema, &request.sort, &builder, &extra_fields);

        let include = request
            .include
            .iter()
            .filter(|name| schema.attribute(name).map_or(false, |a| a.is_relation()))
            .cloned()
            .collect();

        let touched_schemas = touched
            .into_iter()
            .filter(|name| !request.cached_schemas.holds_current(name, self.registry))
            .filter_map(|name| {
                self.registry.version_of(&name).map(|version| SchemaRef {
                    version: version.to_string(),
                    name,
                })
            })
            .collect();

        Ok(QueryPlan {
            collection: schema.name.clone(),
            criteria,
            expansion: builder.build(),
            sort,
            page: request.page,
            extra_fields,
            touched_schemas,
            include,
        })
    }

    /// Joins every relation attribute's target and pushes down filters on
    /// relations that declare a traversal key.
    fn expand_relations(
        &self,
        schema: &ResourceSchema,
        filter: &BTreeMap<String, FilterValue>,
        builder: &mut PipelineBuilder,
        touched: &mut Vec<String>,
    ) -> PlannerResult<()> {
        for (attr, settings) in schema.relations() {
            if self.options.is_excluded(&settings.target) {
                continue;
            }
            let Some(target_schema) = self.registry.get(&settings.target) else {
                Logger::event(
                    Event::RelationSkipped,
                    &[
                        ("attribute", attr.name.as_str()),
                        ("reason", "invalid_form"),
                        ("target", settings.target.as_str()),
                        ("type", schema.name.as_str()),
                    ],
                );
                continue;
            };

            let alias = relation_alias(&settings.target, &attr.name);
            builder.push_join(
                Join {
                    from: settings.target.clone(),
                    local_field: format!("{}.{}", attr.name, REFERENCE_ID_KEY),
                    foreign_field: target_schema.id_field.clone(),
                    alias: alias.clone(),
                },
                Flatten::preserving(alias.as_str()).with_index_field(format!("{}_index", alias)),
            );
            add_to_set(touched, Placement::Back, [settings.target.clone()]);

            let Some(key) = settings.traversal_key.as_deref() else {
                continue;
            };
            let Some(tokens) = filter
                .get(&attr.name)
                .and_then(FilterValue::tokens)
                .filter(|tokens| !tokens.is_empty())
            else {
                continue;
            };
            let scalar = target_schema.attribute(key).and_then(|a| a.scalar_type());
            let expr = compile_alternatives(&format!("{}.{}", alias, key), &tokens, scalar)
                .map_err(|e| e.with_field(&attr.name))?;
            builder.insert_after_flatten(&alias, Stage::Match(expr));
        }
        Ok(())
    }

    /// Resolves extra paths, joins complete ones and records descriptors.
    fn expand_extra_paths(
        &self,
        schema: &ResourceSchema,
        request: &SearchRequest,
        filter: &BTreeMap<String, FilterValue>,
        builder: &mut PipelineBuilder,
        touched: &mut Vec<String>,
    ) -> PlannerResult<Vec<ExtraField>> {
        let mut entries: Vec<String> = Vec::new();
        if !request.no_extra {
            add_to_set(&mut entries, Placement::Back, schema.extra_paths.iter().cloned());
            add_to_set(&mut entries, Placement::Back, request.extra_paths.iter().cloned());
        }

        let mut inherited: BTreeMap<String, String> = BTreeMap::new();
        for (attr, path) in schema.inherited_paths() {
            inherited.insert(path.to_string(), attr.to_string());
            add_to_set(&mut entries, Placement::Back, [path.to_string()]);
        }

        let resolver = PathResolver::new(self.registry, self.options);
        let mut extra_fields: Vec<ExtraField> = Vec::new();

        for raw in &entries {
            let Some(entry) = ExtraPathEntry::parse(raw) else {
                continue;
            };

            let resolved = resolver.resolve(&entry.segments, &schema.name);
            if !resolved.is_complete() {
                let (field, reason) = resolved
                    .failure()
                    .map(|(f, e)| (f.to_string(), e.as_str()))
                    .unwrap_or_default();
                Logger::event(
                    Event::PathDropped,
                    &[
                        ("field", field.as_str()),
                        ("path", raw.as_str()),
                        ("reason", reason),
                        ("type", schema.name.as_str()),
                    ],
                );
                continue;
            }

            let pairs = synthesize(&resolved.hops);
            let Some(alias) = pairs.last().map(|(join, _)| join.alias.clone()) else {
                continue;
            };
            for (join, flatten) in pairs {
                builder.push_join(join, flatten);
            }
            add_to_set(
                touched,
                Placement::Back,
                resolved.hops.iter().map(|hop| hop.target.clone()),
            );

            let table = resolved.final_target().unwrap_or_default().to_string();
            let leaf_schema = self.registry.get(&table);

            for (field, title) in &entry.fields {
                let path = entry.path_for(field);
                let descriptor = ExtraField {
                    alias: alias.clone(),
                    field: field.clone(),
                    title: title.clone(),
                    table: table.clone(),
                    inherited_by: inherited.get(&path).cloned(),
                    path: path.clone(),
                };

                let tokens = filter
                    .get(&path)
                    .or_else(|| filter.get(raw))
                    .and_then(FilterValue::tokens)
                    .filter(|tokens| !tokens.is_empty());
                if let Some(tokens) = tokens {
                    let scalar = leaf_schema
                        .and_then(|s| s.attribute(field))
                        .and_then(|a| a.scalar_type());
                    let expr = compile_alternatives(&descriptor.value_path(), &tokens, scalar)
                        .map_err(|e: SchemaError| e.with_field(&path))?;
                    builder.insert_after_flatten(&alias, Stage::Match(expr));
                }

                add_to_set(&mut extra_fields, Placement::Back, [descriptor]);
            }
        }

        Ok(extra_fields)
    }

    /// Rewrites sort keys onto joined fields where needed
    fn rewrite_sort(
        &self,
        schema: &ResourceSchema,
        keys: &[String],
        builder: &PipelineBuilder,
        extra_fields: &[ExtraField],
    ) -> Vec<SortSpec> {
        keys.iter()
            .filter_map(|key| {
                let (field, descending) = if let Some(rest) = key.strip_prefix('<') {
                    (rest, true)
                } else if let Some(rest) = key.strip_prefix('>') {
                    (rest, false)
                } else {
                    (key.as_str(), false)
                };
                let field = field.trim();
                if field.is_empty() {
                    return None;
                }

                let relation_path = schema
                    .attribute(field)
                    .and_then(|a| a.relation_settings())
                    .and_then(|settings| {
                        let key = settings.traversal_key.as_deref()?;
                        let alias = relation_alias(&settings.target, field);
                        builder
                            .has_alias(&alias)
                            .then(|| format!("{}.{}", alias, key))
                    });

                let target = relation_path
                    .or_else(|| {
                        extra_fields
                            .iter()
                            .find(|f| f.path == field)
                            .map(ExtraField::value_path)
                    })
                    .unwrap_or_else(|| field.to_string());

                Some(if descending {
                    SortSpec::desc(target)
                } else {
                    SortSpec::asc(target)
                })
            })
            .collect()
    }
}

/// Alias of a relation attribute's join, e.g. `__person/owner`
pub fn relation_alias(target: &str, attribute: &str) -> String {
    format!("__{}/{}", target, attribute)
}

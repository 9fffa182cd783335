//! Configuration loading
//!
//! A single JSON file. Only `schema_dir` is required; everything else has
//! a default. Unknown keys are rejected so typos surface at startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{Event, Logger};
use crate::planner::PlannerOptions;
use crate::schema::{SchemaError, SchemaLoader, SchemaRegistry};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`Config`]
    #[error("Invalid config JSON: {0}")]
    Parse(String),

    /// Config parsed but a value is out of range
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// Schema directory failed to load
    #[error("{0}")]
    Schema(#[from] SchemaError),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } | ConfigError::Parse(_) | ConfigError::Invalid(_) => {
                "AERO_CONFIG_INVALID"
            }
            ConfigError::Schema(err) => err.code().code(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of resource schema files (required)
    pub schema_dir: PathBuf,

    /// Path segment standing for the parent reference (default "~")
    #[serde(default = "default_uplink_marker")]
    pub uplink_marker: String,

    /// Attribute the up-link marker resolves to (default "parentID")
    #[serde(default = "default_parent_field")]
    pub parent_field: String,

    /// Relation targets never expanded (default ["formtype"])
    #[serde(default = "default_excluded_targets")]
    pub excluded_targets: Vec<String>,

    /// Log compiled pipelines at DEBUG (default false)
    #[serde(default)]
    pub log_pipelines: bool,
}

fn default_uplink_marker() -> String {
    "~".to_string()
}
fn default_parent_field() -> String {
    "parentID".to_string()
}
fn default_excluded_targets() -> Vec<String> {
    vec!["formtype".to_string()]
}

impl Config {
    /// Config with defaults for everything but the schema directory
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            uplink_marker: default_uplink_marker(),
            parent_field: default_parent_field(),
            excluded_targets: default_excluded_targets(),
            log_pipelines: false,
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let mut config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        // Relative schema directories resolve against the config file
        if config.schema_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.schema_dir = parent.join(&config.schema_dir);
            }
        }

        config.validate()?;

        let schema_dir = config.schema_dir.display().to_string();
        Logger::event(Event::ConfigLoaded, &[("schema_dir", schema_dir.as_str())]);
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.schema_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("schema_dir must not be empty".into()));
        }

        if self.uplink_marker.is_empty() || self.uplink_marker.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "uplink_marker must be a non-empty path segment, got '{}'",
                self.uplink_marker
            )));
        }

        if self.parent_field.trim().is_empty() {
            return Err(ConfigError::Invalid("parent_field must not be empty".into()));
        }

        if let Some(bad) = self.excluded_targets.iter().find(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "excluded_targets contains an empty name: '{}'",
                bad
            )));
        }

        Ok(())
    }

    /// Planner options derived from this config
    pub fn planner_options(&self) -> PlannerOptions {
        PlannerOptions {
            uplink_marker: self.uplink_marker.clone(),
            parent_field: self.parent_field.clone(),
            excluded_targets: self.excluded_targets.clone(),
            log_pipelines: self.log_pipelines,
        }
    }

    /// Loads every schema in `schema_dir` into a registry.
    ///
    /// Dangling relations are logged but do not fail the load.
    pub fn load_registry(&self) -> ConfigResult<SchemaRegistry> {
        let mut loader = SchemaLoader::new(&self.schema_dir);
        loader.load_all()?;
        let registry = loader.into_registry();

        for dangling in registry.dangling_relations() {
            Logger::event(
                Event::DanglingRelation,
                &[
                    ("attribute", dangling.attribute.as_str()),
                    ("target", dangling.target.as_str()),
                    ("type", dangling.resource_type.as_str()),
                ],
            );
        }

        let count = registry.len().to_string();
        Logger::event(Event::SchemasLoaded, &[("count", count.as_str())]);
        Ok(registry)
    }
}

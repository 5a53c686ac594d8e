//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/ontoforest/ontoforest.toml`
//! 3. Environment variables: `ONTOFOREST_*` prefix

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::{OntologyError, OntologyResult};
use crate::util::path::expand_env_vars;

/// User-defined ontology served by the `custom` registry key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CustomOntology {
    /// URL of the .obo file
    pub url: Option<String>,
    /// Descriptor shown in progress messages and used for the cache file name
    pub description: String,
    /// Root term id; unset means every ancestor-less term seeds a tree
    pub root_id: Option<String>,
    /// Drop trees smaller than this
    pub min_node_size: Option<usize>,
}

impl Default for CustomOntology {
    fn default() -> Self {
        Self {
            url: None,
            description: "Custom Ontology".to_string(),
            root_id: None,
            min_node_size: None,
        }
    }
}

/// Unified configuration for ontoforest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory for cached ontology downloads
    pub cache_dir: PathBuf,
    /// Exclude terms flagged `is_obsolete` when importing OBO graphs
    pub exclude_obsolete: bool,
    /// The `custom` registry entry
    pub custom: CustomOntology,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            exclude_obsolete: true,
            custom: CustomOntology::default(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "ontoforest")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.ontoforest/cache"))
}

/// Get the XDG config directory for ontoforest.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ontoforest").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("ontoforest.toml"))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// Scalars later in the chain replace earlier ones; there is no merging
    /// of partial values beyond field-level override.
    pub fn load() -> OntologyResult<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default(
                "cache_dir",
                defaults.cache_dir.to_string_lossy().to_string(),
            )
            .map_err(config_err)?
            .set_default("exclude_obsolete", defaults.exclude_obsolete)
            .map_err(config_err)?
            .set_default("custom.description", defaults.custom.description.clone())
            .map_err(config_err)?;

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("ONTOFOREST")
                .separator("__")
                .list_separator(","),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.expand_paths();
        Ok(settings)
    }

    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.cache_dir.to_string_lossy().as_ref());
        self.cache_dir = PathBuf::from(expanded);
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> OntologyResult<String> {
        toml::to_string_pretty(self).map_err(|e| OntologyError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# ontoforest configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/ontoforest/ontoforest.toml
#   Env:    ONTOFOREST_* environment variables (e.g. ONTOFOREST_CACHE_DIR,
#           ONTOFOREST_CUSTOM__URL with "__" separating nested keys)

# Directory for cached ontology downloads
# cache_dir = "~/.cache/ontoforest"

# Exclude terms flagged is_obsolete when importing OBO graphs
# exclude_obsolete = true

# Ontology served by `ontoforest fetch custom`
[custom]
# url = "https://example.org/my-ontology.obo"
# description = "My Ontology"
# root_id = "MY:0000001"
# min_node_size = 2
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> OntologyError {
    OntologyError::Config {
        message: e.to_string(),
    }
}

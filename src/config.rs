//! Lookup configuration, persisted as TOML.
//!
//! The global file lives at `$XDG_CONFIG_HOME/hpo-lookup/config.toml`. Every
//! field is optional; a missing file means all defaults.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ontology::FieldNames;
use crate::paths::HpoPaths;

/// File name of the persisted batch mapping, written next to the ontology.
pub const DEFAULT_OUTPUT_FILE: &str = "output_mappings.json";

/// Errors from configuration handling.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(hpo::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(
        code(hpo::config::parse),
        help("Check the TOML syntax in the config file. {message}")
    )]
    Parse { path: String, message: String },

    #[error("failed to serialize config for {path}")]
    #[diagnostic(
        code(hpo::config::serialize),
        help("Paths in the config must be valid UTF-8. {message}")
    )]
    Serialize { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(hpo::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config file already exists: {path}")]
    #[diagnostic(
        code(hpo::config::exists),
        help("Pass `--force` to overwrite it, or edit the file directly.")
    )]
    AlreadyExists { path: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(hpo::config::invalid), help("Check the LookupConfig fields. {message}"))]
    Invalid { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings for [`crate::HpoLookup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Ontology JSON document to search.
    #[serde(default = "default_ontology_path")]
    pub ontology_path: PathBuf,
    /// Destination of persisted batch mappings. Defaults to
    /// `output_mappings.json` in the ontology's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Write each batch mapping to `output_path`.
    #[serde(default = "default_persist")]
    pub persist: bool,
    /// Reuse parsed documents across calls until the file changes.
    #[serde(default)]
    pub cache: bool,
    /// Match batch terms on the rayon thread pool.
    #[serde(default)]
    pub parallel: bool,
    /// Node field names read by the matcher.
    #[serde(default)]
    pub fields: FieldNames,
}

fn default_ontology_path() -> PathBuf {
    PathBuf::from("hpo.json")
}
fn default_persist() -> bool {
    true
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            ontology_path: default_ontology_path(),
            output_path: None,
            persist: default_persist(),
            cache: false,
            parallel: false,
            fields: FieldNames::default(),
        }
    }
}

impl LookupConfig {
    /// Default settings pointed at a specific ontology file.
    pub fn with_ontology(path: impl Into<PathBuf>) -> Self {
        Self {
            ontology_path: path.into(),
            ..Default::default()
        }
    }

    /// Where batch mappings are written.
    pub fn resolved_output_path(&self) -> PathBuf {
        match &self.output_path {
            Some(path) => path.clone(),
            None => self
                .ontology_path
                .parent()
                .map(|dir| dir.join(DEFAULT_OUTPUT_FILE))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.ontology_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                message: "ontology_path must not be empty".into(),
            });
        }
        if self.fields.has_empty() {
            return Err(ConfigError::Invalid {
                message: "every [fields] entry needs at least one name".into(),
            });
        }
        Ok(())
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load the global config file if it exists, otherwise defaults.
    pub fn discover(paths: &HpoPaths) -> ConfigResult<Self> {
        let path = paths.config_file();
        if path.is_file() {
            tracing::debug!(path = %path.display(), "using config file");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

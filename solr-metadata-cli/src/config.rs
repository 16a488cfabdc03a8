//! Settings for the CLI, layered with figment.
//!
//! Sources in precedence order (later sources override earlier ones):
//! 1. Default values
//! 2. `solr-metadata.{toml,yaml,yml,json}` in the working directory, or the
//!    file given with `--config`
//! 3. Environment variables prefixed with `SOLR_METADATA_`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use solr_metadata::ContentModelId;
use thiserror::Error;
use tracing::{debug, trace};

pub const ENV_PREFIX: &str = "SOLR_METADATA_";

const CONFIG_FILE_NAMES: [&str; 4] = [
    "solr-metadata.toml",
    "solr-metadata.yaml",
    "solr-metadata.yml",
    "solr-metadata.json",
];

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: Box<figment::Error>,
    },

    /// Configuration file format not supported
    #[error("Unsupported configuration file format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

/// Resolved CLI settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the YAML store
    pub data_dir: PathBuf,
    /// Saved Solr Luke response listing the indexed fields
    pub luke_file: Option<PathBuf>,
    /// Indexed fields, used when no Luke file is configured
    pub index_fields: Vec<String>,
    /// YAML map of content model id to label
    pub content_models_file: Option<PathBuf>,
    /// Content models, used when no content model file is configured
    pub content_models: BTreeMap<ContentModelId, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".solr-metadata"),
            luke_file: None,
            index_fields: Vec::new(),
            content_models_file: None,
            content_models: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings relative to the working directory
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_in(Path::new("."), config_file)
    }

    /// Load settings, discovering config files in `dir`
    pub fn load_in(dir: &Path, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let settings: Settings = build_figment(dir, config_file)?.extract()?;
        debug!(data_dir = %settings.data_dir.display(), "settings loaded");
        Ok(settings)
    }
}

fn build_figment(dir: &Path, config_file: Option<&Path>) -> Result<Figment, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));

    match config_file {
        Some(path) => {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            figment = figment.merge(load_config_file(path)?);
        }
        None => {
            for name in CONFIG_FILE_NAMES {
                let path = dir.join(name);
                if path.is_file() {
                    trace!("Loading config file: {}", path.display());
                    figment = figment.merge(load_config_file(&path)?);
                }
            }
        }
    }

    Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
}

/// Load a single configuration file based on its extension
fn load_config_file(path: &Path) -> Result<Figment, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        Some("yaml") | Some("yml") => Ok(Figment::from(Yaml::file(path))),
        Some("json") => Ok(Figment::from(Json::file(path))),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

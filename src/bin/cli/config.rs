use serde::{Deserialize, Serialize};
use sombra_slots::config::{GraphConfig, StorageSection};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// CLI configuration: an optional default graph plus storage overrides.
#[derive(Debug, Default)]
pub struct CliConfig {
    path: Option<PathBuf>,
    data: RawConfig,
}

impl CliConfig {
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let required = explicit.is_some();
        let path = explicit.or_else(default_config_path);
        let data = match path.as_ref() {
            Some(config_path) if config_path.exists() => read_file(config_path)?,
            Some(config_path) if required => {
                return Err(ConfigError::Missing {
                    path: config_path.clone(),
                })
            }
            _ => RawConfig::default(),
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn default_graph(&self) -> Option<&PathBuf> {
        self.data.graph.default_path.as_ref()
    }

    pub fn graph_config(&self) -> GraphConfig {
        GraphConfig {
            storage: self.data.storage.clone(),
        }
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    graph: GraphSection,
    #[serde(default)]
    storage: StorageSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct GraphSection {
    #[serde(rename = "default")]
    default_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read CLI config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse CLI config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("CLI config {path} does not exist")]
    Missing { path: PathBuf },
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("sombra-slots").join("config.toml"))
}

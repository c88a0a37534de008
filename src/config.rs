//! TOML configuration for opening a graph.
//!
//! ```toml
//! [storage]
//! allocation_unit = 65536
//! grab_size = 64
//! max_block_size = 51
//! ```
//!
//! Every key is optional; missing keys keep the [`GraphOptions`] defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::storage::GraphOptions;
use crate::types::{GraphError, Result};

/// Parsed configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    /// Store geometry overrides.
    #[serde(default)]
    pub storage: StorageSection,
}

/// The `[storage]` table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    /// Bytes per mapped page; a multiple of 4096.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation_unit: Option<u64>,
    /// Id batch size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grab_size: Option<usize>,
    /// Upper bound on data bytes per block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_block_size: Option<usize>,
}

impl GraphConfig {
    /// Parses a configuration document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| GraphError::Config(err.to_string()))
    }

    /// Reads and parses the file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|err| GraphError::Config(format!("{}: {err}", path.display())))
    }

    /// Applies the overrides on top of `base`.
    pub fn apply(&self, mut base: GraphOptions) -> GraphOptions {
        let storage = &self.storage;
        if let Some(unit) = storage.allocation_unit {
            base = base.allocation_unit(unit);
        }
        if let Some(grab) = storage.grab_size {
            base = base.grab_size(grab);
        }
        if let Some(block) = storage.max_block_size {
            base = base.max_block_size(block);
        }
        base
    }

    /// Validated options for the graph in `dir`.
    pub fn options_for(&self, dir: impl AsRef<Path>) -> Result<GraphOptions> {
        let options = self.apply(GraphOptions::new(dir));
        options.validate()?;
        Ok(options)
    }

    /// Serializes back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| GraphError::Config(err.to_string()))
    }
}

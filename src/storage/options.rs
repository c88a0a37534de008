use std::path::{Path, PathBuf};

use crate::primitives::mmap::MAP_ALIGNMENT;
use crate::storage::blocks::{effective_block_size, BLOCK_HEADER_SIZE, DEFAULT_MAX_BLOCK_SIZE};
use crate::storage::ids::DEFAULT_GRAB_SIZE;
use crate::storage::index::StoreLayout;
use crate::types::{GraphError, Result};

/// Default allocation unit: 64 KiB per mapped page.
pub const DEFAULT_ALLOCATION_UNIT: u64 = 64 * 1024;

/// Configuration options supplied when opening a [`super::Graph`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphOptions {
    /// Directory holding every store file of the graph.
    pub dir: PathBuf,
    /// Bytes each store grows by; one memory map per unit.
    pub allocation_unit: u64,
    /// Ids buffered in memory before the free list is synced to disk.
    pub grab_size: usize,
    /// Upper bound on data bytes per string/value block.
    pub max_block_size: usize,
    /// Whether opening may create the directory and empty stores.
    pub create_if_missing: bool,
}

impl GraphOptions {
    /// Creates options with default settings rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            allocation_unit: DEFAULT_ALLOCATION_UNIT,
            grab_size: DEFAULT_GRAB_SIZE,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            create_if_missing: true,
        }
    }

    /// Sets the allocation unit in bytes.
    pub fn allocation_unit(mut self, bytes: u64) -> Self {
        self.allocation_unit = bytes;
        self
    }

    /// Sets the id batch size.
    pub fn grab_size(mut self, ids: usize) -> Self {
        self.grab_size = ids;
        self
    }

    /// Sets the maximum data bytes per block.
    pub fn max_block_size(mut self, bytes: usize) -> Self {
        self.max_block_size = bytes;
        self
    }

    /// Allows or forbids creating a new graph on open.
    pub fn create_if_missing(mut self, enabled: bool) -> Self {
        self.create_if_missing = enabled;
        self
    }

    /// Rejects settings the stores cannot be opened with.
    pub fn validate(&self) -> Result<()> {
        if self.allocation_unit == 0 || self.allocation_unit % MAP_ALIGNMENT != 0 {
            return Err(GraphError::Config(format!(
                "allocation_unit {} must be a positive multiple of {MAP_ALIGNMENT}",
                self.allocation_unit
            )));
        }
        if self.grab_size == 0 {
            return Err(GraphError::Config("grab_size must be at least 1".into()));
        }
        let block = effective_block_size(self.max_block_size);
        if block < 2 {
            return Err(GraphError::Config(format!(
                "max_block_size {} leaves fewer than 2 data bytes per block",
                self.max_block_size
            )));
        }
        if (block + BLOCK_HEADER_SIZE) as u64 > self.allocation_unit {
            return Err(GraphError::Config(format!(
                "max_block_size {} does not fit the allocation unit",
                self.max_block_size
            )));
        }
        Ok(())
    }

    pub(crate) fn layout(&self) -> StoreLayout {
        StoreLayout {
            allocation_unit: self.allocation_unit,
            grab_size: self.grab_size,
            max_block_size: self.max_block_size,
        }
    }
}

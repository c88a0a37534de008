#![forbid(unsafe_code)]

//! Edge label symbol table with usage counting.
//!
//! Unlike property keys, a label whose usage count drops to zero is deleted
//! together with its key blocks, and its id may be reissued.

use std::path::Path;

use tracing::debug;

use crate::storage::index::{Dictionary, IndexEntry, StoreLayout};
use crate::types::{GraphError, Result, SlotId};

pub(crate) const LABEL_INDEX_STORE: &str = "labels";
pub(crate) const LABEL_NAME_STORE: &str = "label_names";

/// Interned edge labels.
pub struct LabelManager {
    dict: Dictionary,
}

impl LabelManager {
    /// Opens the label stores under `dir`.
    pub fn open(dir: &Path, layout: StoreLayout) -> Result<Self> {
        Ok(Self {
            dict: Dictionary::open(dir, LABEL_INDEX_STORE, LABEL_NAME_STORE, layout)?,
        })
    }

    /// Id of `label`, interned with a zero count if new.
    pub fn create_or_get(&mut self, label: &str) -> Result<SlotId> {
        self.dict.intern(label)
    }

    /// Id of `label`, if interned.
    pub fn id_of(&self, label: &str) -> Option<SlotId> {
        self.dict.lookup(label)
    }

    /// Text of label `id`, if live.
    pub fn label_of(&self, id: SlotId) -> Option<&str> {
        self.dict.key_of(id)
    }

    /// Usage count of `label`.
    pub fn count(&self, label: &str) -> Result<u32> {
        self.dict.count(self.require(label)?)
    }

    /// Bumps the usage count of `label`.
    pub fn increment(&mut self, label: &str) -> Result<u32> {
        let id = self.require(label)?;
        self.increment_id(id)
    }

    /// Drops the usage count of `label`, deleting it at zero.
    pub fn decrement(&mut self, label: &str) -> Result<u32> {
        let id = self.require(label)?;
        self.decrement_id(id)
    }

    pub(crate) fn increment_id(&mut self, id: SlotId) -> Result<u32> {
        self.dict.adjust_count(id, 1)
    }

    pub(crate) fn decrement_id(&mut self, id: SlotId) -> Result<u32> {
        let count = self.dict.adjust_count(id, -1)?;
        if count == 0 {
            self.dict.remove(id)?;
            debug!(label = id, "labels.reclaim");
        }
        Ok(count)
    }

    /// Every live label, by ascending id.
    pub fn entries(&self) -> Result<Vec<IndexEntry>> {
        self.dict.entries()
    }

    /// Number of live labels.
    pub fn len(&self) -> usize {
        self.dict.len()
    }

    /// True when no label is interned.
    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// True when a backing store was found dirty on open.
    pub fn is_corrupted(&self) -> bool {
        self.dict.is_corrupted()
    }

    /// Flushes the backing stores.
    pub fn flush(&mut self) -> Result<()> {
        self.dict.flush()
    }

    /// Closes the backing stores.
    pub fn close(&mut self) -> Result<()> {
        self.dict.close()
    }

    fn require(&self, label: &str) -> Result<SlotId> {
        self.dict.lookup(label).ok_or(GraphError::NotFound("label"))
    }
}

#![forbid(unsafe_code)]

//! Dictionary entries shared by the property-key and label symbol tables.
//!
//! An index slot holds `[flags][i32 count][i32 key block]`; the key text lives
//! in a companion block store. [`Dictionary`] keeps both directions of the
//! key/id mapping in memory for as long as the store is open.

use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::primitives::bytes::{le, link};
use crate::storage::blocks::BlockRepository;
use crate::storage::slots::{RecordCodec, SlotRepository};
use crate::types::{GraphError, Result, SlotId};

/// Size of one index slot.
pub const INDEX_RECORD_SIZE: usize = 9;

const COUNT: usize = 1;
const KEY_BLOCK: usize = 5;

/// Decoded index slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexRecord {
    /// Usage counter.
    pub count: u32,
    /// Head block of the key text.
    pub key_block: SlotId,
}

/// Codec for [`IndexRecord`].
#[derive(Clone, Copy, Debug, Default)]
pub struct IndexCodec;

impl RecordCodec for IndexCodec {
    type Record = IndexRecord;

    fn record_size(&self) -> usize {
        INDEX_RECORD_SIZE
    }

    fn read(&self, slot: &[u8]) -> Result<IndexRecord> {
        let count = le::get_i32(slot, COUNT);
        let count = u32::try_from(count)
            .map_err(|_| GraphError::Corruption(format!("negative index count {count}")))?;
        Ok(IndexRecord {
            count,
            key_block: link::get_required(slot, KEY_BLOCK)?,
        })
    }

    fn write(&self, record: &IndexRecord, slot: &mut [u8]) -> u8 {
        le::put_i32(slot, COUNT, record.count as i32);
        link::put(slot, KEY_BLOCK, Some(record.key_block));
        0
    }
}

/// Index slots.
pub type IndexRepository = SlotRepository<IndexCodec>;

/// One dictionary entry with its key resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Index slot id.
    pub id: SlotId,
    /// Key text.
    pub key: String,
    /// Usage counter.
    pub count: u32,
    /// Head block of the key text.
    pub key_block: SlotId,
}

/// Store geometry shared by every repository a dictionary opens.
#[derive(Clone, Copy, Debug)]
pub struct StoreLayout {
    /// Allocation unit of every mapped store.
    pub allocation_unit: u64,
    /// Id generator batch size.
    pub grab_size: usize,
    /// Upper bound on data bytes per block.
    pub max_block_size: usize,
}

/// Interned strings backed by an index store and a block store.
pub struct Dictionary {
    entries: IndexRepository,
    names: BlockRepository,
    by_key: FxHashMap<String, SlotId>,
    by_id: FxHashMap<SlotId, String>,
}

impl Dictionary {
    /// Opens `<index>` and `<names>` under `dir` and loads every entry.
    pub fn open(
        dir: &Path,
        index: &'static str,
        names: &'static str,
        layout: StoreLayout,
    ) -> Result<Self> {
        let entries = IndexRepository::open(
            dir,
            index,
            IndexCodec,
            layout.allocation_unit,
            layout.grab_size,
        )?;
        let names = BlockRepository::open(
            dir,
            names,
            layout.max_block_size,
            layout.allocation_unit,
            layout.grab_size,
        )?;
        let mut dict = Self {
            entries,
            names,
            by_key: FxHashMap::default(),
            by_id: FxHashMap::default(),
        };
        dict.load()?;
        Ok(dict)
    }

    fn load(&mut self) -> Result<()> {
        for entry in self.entries.scan() {
            let (id, record) = entry?;
            let key = self.names.read_str(record.key_block)?;
            self.by_key.insert(key.clone(), id);
            self.by_id.insert(id, key);
        }
        debug!(
            store = self.entries.name(),
            entries = self.by_id.len(),
            "dict.load"
        );
        Ok(())
    }

    /// Id of `key`, if interned.
    pub fn lookup(&self, key: &str) -> Option<SlotId> {
        self.by_key.get(key).copied()
    }

    /// Key text of entry `id`, if live.
    pub fn key_of(&self, id: SlotId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True when nothing is interned.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Returns the id of `key`, interning it with a zero count if new.
    pub fn intern(&mut self, key: &str) -> Result<SlotId> {
        if let Some(id) = self.lookup(key) {
            return Ok(id);
        }
        let key_block = self.names.write_str(key)?;
        let id = self.entries.create(&IndexRecord {
            count: 0,
            key_block,
        })?;
        self.by_key.insert(key.to_owned(), id);
        self.by_id.insert(id, key.to_owned());
        debug!(store = self.entries.name(), id, key, "dict.intern");
        Ok(id)
    }

    /// Full entry for `id`.
    pub fn entry(&self, id: SlotId) -> Result<IndexEntry> {
        let record = self.entries.get(id)?;
        let key = match self.key_of(id) {
            Some(key) => key.to_owned(),
            None => self.names.read_str(record.key_block)?,
        };
        Ok(IndexEntry {
            id,
            key,
            count: record.count,
            key_block: record.key_block,
        })
    }

    /// Every live entry, by ascending id.
    pub fn entries(&self) -> Result<Vec<IndexEntry>> {
        let mut ids: Vec<SlotId> = self.by_id.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(|id| self.entry(id)).collect()
    }

    /// Usage counter of entry `id`.
    pub fn count(&self, id: SlotId) -> Result<u32> {
        Ok(self.entries.get(id)?.count)
    }

    /// Adds `delta` to the counter of `id` and returns the new value.
    pub fn adjust_count(&mut self, id: SlotId, delta: i32) -> Result<u32> {
        let mut record = self.entries.get(id)?;
        let next = i64::from(record.count) + i64::from(delta);
        record.count = u32::try_from(next)
            .ok()
            .filter(|count| *count <= i32::MAX as u32)
            .ok_or_else(|| {
                GraphError::InvalidArgument(format!(
                    "{} entry {id}: count {} cannot change by {delta}",
                    self.entries.name(),
                    record.count
                ))
            })?;
        self.entries.update(id, &record)?;
        trace!(store = self.entries.name(), id, count = record.count, "dict.count");
        Ok(record.count)
    }

    /// Deletes entry `id` together with its key blocks.
    pub fn remove(&mut self, id: SlotId) -> Result<()> {
        let record = self.entries.get(id)?;
        self.names.delete(record.key_block)?;
        self.entries.delete(id)?;
        if let Some(key) = self.by_id.remove(&id) {
            self.by_key.remove(&key);
        }
        debug!(store = self.entries.name(), id, "dict.remove");
        Ok(())
    }

    /// True when either backing store was found dirty on open.
    pub fn is_corrupted(&self) -> bool {
        self.entries.is_corrupted() || self.names.is_corrupted()
    }

    /// Flushes both backing stores.
    pub fn flush(&mut self) -> Result<()> {
        self.entries.flush()?;
        self.names.flush()
    }

    /// Closes the name blocks, then the index store.
    pub fn close(&mut self) -> Result<()> {
        self.names.close()?;
        self.entries.close()
    }
}

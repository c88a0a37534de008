#![forbid(unsafe_code)]

//! Fixed-size record slots over a mapped store.
//!
//! Every slot starts with a flags byte whose low bit marks it in use. Slot
//! `id` lives in allocation unit `(id - 1) / per_unit` at
//! `((id - 1) % per_unit) * record_size`, so records never straddle units;
//! the unused tail of each unit is padding.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::primitives::mmap::MappedFile;
use crate::storage::ids::IdGenerator;
use crate::types::{GraphError, Result, SlotId};

/// Flags bit marking a live slot.
pub const FLAG_IN_USE: u8 = 0x01;

/// Format-specific read/write hooks for one record type.
pub trait RecordCodec {
    /// Decoded record.
    type Record;

    /// Slot size in bytes, including the flags byte.
    fn record_size(&self) -> usize;

    /// Decodes a live slot. `slot[0]` is the flags byte.
    fn read(&self, slot: &[u8]) -> Result<Self::Record>;

    /// Encodes `record` into `slot[1..]`. Returns extra flag bits to store
    /// alongside [`FLAG_IN_USE`].
    fn write(&self, record: &Self::Record, slot: &mut [u8]) -> u8;
}

/// Paths of the data file and id file of the store `name` in `dir`.
pub fn store_paths(dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{name}.store")),
        dir.join(format!("{name}.ids")),
    )
}

/// Id-addressed slots of one record type.
pub struct SlotRepository<C: RecordCodec> {
    name: &'static str,
    data: MappedFile,
    ids: IdGenerator,
    codec: C,
    record_size: usize,
    per_unit: u64,
    closed: bool,
}

impl<C: RecordCodec> SlotRepository<C> {
    /// Opens the `<name>.store` / `<name>.ids` pair under `dir`.
    pub fn open(
        dir: &Path,
        name: &'static str,
        codec: C,
        allocation_unit: u64,
        grab_size: usize,
    ) -> Result<Self> {
        let record_size = codec.record_size();
        if record_size < 2 || record_size as u64 > allocation_unit {
            return Err(GraphError::Config(format!(
                "{name} record size {record_size} does not fit allocation unit {allocation_unit}"
            )));
        }
        let (data_path, ids_path) = store_paths(dir, name);
        let data = MappedFile::open(data_path, allocation_unit)?;
        let ids = IdGenerator::open(ids_path, name, allocation_unit, grab_size)?;
        debug!(
            store = name,
            record_size,
            len = data.len(),
            next_id = ids.next_id(),
            "slots.open"
        );
        Ok(Self {
            name,
            data,
            ids,
            codec,
            record_size,
            per_unit: allocation_unit / record_size as u64,
            closed: false,
        })
    }

    /// Store name used in file names, logs and errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The codec backing this repository.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Byte offset of slot `id`.
    pub fn offset(&self, id: SlotId) -> u64 {
        let index = u64::from(id - 1);
        let unit = self.data.allocation_unit();
        (index / self.per_unit) * unit + (index % self.per_unit) * self.record_size as u64
    }

    /// Number of slots addressable within the current store length.
    pub fn capacity(&self) -> u64 {
        (self.data.len() / self.data.allocation_unit()) * self.per_unit
    }

    /// Allocates an id and writes `record` into its slot, growing the store
    /// when the slot lies past the current end.
    pub fn create(&mut self, record: &C::Record) -> Result<SlotId> {
        let id = self.ids.generate_id()?;
        let offset = self.offset(id);
        if self.data.ensure_len(offset + self.record_size as u64)? {
            debug!(store = self.name, id, len = self.data.len(), "slots.grow");
        }
        if self.data.read_u8(offset)? & FLAG_IN_USE != 0 {
            return Err(GraphError::SlotInUse {
                store: self.name,
                id,
            });
        }
        self.write_slot(offset, record)?;
        trace!(store = self.name, id, "slots.create");
        Ok(id)
    }

    /// Reads slot `id`. Free and never-issued slots are absent.
    pub fn read(&self, id: SlotId) -> Result<Option<C::Record>> {
        if id == 0 || id >= self.ids.next_id() {
            return Ok(None);
        }
        let slot = self.load(id)?;
        if slot[0] & FLAG_IN_USE == 0 {
            return Ok(None);
        }
        self.codec.read(&slot).map(Some)
    }

    /// Reads a slot that must be live.
    pub fn get(&self, id: SlotId) -> Result<C::Record> {
        self.read(id)?.ok_or(GraphError::SlotNotInUse {
            store: self.name,
            id: u64::from(id),
        })
    }

    /// True when slot `id` is live.
    pub fn contains(&self, id: SlotId) -> Result<bool> {
        if id == 0 || id >= self.ids.next_id() {
            return Ok(false);
        }
        Ok(self.data.read_u8(self.offset(id))? & FLAG_IN_USE != 0)
    }

    /// Overwrites a live slot.
    pub fn update(&mut self, id: SlotId, record: &C::Record) -> Result<()> {
        let offset = self.live_offset(id)?;
        self.write_slot(offset, record)
    }

    /// Clears a live slot and returns its id to the generator.
    pub fn delete(&mut self, id: SlotId) -> Result<()> {
        let offset = self.live_offset(id)?;
        let zeroes = vec![0u8; self.record_size];
        self.data.write_at(offset, &zeroes)?;
        self.ids.free_id(id)?;
        trace!(store = self.name, id, "slots.delete");
        Ok(())
    }

    /// Lazily walks every live slot from id 1 to the end of the store.
    pub fn scan(&self) -> SlotScan<'_, C> {
        SlotScan {
            repo: self,
            next: 1,
            end: self.capacity(),
        }
    }

    /// Counts live slots with a full scan.
    pub fn count(&self) -> Result<u64> {
        let mut live = 0;
        for entry in self.scan() {
            entry?;
            live += 1;
        }
        Ok(live)
    }

    /// True when the id file was found dirty on open.
    pub fn is_corrupted(&self) -> bool {
        self.ids.is_corrupted()
    }

    /// The id generator of this store.
    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    /// Flushes the data file and the id file.
    pub fn flush(&mut self) -> Result<()> {
        self.ids.flush()?;
        self.data.flush()
    }

    /// Flushes and marks the id file clean.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.data.flush()?;
        self.ids.close()?;
        self.closed = true;
        debug!(store = self.name, "slots.close");
        Ok(())
    }

    fn load(&self, id: SlotId) -> Result<Vec<u8>> {
        let mut slot = vec![0u8; self.record_size];
        self.data.read_at(self.offset(id), &mut slot)?;
        Ok(slot)
    }

    fn live_offset(&self, id: SlotId) -> Result<u64> {
        if !self.contains(id)? {
            return Err(GraphError::SlotNotInUse {
                store: self.name,
                id: u64::from(id),
            });
        }
        Ok(self.offset(id))
    }

    fn write_slot(&mut self, offset: u64, record: &C::Record) -> Result<()> {
        let mut slot = vec![0u8; self.record_size];
        let extra = self.codec.write(record, &mut slot);
        slot[0] = FLAG_IN_USE | (extra & !FLAG_IN_USE);
        self.data.write_at(offset, &slot)
    }
}

/// Forward-only iterator over live slots. Call
/// [`SlotRepository::scan`] again to restart.
pub struct SlotScan<'a, C: RecordCodec> {
    repo: &'a SlotRepository<C>,
    next: u64,
    end: u64,
}

impl<'a, C: RecordCodec> Iterator for SlotScan<'a, C> {
    type Item = Result<(SlotId, C::Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next <= self.end {
            let id = self.next as SlotId;
            self.next += 1;
            match self.repo.read(id) {
                Ok(Some(record)) => return Some(Ok((id, record))),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}

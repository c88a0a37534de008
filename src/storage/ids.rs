#![forbid(unsafe_code)]

//! Per-store id allocation with recycled ids persisted in a companion file.
//!
//! Layout of the `.ids` file:
//!
//! | offset | field                                   |
//! |--------|-----------------------------------------|
//! | 0      | dirty marker, set while the store is open |
//! | 1      | `i32` next sequential id                |
//! | 5      | `i32` number of persisted free ids      |
//! | 12..   | packed `i32` free ids                   |
//!
//! Frees are buffered in memory and appended to the persisted array one
//! batch (`grab_size` ids) at a time; allocation pulls batches back from the
//! tail of the array. The array is not page aligned, so batches can straddle
//! two allocation units; [`MappedFile`] splits those copies.

use std::mem;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::primitives::bytes::le;
use crate::primitives::mmap::MappedFile;
use crate::types::{GraphError, Result, SlotId, MAX_SLOT_ID};

/// Default number of ids moved between memory and disk per batch.
pub const DEFAULT_GRAB_SIZE: usize = 64;

const DIRTY_OFFSET: u64 = 0;
const NEXT_ID_OFFSET: usize = 1;
const FREE_COUNT_OFFSET: usize = 5;
const HEADER_FIELDS_LEN: usize = 8;
const FREE_IDS_OFFSET: u64 = 12;
const ID_WIDTH: u64 = 4;
const DIRTY: u8 = 1;
const CLEAN: u8 = 0;

/// Issues and recycles slot ids for one repository.
pub struct IdGenerator {
    store: &'static str,
    file: MappedFile,
    next_id: SlotId,
    persisted_free: u32,
    grab_size: usize,
    freed: Vec<SlotId>,
    grabbed: Vec<SlotId>,
    corrupted: bool,
    closed: bool,
}

impl IdGenerator {
    /// Opens (or creates) the id file at `path`.
    ///
    /// Sets the dirty marker immediately; if it was already set the previous
    /// session did not close cleanly and [`IdGenerator::is_corrupted`]
    /// reports it. Nothing is repaired.
    pub fn open(
        path: impl AsRef<Path>,
        store: &'static str,
        allocation_unit: u64,
        grab_size: usize,
    ) -> Result<Self> {
        if grab_size == 0 {
            return Err(GraphError::Config("grab size must be at least 1".into()));
        }
        let mut file = MappedFile::open(path, allocation_unit)?;
        let corrupted = file.read_u8(DIRTY_OFFSET)? != CLEAN;
        let mut header = [0u8; FREE_IDS_OFFSET as usize];
        file.read_at(0, &mut header)?;
        let raw_next = le::get_i32(&header, NEXT_ID_OFFSET);
        let raw_free = le::get_i32(&header, FREE_COUNT_OFFSET);
        if raw_next < 0 || raw_free < 0 {
            return Err(GraphError::Corruption(format!(
                "{store} id header holds negative counters ({raw_next}, {raw_free})"
            )));
        }
        let next_id = if raw_next == 0 { 1 } else { raw_next as SlotId };
        let persisted_free = raw_free as u32;
        let array_end = FREE_IDS_OFFSET + u64::from(persisted_free) * ID_WIDTH;
        if array_end > file.len() {
            return Err(GraphError::Corruption(format!(
                "{store} free-id array ends at {array_end} past file length {}",
                file.len()
            )));
        }
        if corrupted {
            warn!(
                store,
                path = %file.path().display(),
                "ids.open.dirty_marker_set"
            );
        }
        file.write_u8(DIRTY_OFFSET, DIRTY)?;
        let mut gen = Self {
            store,
            file,
            next_id,
            persisted_free,
            grab_size,
            freed: Vec::with_capacity(grab_size),
            grabbed: Vec::with_capacity(grab_size),
            corrupted,
            closed: false,
        };
        gen.write_header()?;
        gen.file.flush()?;
        debug!(store, next_id, free = persisted_free, "ids.open");
        Ok(gen)
    }

    /// Returns a reusable id if one is cached or persisted, otherwise the
    /// next sequential id.
    pub fn generate_id(&mut self) -> Result<SlotId> {
        if let Some(id) = self.freed.pop() {
            trace!(store = self.store, id, "ids.reuse.fresh");
            return Ok(id);
        }
        if self.grabbed.is_empty() && self.persisted_free > 0 {
            self.grab_batch()?;
        }
        if let Some(id) = self.grabbed.pop() {
            trace!(store = self.store, id, "ids.reuse.persisted");
            return Ok(id);
        }
        if self.next_id > MAX_SLOT_ID {
            return Err(GraphError::IdSpaceExhausted(self.store));
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    /// Returns `id` to the pool. Once `grab_size` ids are buffered they are
    /// appended to the persisted array and a batch is read back if the
    /// allocation cache is empty.
    pub fn free_id(&mut self, id: SlotId) -> Result<()> {
        if id == 0 || id >= self.next_id {
            return Err(GraphError::InvalidArgument(format!(
                "{} id {id} was never issued",
                self.store
            )));
        }
        self.freed.push(id);
        if self.freed.len() >= self.grab_size {
            let batch = mem::take(&mut self.freed);
            self.append_free(&batch)?;
            if self.grabbed.is_empty() {
                self.grab_batch()?;
            }
        }
        Ok(())
    }

    /// Next sequential id that would be issued with an empty free list.
    pub fn next_id(&self) -> SlotId {
        self.next_id
    }

    /// Total recyclable ids, in memory and on disk.
    pub fn free_count(&self) -> usize {
        self.persisted_free as usize + self.freed.len() + self.grabbed.len()
    }

    /// True when the file was found dirty on open.
    pub fn is_corrupted(&self) -> bool {
        self.corrupted
    }

    /// Spills every cached id to disk and flushes the file.
    pub fn flush(&mut self) -> Result<()> {
        let mut pending = mem::take(&mut self.freed);
        pending.append(&mut self.grabbed);
        self.append_free(&pending)?;
        self.write_header()?;
        self.file.flush()
    }

    /// Flushes and clears the dirty marker.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush()?;
        self.file.write_u8(DIRTY_OFFSET, CLEAN)?;
        self.file.flush()?;
        self.closed = true;
        debug!(store = self.store, next_id = self.next_id, "ids.close");
        Ok(())
    }

    fn append_free(&mut self, ids: &[SlotId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let start = FREE_IDS_OFFSET + u64::from(self.persisted_free) * ID_WIDTH;
        let end = start + ids.len() as u64 * ID_WIDTH;
        self.file.ensure_len(end)?;
        let mut buf = Vec::with_capacity(ids.len() * ID_WIDTH as usize);
        for &id in ids {
            buf.extend_from_slice(&(id as i32).to_le_bytes());
        }
        self.file.write_at(start, &buf)?;
        self.persisted_free += ids.len() as u32;
        self.write_header()?;
        debug!(
            store = self.store,
            batch = ids.len(),
            persisted = self.persisted_free,
            "ids.flush_batch"
        );
        Ok(())
    }

    fn grab_batch(&mut self) -> Result<()> {
        let take = (self.persisted_free as usize).min(self.grab_size);
        if take == 0 {
            return Ok(());
        }
        let remaining = self.persisted_free - take as u32;
        let start = FREE_IDS_OFFSET + u64::from(remaining) * ID_WIDTH;
        let mut buf = vec![0u8; take * ID_WIDTH as usize];
        self.file.read_at(start, &mut buf)?;
        for chunk in buf.chunks_exact(ID_WIDTH as usize) {
            let raw = le::get_i32(chunk, 0);
            if raw <= 0 || raw as SlotId >= self.next_id {
                return Err(GraphError::Corruption(format!(
                    "{} free list holds id {raw} outside 1..{}",
                    self.store, self.next_id
                )));
            }
            self.grabbed.push(raw as SlotId);
        }
        self.persisted_free = remaining;
        self.write_header()?;
        trace!(store = self.store, batch = take, remaining, "ids.grab_batch");
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        let mut fields = [0u8; HEADER_FIELDS_LEN];
        le::put_i32(&mut fields, 0, self.next_id as i32);
        le::put_i32(&mut fields, 4, self.persisted_free as i32);
        self.file.write_at(NEXT_ID_OFFSET as u64, &fields)
    }
}

impl Drop for IdGenerator {
    fn drop(&mut self) {
        if !self.closed {
            warn!(store = self.store, "ids.drop.unclosed");
            if let Err(err) = self.close() {
                warn!(store = self.store, error = %err, "ids.drop.close_failed");
            }
        }
    }
}

#![forbid(unsafe_code)]

//! Values longer than one slot, stored as a doubly linked chain of
//! fixed-size blocks.
//!
//! Block slot layout: `[flags][i32 prev][i32 next][i32 length][data]`. The
//! first block of a chain has no previous block and is the only valid entry
//! point for reads and deletes.

use std::path::Path;

use tracing::trace;

use crate::primitives::bytes::{le, link};
use crate::storage::slots::{RecordCodec, SlotRepository};
use crate::types::{GraphError, Result, SlotId};

/// Default upper bound on data bytes per block.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 51;

/// Bytes preceding the data area.
pub const BLOCK_HEADER_SIZE: usize = 13;

const PREV: usize = 1;
const NEXT: usize = 5;
const LENGTH: usize = 9;

/// Data capacity for a configured maximum: aligned down to an even size.
pub const fn effective_block_size(max_block_size: usize) -> usize {
    max_block_size & !1
}

/// One fragment of a chained value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockRecord {
    /// Previous block, `None` on the first block.
    pub prev: Option<SlotId>,
    /// Next block, `None` on the last block.
    pub next: Option<SlotId>,
    /// Fragment bytes; its length is the stored `Length` field.
    pub data: Vec<u8>,
}

/// Codec for [`BlockRecord`] with a fixed data capacity.
#[derive(Clone, Copy, Debug)]
pub struct BlockCodec {
    block_size: usize,
}

impl BlockCodec {
    /// Codec whose data area holds `block_size` bytes.
    pub fn new(block_size: usize) -> Self {
        Self { block_size }
    }

    /// Data capacity per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl RecordCodec for BlockCodec {
    type Record = BlockRecord;

    fn record_size(&self) -> usize {
        BLOCK_HEADER_SIZE + self.block_size
    }

    fn read(&self, slot: &[u8]) -> Result<BlockRecord> {
        let len = le::get_i32(slot, LENGTH);
        if len < 0 || len as usize > self.block_size {
            return Err(GraphError::Corruption(format!(
                "block length {len} exceeds capacity {}",
                self.block_size
            )));
        }
        let data = slot[BLOCK_HEADER_SIZE..BLOCK_HEADER_SIZE + len as usize].to_vec();
        Ok(BlockRecord {
            prev: link::get(slot, PREV)?,
            next: link::get(slot, NEXT)?,
            data,
        })
    }

    fn write(&self, record: &BlockRecord, slot: &mut [u8]) -> u8 {
        debug_assert!(record.data.len() <= self.block_size);
        link::put(slot, PREV, record.prev);
        link::put(slot, NEXT, record.next);
        le::put_i32(slot, LENGTH, record.data.len() as i32);
        slot[BLOCK_HEADER_SIZE..BLOCK_HEADER_SIZE + record.data.len()]
            .copy_from_slice(&record.data);
        0
    }
}

/// Chained block storage for strings and byte values.
pub struct BlockRepository {
    slots: SlotRepository<BlockCodec>,
}

impl BlockRepository {
    /// Opens the block store `name` under `dir`.
    pub fn open(
        dir: &Path,
        name: &'static str,
        max_block_size: usize,
        allocation_unit: u64,
        grab_size: usize,
    ) -> Result<Self> {
        let block_size = effective_block_size(max_block_size);
        if block_size == 0 {
            return Err(GraphError::Config(format!(
                "max block size {max_block_size} leaves no room for data"
            )));
        }
        let slots = SlotRepository::open(
            dir,
            name,
            BlockCodec::new(block_size),
            allocation_unit,
            grab_size,
        )?;
        Ok(Self { slots })
    }

    /// Data capacity per block.
    pub fn block_size(&self) -> usize {
        self.slots.codec().block_size()
    }

    /// Stores `bytes` as a new chain and returns its first block. An empty
    /// value still occupies one block.
    pub fn write(&mut self, bytes: &[u8]) -> Result<SlotId> {
        let block_size = self.block_size();
        let mut head = None;
        let mut tail: Option<(SlotId, BlockRecord)> = None;
        let mut chunks: Vec<&[u8]> = bytes.chunks(block_size).collect();
        if chunks.is_empty() {
            chunks.push(&[]);
        }
        for chunk in chunks {
            let record = BlockRecord {
                prev: tail.as_ref().map(|(id, _)| *id),
                next: None,
                data: chunk.to_vec(),
            };
            let id = self.slots.create(&record)?;
            match tail.take() {
                Some((prev_id, mut prev)) => {
                    prev.next = Some(id);
                    self.slots.update(prev_id, &prev)?;
                }
                None => head = Some(id),
            }
            tail = Some((id, record));
        }
        let head = head.ok_or_else(|| GraphError::Corruption("empty block chain".into()))?;
        trace!(store = self.slots.name(), head, len = bytes.len(), "blocks.write");
        Ok(head)
    }

    /// Stores a UTF-8 string.
    pub fn write_str(&mut self, value: &str) -> Result<SlotId> {
        self.write(value.as_bytes())
    }

    /// Concatenates the chain starting at `head`.
    pub fn read(&self, head: SlotId) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.walk(head, |_, block| {
            out.extend_from_slice(&block.data);
            Ok(())
        })?;
        Ok(out)
    }

    /// Reads a chain and decodes it as UTF-8.
    pub fn read_str(&self, head: SlotId) -> Result<String> {
        String::from_utf8(self.read(head)?).map_err(|err| {
            GraphError::Corruption(format!("block chain {head} is not valid UTF-8: {err}"))
        })
    }

    /// Number of blocks in the chain starting at `head`.
    pub fn chain_len(&self, head: SlotId) -> Result<usize> {
        let mut blocks = 0;
        self.walk(head, |_, _| {
            blocks += 1;
            Ok(())
        })?;
        Ok(blocks)
    }

    /// Releases every block of the chain starting at `head`.
    pub fn delete(&mut self, head: SlotId) -> Result<usize> {
        let mut ids = Vec::new();
        self.walk(head, |id, _| {
            ids.push(id);
            Ok(())
        })?;
        for &id in &ids {
            self.slots.delete(id)?;
        }
        trace!(store = self.slots.name(), head, blocks = ids.len(), "blocks.delete");
        Ok(ids.len())
    }

    /// Live block count, by full scan.
    pub fn count(&self) -> Result<u64> {
        self.slots.count()
    }

    /// True when the id file was found dirty on open.
    pub fn is_corrupted(&self) -> bool {
        self.slots.is_corrupted()
    }

    /// Flushes data and id files.
    pub fn flush(&mut self) -> Result<()> {
        self.slots.flush()
    }

    /// Flushes and marks the store clean.
    pub fn close(&mut self) -> Result<()> {
        self.slots.close()
    }

    fn walk<F>(&self, head: SlotId, mut visit: F) -> Result<()>
    where
        F: FnMut(SlotId, &BlockRecord) -> Result<()>,
    {
        let first = self.slots.get(head)?;
        if first.prev.is_some() {
            return Err(GraphError::NotChainHead { id: head });
        }
        let limit = self.slots.capacity();
        let mut seen = 1u64;
        let mut id = head;
        let mut block = first;
        loop {
            visit(id, &block)?;
            let Some(next) = block.next else {
                return Ok(());
            };
            seen += 1;
            if seen > limit {
                return Err(GraphError::Corruption(format!(
                    "block chain {head} loops"
                )));
            }
            let next_block = self.slots.read(next)?.ok_or_else(|| {
                GraphError::Corruption(format!("block {id} links to free block {next}"))
            })?;
            if next_block.prev != Some(id) {
                return Err(GraphError::Corruption(format!(
                    "block {next} does not link back to {id}"
                )));
            }
            id = next;
            block = next_block;
        }
    }
}

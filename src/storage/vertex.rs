#![forbid(unsafe_code)]

//! Vertex slot layout: `[flags][i32 next_edge][i32 next_property]`.

use crate::primitives::bytes::link;
use crate::storage::slots::{RecordCodec, SlotRepository};
use crate::types::{Result, SlotId};

/// Size of one vertex slot.
pub const VERTEX_RECORD_SIZE: usize = 9;

const NEXT_EDGE: usize = 1;
const NEXT_PROPERTY: usize = 5;

/// Heads of a vertex's adjacency and property chains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexRecord {
    /// First edge of the combined adjacency chain.
    pub next_edge: Option<SlotId>,
    /// First node of the property chain.
    pub next_property: Option<SlotId>,
}

/// Codec for [`VertexRecord`].
#[derive(Clone, Copy, Debug, Default)]
pub struct VertexCodec;

impl RecordCodec for VertexCodec {
    type Record = VertexRecord;

    fn record_size(&self) -> usize {
        VERTEX_RECORD_SIZE
    }

    fn read(&self, slot: &[u8]) -> Result<VertexRecord> {
        Ok(VertexRecord {
            next_edge: link::get(slot, NEXT_EDGE)?,
            next_property: link::get(slot, NEXT_PROPERTY)?,
        })
    }

    fn write(&self, record: &VertexRecord, slot: &mut [u8]) -> u8 {
        link::put(slot, NEXT_EDGE, record.next_edge);
        link::put(slot, NEXT_PROPERTY, record.next_property);
        0
    }
}

/// Vertex slots.
pub type VertexRepository = SlotRepository<VertexCodec>;

#![forbid(unsafe_code)]

//! Edge slot layout.
//!
//! ```text
//! 0  flags (bit 0 in use, bit 1 directed)
//! 1  i32 out vertex        5  i32 in vertex        9  i32 label
//! 13 i32 out-side prev     17 i32 out-side next
//! 21 i32 in-side prev      25 i32 in-side next     29 i32 next property
//! ```
//!
//! One physical record sits in two adjacency chains: the out vertex's chain
//! threads through the out-side pointers and the in vertex's chain through
//! the in-side pointers. A self-loop is threaded once, through the out side.

use crate::primitives::bytes::link;
use crate::storage::slots::{RecordCodec, SlotRepository};
use crate::types::{Result, SlotId};

/// Size of one edge slot.
pub const EDGE_RECORD_SIZE: usize = 33;

/// Flags bit set on directed edges.
pub const FLAG_DIRECTED: u8 = 0x02;

const OUT_VERTEX: usize = 1;
const IN_VERTEX: usize = 5;
const LABEL: usize = 9;
const OUT_PREV: usize = 13;
const OUT_NEXT: usize = 17;
const IN_PREV: usize = 21;
const IN_NEXT: usize = 25;
const NEXT_PROPERTY: usize = 29;

/// Which pair of adjacency pointers a vertex uses on an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// The vertex is the edge's out vertex.
    Out,
    /// The vertex is the edge's in vertex.
    In,
}

/// Decoded edge slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeRecord {
    /// Whether the edge is directed.
    pub directed: bool,
    /// Tail vertex.
    pub out_vertex: SlotId,
    /// Head vertex.
    pub in_vertex: SlotId,
    /// Label dictionary entry.
    pub label: SlotId,
    /// Previous edge in the out vertex's chain.
    pub out_prev: Option<SlotId>,
    /// Next edge in the out vertex's chain.
    pub out_next: Option<SlotId>,
    /// Previous edge in the in vertex's chain.
    pub in_prev: Option<SlotId>,
    /// Next edge in the in vertex's chain.
    pub in_next: Option<SlotId>,
    /// First node of the property chain.
    pub next_property: Option<SlotId>,
}

impl EdgeRecord {
    /// True when both ends are the same vertex.
    pub fn is_self_loop(&self) -> bool {
        self.out_vertex == self.in_vertex
    }

    /// Side through which `vertex`'s chain threads this edge.
    pub fn side_of(&self, vertex: SlotId) -> Side {
        if self.out_vertex == vertex {
            Side::Out
        } else {
            Side::In
        }
    }

    /// `(prev, next)` on the given side.
    pub fn links(&self, side: Side) -> (Option<SlotId>, Option<SlotId>) {
        match side {
            Side::Out => (self.out_prev, self.out_next),
            Side::In => (self.in_prev, self.in_next),
        }
    }

    /// Sets the previous pointer on the given side.
    pub fn set_prev(&mut self, side: Side, prev: Option<SlotId>) {
        match side {
            Side::Out => self.out_prev = prev,
            Side::In => self.in_prev = prev,
        }
    }

    /// Sets the next pointer on the given side.
    pub fn set_next(&mut self, side: Side, next: Option<SlotId>) {
        match side {
            Side::Out => self.out_next = next,
            Side::In => self.in_next = next,
        }
    }
}

/// Codec for [`EdgeRecord`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeCodec;

impl RecordCodec for EdgeCodec {
    type Record = EdgeRecord;

    fn record_size(&self) -> usize {
        EDGE_RECORD_SIZE
    }

    fn read(&self, slot: &[u8]) -> Result<EdgeRecord> {
        Ok(EdgeRecord {
            directed: slot[0] & FLAG_DIRECTED != 0,
            out_vertex: link::get_required(slot, OUT_VERTEX)?,
            in_vertex: link::get_required(slot, IN_VERTEX)?,
            label: link::get_required(slot, LABEL)?,
            out_prev: link::get(slot, OUT_PREV)?,
            out_next: link::get(slot, OUT_NEXT)?,
            in_prev: link::get(slot, IN_PREV)?,
            in_next: link::get(slot, IN_NEXT)?,
            next_property: link::get(slot, NEXT_PROPERTY)?,
        })
    }

    fn write(&self, record: &EdgeRecord, slot: &mut [u8]) -> u8 {
        link::put(slot, OUT_VERTEX, Some(record.out_vertex));
        link::put(slot, IN_VERTEX, Some(record.in_vertex));
        link::put(slot, LABEL, Some(record.label));
        link::put(slot, OUT_PREV, record.out_prev);
        link::put(slot, OUT_NEXT, record.out_next);
        link::put(slot, IN_PREV, record.in_prev);
        link::put(slot, IN_NEXT, record.in_next);
        link::put(slot, NEXT_PROPERTY, record.next_property);
        if record.directed {
            FLAG_DIRECTED
        } else {
            0
        }
    }
}

/// Edge slots.
pub type EdgeRepository = SlotRepository<EdgeCodec>;

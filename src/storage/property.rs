#![forbid(unsafe_code)]

//! Property node slot layout.
//!
//! ```text
//! 0  flags          1  i32 type tag     5  i32 key index
//! 9  i64 inline value or block id
//! 17 i32 previous   21 i32 next
//! ```

use std::convert::TryFrom;

use crate::primitives::bytes::{le, link};
use crate::storage::slots::{RecordCodec, SlotRepository};
use crate::types::{GraphError, Result, SlotId};

/// Size of one property slot.
pub const PROPERTY_RECORD_SIZE: usize = 25;

const KIND: usize = 1;
const KEY: usize = 5;
const PAYLOAD: usize = 9;
const PREV: usize = 17;
const NEXT: usize = 21;

/// Type tag stored with every property node.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// `bool`, inline.
    Bool = 1,
    /// `i32`, inline.
    Int32 = 2,
    /// `i64`, inline.
    Int64 = 3,
    /// `f32`, inline.
    Float32 = 4,
    /// `f64`, inline.
    Float64 = 5,
    /// UTF-8 string in block storage.
    Str = 6,
    /// Raw bytes in block storage.
    Bytes = 7,
}

impl PropertyKind {
    /// Raw tag value.
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// True when the payload is a block id rather than the value itself.
    pub const fn uses_blocks(self) -> bool {
        matches!(self, PropertyKind::Str | PropertyKind::Bytes)
    }
}

impl TryFrom<i32> for PropertyKind {
    type Error = GraphError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(PropertyKind::Bool),
            2 => Ok(PropertyKind::Int32),
            3 => Ok(PropertyKind::Int64),
            4 => Ok(PropertyKind::Float32),
            5 => Ok(PropertyKind::Float64),
            6 => Ok(PropertyKind::Str),
            7 => Ok(PropertyKind::Bytes),
            other => Err(GraphError::UnknownTypeTag(other)),
        }
    }
}

/// Decoded property node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyRecord {
    /// Value type.
    pub kind: PropertyKind,
    /// Key dictionary entry.
    pub key: SlotId,
    /// Inline value bits, or the head block id for block-stored kinds.
    pub payload: i64,
    /// Previous node in the owner's chain.
    pub prev: Option<SlotId>,
    /// Next node in the owner's chain.
    pub next: Option<SlotId>,
}

impl PropertyRecord {
    /// Head block of the value, for block-stored kinds.
    pub fn value_block(&self) -> Result<Option<SlotId>> {
        if !self.kind.uses_blocks() {
            return Ok(None);
        }
        match SlotId::try_from(self.payload) {
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(GraphError::Corruption(format!(
                "property value block id {} out of range",
                self.payload
            ))),
        }
    }
}

/// Codec for [`PropertyRecord`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PropertyCodec;

impl RecordCodec for PropertyCodec {
    type Record = PropertyRecord;

    fn record_size(&self) -> usize {
        PROPERTY_RECORD_SIZE
    }

    fn read(&self, slot: &[u8]) -> Result<PropertyRecord> {
        Ok(PropertyRecord {
            kind: PropertyKind::try_from(le::get_i32(slot, KIND))?,
            key: link::get_required(slot, KEY)?,
            payload: le::get_i64(slot, PAYLOAD),
            prev: link::get(slot, PREV)?,
            next: link::get(slot, NEXT)?,
        })
    }

    fn write(&self, record: &PropertyRecord, slot: &mut [u8]) -> u8 {
        le::put_i32(slot, KIND, record.kind.as_i32());
        link::put(slot, KEY, Some(record.key));
        le::put_i64(slot, PAYLOAD, record.payload);
        link::put(slot, PREV, record.prev);
        link::put(slot, NEXT, record.next);
        0
    }
}

/// Property node slots.
pub type PropertyRepository = SlotRepository<PropertyCodec>;

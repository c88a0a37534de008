//! Identifier newtypes shared across the engine.
#![forbid(unsafe_code)]

use std::fmt;

use serde::Serialize;

pub use crate::error::{GraphError, Result};

/// Internal slot identifier. Stored on disk as a little-endian `i32`
/// where `-1` means "no link".
pub type SlotId = u32;

/// Largest slot id the on-disk `i32` fields can hold.
pub const MAX_SLOT_ID: SlotId = i32::MAX as SlotId;

/// Caller-facing vertex identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct VertexId(pub u64);

/// Caller-facing edge identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct EdgeId(pub u64);

impl VertexId {
    /// Returns the slot this id addresses, or `None` when it lies beyond the
    /// 32-bit slot range and therefore can never have been issued.
    pub fn slot(self) -> Option<SlotId> {
        slot_of(self.0)
    }
}

impl EdgeId {
    /// Returns the slot this id addresses, or `None` when out of range.
    pub fn slot(self) -> Option<SlotId> {
        slot_of(self.0)
    }
}

fn slot_of(raw: u64) -> Option<SlotId> {
    if raw == 0 || raw > u64::from(MAX_SLOT_ID) {
        None
    } else {
        Some(raw as SlotId)
    }
}

impl From<SlotId> for VertexId {
    fn from(value: SlotId) -> Self {
        VertexId(u64::from(value))
    }
}

impl From<SlotId> for EdgeId {
    fn from(value: SlotId) -> Self {
        EdgeId(u64::from(value))
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

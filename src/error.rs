//! Error type shared by every layer of the engine.

use std::io;

use thiserror::Error;

use crate::types::SlotId;

/// Errors raised by the storage engine.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Underlying file or mapping failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A read, update or delete addressed a free slot.
    #[error("slot {id} in {store} is not in use")]
    SlotNotInUse {
        /// Store name.
        store: &'static str,
        /// Offending id as addressed by the caller.
        id: u64,
    },
    /// A freshly issued id pointed at a slot that is already live.
    #[error("slot {id} in {store} is already in use")]
    SlotInUse {
        /// Store name.
        store: &'static str,
        /// Offending slot.
        id: SlotId,
    },
    /// A block chain was entered somewhere other than its first block.
    #[error("block {id} is not the head of its chain")]
    NotChainHead {
        /// Offending block.
        id: SlotId,
    },
    /// A property record carries a type tag this engine does not know.
    #[error("unknown property type tag {0}")]
    UnknownTypeTag(i32),
    /// Access past the current end of a mapped store.
    #[error("offset {offset} out of bounds (store length {len})")]
    OutOfBounds {
        /// Requested end offset.
        offset: u64,
        /// Current store length.
        len: u64,
    },
    /// On-disk structure that cannot be produced by a well-behaved writer.
    #[error("corruption detected: {0}")]
    Corruption(String),
    /// Caller supplied an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A named entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The 31-bit id space of a store has been used up.
    #[error("id space exhausted in {0}")]
    IdSpaceExhausted(&'static str),
    /// Options or configuration file rejected.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, GraphError>;

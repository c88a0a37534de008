//! Low-level primitives for building the storage engine.
//!
//! Includes little-endian field codecs and the page-mapped byte store.

/// Byte-level utilities and encoding/decoding.
///
/// Fixed-offset little-endian accessors and the nil-link convention used by
/// every slot layout.
pub mod bytes;

/// Memory-mapped file growing in allocation units.
pub mod mmap;

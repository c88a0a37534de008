#![forbid(unsafe_code)]
//! Little-endian field codecs for the fixed record layouts.

pub mod le {
    //! Fixed-width little-endian integers at explicit offsets.
    //!
    //! Callers hand in slot-sized buffers; a short buffer is a programming
    //! error and panics.

    fn array<const N: usize>(src: &[u8], off: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&src[off..off + N]);
        out
    }

    /// Reads an `i32` at `off`.
    pub fn get_i32(src: &[u8], off: usize) -> i32 {
        i32::from_le_bytes(array(src, off))
    }

    /// Writes an `i32` at `off`.
    pub fn put_i32(dst: &mut [u8], off: usize, v: i32) {
        dst[off..off + 4].copy_from_slice(&v.to_le_bytes());
    }

    /// Reads an `i64` at `off`.
    pub fn get_i64(src: &[u8], off: usize) -> i64 {
        i64::from_le_bytes(array(src, off))
    }

    /// Writes an `i64` at `off`.
    pub fn put_i64(dst: &mut [u8], off: usize, v: i64) {
        dst[off..off + 8].copy_from_slice(&v.to_le_bytes());
    }
}

pub mod link {
    //! Slot references stored as `i32`, with `-1` as the nil link.

    use super::le;
    use crate::types::{GraphError, Result, SlotId};

    /// On-disk encoding of "no link".
    pub const NIL: i32 = -1;

    /// Decodes an optional link. Zero and negative values other than `-1`
    /// can never be written by the engine.
    pub fn get(src: &[u8], off: usize) -> Result<Option<SlotId>> {
        match le::get_i32(src, off) {
            NIL => Ok(None),
            raw if raw > 0 => Ok(Some(raw as SlotId)),
            raw => Err(GraphError::Corruption(format!(
                "invalid slot link {raw} at offset {off}"
            ))),
        }
    }

    /// Decodes a mandatory link.
    pub fn get_required(src: &[u8], off: usize) -> Result<SlotId> {
        get(src, off)?.ok_or_else(|| {
            GraphError::Corruption(format!("missing required slot link at offset {off}"))
        })
    }

    /// Encodes an optional link.
    pub fn put(dst: &mut [u8], off: usize, link: Option<SlotId>) {
        le::put_i32(dst, off, encode(link));
    }

    /// Maps an optional link to its raw `i32` form.
    pub fn encode(link: Option<SlotId>) -> i32 {
        match link {
            Some(id) => id as i32,
            None => NIL,
        }
    }
}

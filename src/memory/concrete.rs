//! Byte-exact memory access on known bytes.
//!
//! Everything here works on plain byte arrays and known words and never builds a formula.
//! The symbolic buffer layer falls back to these whenever all operands are concrete, which
//! is the common case during execution.

use num_bigint::BigUint;

use crate::{W256, WORD_BYTES};

/// Byte at `offset`, zero past the end.
pub fn read_byte(offset: usize, bytes: &[u8]) -> u8 {
    bytes.get(offset).copied().unwrap_or(0)
}

/// Exactly `size` bytes starting at `offset`, zero-padded past the end.
pub fn slice_with_zero(offset: usize, size: usize, bytes: &[u8]) -> Vec<u8> {
    let start = offset.min(bytes.len());
    let end = offset.saturating_add(size).min(bytes.len());
    let mut out = bytes[start..end].to_vec();
    out.resize(size, 0);
    out
}

/// Big-endian 32-byte word at `offset`.
pub fn read_word(offset: usize, bytes: &[u8]) -> W256 {
    BigUint::from_bytes_be(&slice_with_zero(offset, WORD_BYTES, bytes))
}

/// Big-endian 4-byte field at `offset`.
pub fn read_word32(offset: usize, bytes: &[u8]) -> u32 {
    let window = slice_with_zero(offset, 4, bytes);
    u32::from_be_bytes([window[0], window[1], window[2], window[3]])
}

/// Copies `size` bytes of `src` from `src_offset` (zero-filled past its end) into `dst`
/// at `dst_offset`. The result grows with zeros if the window ends past `dst`.
///
/// Callers guarantee `dst_offset + size` does not overflow.
pub fn write_range(
    src: &[u8],
    size: usize,
    src_offset: usize,
    dst_offset: usize,
    dst: &[u8],
) -> Vec<u8> {
    if size == 0 {
        return dst.to_vec();
    }
    let end = dst_offset + size;
    let mut out = dst.to_vec();
    if out.len() < end {
        out.resize(end, 0);
    }
    out[dst_offset..end].copy_from_slice(&slice_with_zero(src_offset, size, src));
    out
}

/// 32 big-endian bytes of a word. Bits above 256 are ignored.
pub fn word_to_bytes(word: &W256) -> [u8; WORD_BYTES] {
    let raw = word.to_bytes_be();
    let raw = &raw[raw.len().saturating_sub(WORD_BYTES)..];
    let mut out = [0u8; WORD_BYTES];
    out[WORD_BYTES - raw.len()..].copy_from_slice(raw);
    out
}

pub fn write_word(offset: usize, word: &W256, dst: &[u8]) -> Vec<u8> {
    let bytes = word_to_bytes(word);
    write_range(&bytes, WORD_BYTES, 0, offset, dst)
}

pub fn write_byte(offset: usize, byte: u8, dst: &[u8]) -> Vec<u8> {
    write_range(&[byte], 1, 0, offset, dst)
}

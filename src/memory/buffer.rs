//! Machine memory as either known bytes or byte formulas.
//!
//! Both forms answer every access the same way: reads past the end are zero, writes
//! return a new buffer and grow it with zeros when the window ends past the current
//! length. When both operands are concrete the work goes to [`crate::memory::concrete`];
//! as soon as one side is symbolic the concrete side is lifted and the symbolic path runs.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{SymError, SymResult};
use crate::expr::IntExpr;
use crate::memory::concrete;
use crate::resolve::Resolve;
use crate::word::scalar::SymWord;
use crate::{MAX_MEMORY_BYTES, SELECTOR_BYTES, W256, WORD_BYTES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Buffer {
    Concrete(Vec<u8>),
    /// Each element is a formula in `0..=255`.
    Symbolic(Vec<IntExpr>),
}

/// Turns known bytes into literal byte formulas.
pub fn lift_bytes(bytes: &[u8]) -> Vec<IntExpr> {
    bytes.iter().map(|b| IntExpr::from(*b)).collect()
}

fn offset_of(word: &W256) -> Option<usize> {
    word.to_usize()
}

/// Start and end of a `size`-byte write at `offset`, which must end within
/// [`MAX_MEMORY_BYTES`].
fn write_window(offset: &W256, size: &W256) -> SymResult<(usize, usize)> {
    let start = offset_of(offset).ok_or_else(|| SymError::overflow(offset))?;
    let count = offset_of(size).ok_or_else(|| SymError::overflow(size))?;
    let end = start
        .checked_add(count)
        .filter(|end| *end <= MAX_MEMORY_BYTES)
        .ok_or_else(|| SymError::overflow(offset))?;
    Ok((start, end))
}

impl Default for Buffer {
    fn default() -> Self {
        Buffer::empty()
    }
}

impl Buffer {
    pub fn empty() -> Self {
        Buffer::Concrete(Vec::new())
    }

    /// 32-byte big-endian image of a word.
    pub fn from_word(word: &SymWord) -> Self {
        match word.maybe_lit() {
            Some(value) => Buffer::Concrete(concrete::word_to_bytes(&value).to_vec()),
            None => Buffer::Symbolic(word.to_bytes()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Buffer::Concrete(bytes) => bytes.len(),
            Buffer::Symbolic(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_concrete(&self) -> Option<&[u8]> {
        match self {
            Buffer::Concrete(bytes) => Some(bytes),
            Buffer::Symbolic(_) => None,
        }
    }

    /// Contents as byte formulas, lifting concrete bytes to literals.
    pub fn lift(&self) -> Vec<IntExpr> {
        match self {
            Buffer::Concrete(bytes) => {
                tracing::trace!(len = bytes.len(), "lifting concrete buffer");
                lift_bytes(bytes)
            }
            Buffer::Symbolic(bytes) => bytes.clone(),
        }
    }

    pub fn to_symbolic(&self) -> Buffer {
        Buffer::Symbolic(self.lift())
    }

    /// First `n` bytes, or the whole buffer if it is shorter.
    pub fn take(&self, n: usize) -> Buffer {
        match self {
            Buffer::Concrete(bytes) => Buffer::Concrete(bytes[..n.min(bytes.len())].to_vec()),
            Buffer::Symbolic(bytes) => Buffer::Symbolic(bytes[..n.min(bytes.len())].to_vec()),
        }
    }

    /// Everything after the first `n` bytes; empty if `n` reaches the end.
    pub fn drop(&self, n: usize) -> Buffer {
        match self {
            Buffer::Concrete(bytes) => Buffer::Concrete(bytes[n.min(bytes.len())..].to_vec()),
            Buffer::Symbolic(bytes) => Buffer::Symbolic(bytes[n.min(bytes.len())..].to_vec()),
        }
    }

    pub fn concat(&self, other: &Buffer) -> Buffer {
        match (self, other) {
            (Buffer::Concrete(a), Buffer::Concrete(b)) => Buffer::Concrete([&a[..], &b[..]].concat()),
            _ => {
                let mut bytes = self.lift();
                bytes.extend(other.lift());
                Buffer::Symbolic(bytes)
            }
        }
    }

    pub fn read_byte(&self, offset: &W256) -> IntExpr {
        let Some(offset) = offset_of(offset) else {
            return IntExpr::zero();
        };
        match self {
            Buffer::Concrete(bytes) => IntExpr::from(concrete::read_byte(offset, bytes)),
            Buffer::Symbolic(bytes) => bytes.get(offset).cloned().unwrap_or_default(),
        }
    }

    /// Exactly `size` bytes from `offset`, zero-padded past the end.
    pub fn slice_with_zero(&self, offset: &W256, size: usize) -> Buffer {
        let offset = offset_of(offset);
        match self {
            Buffer::Concrete(bytes) => Buffer::Concrete(match offset {
                Some(offset) => concrete::slice_with_zero(offset, size, bytes),
                None => vec![0; size],
            }),
            Buffer::Symbolic(bytes) => {
                let start = offset.unwrap_or(usize::MAX).min(bytes.len());
                let end = start.saturating_add(size).min(bytes.len());
                let mut window = bytes[start..end].to_vec();
                window.resize(size, IntExpr::zero());
                Buffer::Symbolic(window)
            }
        }
    }

    /// Big-endian word at `offset`.
    ///
    /// Symbolic reads are tagged with the window they came from so a later byte-aligned
    /// right shift can work on the bytes directly. Concrete reads go to the byte-level
    /// delegate and come back as plain literals.
    pub fn read_word(&self, offset: &W256) -> SymWord {
        match self {
            Buffer::Concrete(bytes) => SymWord::lit(match offset_of(offset) {
                Some(offset) => concrete::read_word(offset, bytes),
                None => W256::zero(),
            }),
            Buffer::Symbolic(_) => self.read_symbolic(offset, WORD_BYTES),
        }
    }

    /// Big-endian 4-byte field at `offset`, the width of a call selector.
    pub fn read_word32(&self, offset: &W256) -> SymWord {
        match self {
            Buffer::Concrete(bytes) => SymWord::from_u64(match offset_of(offset) {
                Some(offset) => concrete::read_word32(offset, bytes).into(),
                None => 0,
            }),
            Buffer::Symbolic(_) => self.read_symbolic(offset, SELECTOR_BYTES),
        }
    }

    fn read_symbolic(&self, offset: &W256, width: usize) -> SymWord {
        SymWord::from_bytes(&self.slice_with_zero(offset, width).lift())
    }

    /// Copies `size` bytes of `source` starting at `src_offset` into this buffer at
    /// `dst_offset`. Bytes of the window past the end of `source` are written as zero.
    pub fn write_range(
        &self,
        source: &Buffer,
        size: &W256,
        src_offset: &W256,
        dst_offset: &W256,
    ) -> SymResult<Buffer> {
        if size.is_zero() {
            return Ok(self.clone());
        }
        let (start, end) = write_window(dst_offset, size)?;
        let count = end - start;

        if let (Buffer::Concrete(src), Buffer::Concrete(dst)) = (source, self) {
            let written = match offset_of(src_offset) {
                Some(from) => concrete::write_range(src, count, from, start, dst),
                None => concrete::write_range(&[], count, 0, start, dst),
            };
            return Ok(Buffer::Concrete(written));
        }

        let window = source.slice_with_zero(src_offset, count).lift();
        let mut bytes = self.lift();
        if bytes.len() < end {
            bytes.resize(end, IntExpr::zero());
        }
        bytes.splice(start..end, window);
        Ok(Buffer::Symbolic(bytes))
    }

    pub fn write_word(&self, offset: &W256, word: &SymWord) -> SymResult<Buffer> {
        if let (Buffer::Concrete(dst), Some(value)) = (self, word.maybe_lit()) {
            let (start, _) = write_window(offset, &W256::from(WORD_BYTES))?;
            return Ok(Buffer::Concrete(concrete::write_word(start, &value, dst)));
        }
        self.write_range(
            &Buffer::Symbolic(word.to_bytes()),
            &BigUint::from(WORD_BYTES),
            &BigUint::zero(),
            offset,
        )
    }

    /// Writes the low byte of `byte` at `offset`.
    pub fn write_byte(&self, offset: &W256, byte: &SymWord) -> SymResult<Buffer> {
        let low = byte.low_byte();
        if let (Buffer::Concrete(dst), Some(value)) = (self, low.as_lit().and_then(|v| v.to_u8())) {
            let (start, _) = write_window(offset, &W256::from(1u8))?;
            return Ok(Buffer::Concrete(concrete::write_byte(start, value, dst)));
        }
        self.write_range(
            &Buffer::Symbolic(vec![low]),
            &BigUint::from(1u8),
            &BigUint::zero(),
            offset,
        )
    }
}

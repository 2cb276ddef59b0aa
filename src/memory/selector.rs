//! Word reads at a possibly symbolic offset under a possibly symbolic length bound.
//!
//! Known index and bound reduce to an ordinary slice. Otherwise every output byte becomes
//! a chain of conditionals over the whole buffer, so the formula grows with
//! `32 * len(buffer)`. That path is for copies whose length really is input-controlled;
//! callers should make index and bound concrete whenever they can.

use num_traits::ToPrimitive;

use crate::expr::IntExpr;
use crate::memory::buffer::Buffer;
use crate::resolve::Resolve;
use crate::word::scalar::SymWord;
use crate::WORD_BYTES;

/// Reads the word at `ind` from `buf`, where bytes at position `bound` or later read as
/// zero.
pub fn read_word_bounded(ind: &SymWord, bound: &SymWord, buf: &Buffer) -> SymWord {
    match (ind.maybe_lit(), bound.maybe_lit(), buf) {
        (Some(ind), Some(bound), _) => {
            let bound = bound.to_usize().unwrap_or(usize::MAX);
            buf.take(bound).read_word(&ind)
        }
        // A concrete buffer's bound is its length
        (Some(ind), None, Buffer::Concrete(_)) => buf.read_word(&ind),
        (None, _, Buffer::Concrete(_)) => read_word_bounded(ind, bound, &buf.to_symbolic()),
        (_, _, Buffer::Symbolic(bytes)) => select_word(ind.expr(), bound.expr(), bytes),
    }
}

/// Reads the word at a possibly symbolic `ind`, bounded by the buffer's own length.
pub fn read_word_at(ind: &SymWord, buf: &Buffer) -> SymWord {
    match ind.maybe_lit() {
        Some(offset) => buf.read_word(&offset),
        None => read_word_bounded(ind, &SymWord::from_u64(buf.len() as u64), buf),
    }
}

/// Builds the selection formulas unconditionally.
pub fn select_word(ind: &IntExpr, bound: &IntExpr, bytes: &[IntExpr]) -> SymWord {
    let bounded: Vec<IntExpr> = bytes
        .iter()
        .enumerate()
        .map(|(i, byte)| {
            let past_bound = IntExpr::lit((i + 1) as u64).gt(bound);
            IntExpr::ite(past_bound, IntExpr::zero(), byte.clone())
        })
        .collect();

    // Index arithmetic is unbounded, so an index near 2^256 reads zero instead of wrapping
    let window: Vec<IntExpr> = (0..WORD_BYTES)
        .map(|j| select_byte(&(ind + &IntExpr::lit(j as u64)), &bounded))
        .collect();

    let word = SymWord::from_bytes(&window);
    tracing::debug!(
        len = bytes.len(),
        nodes = word.expr().size(),
        "symbolic bounded word read"
    );
    word
}

/// Byte at `ind`, zero past the end: walks `bytes` with a counter that descends from
/// `ind` and picks the entry where it reaches zero.
pub fn select_byte(ind: &IntExpr, bytes: &[IntExpr]) -> IntExpr {
    bytes
        .iter()
        .enumerate()
        .rev()
        .fold(IntExpr::zero(), |rest, (k, byte)| {
            let counter = ind - &IntExpr::lit(k as u64);
            IntExpr::ite(counter.equals(&IntExpr::zero()), byte.clone(), rest)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::W256;

    fn sample() -> Vec<u8> {
        (1..=40u8).collect()
    }

    #[test]
    fn test_select_byte_with_literal_index() {
        let bytes: Vec<IntExpr> = sample().iter().map(|b| IntExpr::from(*b)).collect();
        assert_eq!(select_byte(&IntExpr::lit(3u64), &bytes), IntExpr::from(4u8));
        assert_eq!(select_byte(&IntExpr::lit(40u64), &bytes), IntExpr::zero());
    }

    #[test]
    fn test_symbolic_index_builds_formula() {
        let buf = Buffer::Concrete(sample());
        let word = read_word_at(&SymWord::var("i"), &buf);
        assert!(!word.expr().is_lit());
        assert_eq!(word.provenance().source_bytes().unwrap().len(), WORD_BYTES);
    }

    #[test]
    fn test_known_index_on_concrete_buffer_ignores_bound() {
        let buf = Buffer::Concrete(sample());
        let word = read_word_bounded(&SymWord::from_u64(8), &SymWord::var("n"), &buf);
        assert_eq!(word.maybe_lit(), buf.read_word(&W256::from(8u8)).maybe_lit());
    }

    #[test]
    fn test_symbolic_bound_masks_bytes() {
        let buf = Buffer::Symbolic(vec![IntExpr::from(7u8); 4]);
        let word = read_word_bounded(&SymWord::from_u64(0), &SymWord::var("n"), &buf);
        let first = &word.provenance().source_bytes().unwrap()[0];
        assert!(matches!(first, IntExpr::Ite(..)));
    }
}

//! Resolution of symbolic values to concrete ones.
//!
//! `maybe_lit` is how callers decide which path to take. `force_lit` is for contexts that
//! need a concrete value and can report failure. `assume_lit` is the assertion form for
//! contexts that are statically concrete-only: it panics when that assumption is wrong,
//! because silently carrying on with a made-up value would corrupt machine state.

use num_traits::ToPrimitive;

use crate::error::{SymError, SymResult};
use crate::expr::IntExpr;
use crate::memory::buffer::Buffer;
use crate::word::address::SymAddr;
use crate::word::scalar::SymWord;
use crate::W256;

pub trait Resolve {
    type Concrete;

    /// What the value is called in error messages.
    const WHAT: &'static str;

    fn maybe_lit(&self) -> Option<Self::Concrete>;

    fn force_lit(&self) -> SymResult<Self::Concrete> {
        self.maybe_lit().ok_or(SymError::unresolved(Self::WHAT))
    }

    fn assume_lit(&self) -> Self::Concrete {
        match self.force_lit() {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }

    fn is_resolved(&self) -> bool {
        self.maybe_lit().is_some()
    }
}

impl Resolve for SymWord {
    type Concrete = W256;
    const WHAT: &'static str = "word";

    fn maybe_lit(&self) -> Option<W256> {
        self.expr().as_lit().and_then(|v| v.to_biguint())
    }
}

impl Resolve for SymAddr {
    type Concrete = W256;
    const WHAT: &'static str = "address";

    fn maybe_lit(&self) -> Option<W256> {
        self.expr().as_lit().and_then(|v| v.to_biguint())
    }
}

impl Resolve for IntExpr {
    type Concrete = W256;
    const WHAT: &'static str = "formula";

    fn maybe_lit(&self) -> Option<W256> {
        self.as_lit().and_then(|v| v.to_biguint())
    }
}

/// A byte sequence resolves when every element is a literal in `0..=255`.
impl Resolve for [IntExpr] {
    type Concrete = Vec<u8>;
    const WHAT: &'static str = "byte sequence";

    fn maybe_lit(&self) -> Option<Vec<u8>> {
        self.iter()
            .map(|byte| byte.as_lit().and_then(|v| v.to_u8()))
            .collect()
    }
}

impl Resolve for Buffer {
    type Concrete = Vec<u8>;
    const WHAT: &'static str = "buffer";

    fn maybe_lit(&self) -> Option<Vec<u8>> {
        match self {
            Buffer::Concrete(bytes) => Some(bytes.clone()),
            Buffer::Symbolic(bytes) => bytes.as_slice().maybe_lit(),
        }
    }
}

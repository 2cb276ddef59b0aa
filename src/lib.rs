use num_bigint::{BigInt, BigUint};
use num_traits::One;
use std::sync::LazyLock;

pub mod error;
pub mod expr;
pub mod memory;
pub mod merge;
pub mod provenance;
pub mod resolve;
pub mod word;

pub use error::{SymError, SymResult};
pub use expr::{BoolExpr, IntExpr};
pub use memory::buffer::Buffer;
pub use merge::Merge;
pub use provenance::Provenance;
pub use resolve::Resolve;
pub use word::address::SymAddr;
pub use word::scalar::SymWord;

/// Known 256-bit machine word. Always kept in `[0, 2^256)`.
pub type W256 = BigUint;

pub const WORD_BYTES: usize = 32;
pub const WORD_BITS: usize = 256;
pub const ADDR_BITS: usize = 160;
/// Width of a call selector read.
pub const SELECTOR_BYTES: usize = 4;
/// Writes ending past this many bytes are rejected with `OffsetOverflow`.
pub const MAX_MEMORY_BYTES: usize = 1 << 32;

static WORD_MODULUS: LazyLock<BigInt> = LazyLock::new(|| BigInt::one() << WORD_BITS);
static WORD_MASK: LazyLock<BigInt> = LazyLock::new(|| word_modulus() - BigInt::one());
static SIGN_BIT: LazyLock<BigInt> = LazyLock::new(|| BigInt::one() << (WORD_BITS - 1));
static ADDR_MODULUS: LazyLock<BigInt> = LazyLock::new(|| BigInt::one() << ADDR_BITS);

/// 2^256
pub fn word_modulus() -> &'static BigInt {
    &WORD_MODULUS
}

/// 2^256 - 1
pub fn word_mask() -> &'static BigInt {
    &WORD_MASK
}

/// 2^255, the smallest word read as negative.
pub fn sign_bit() -> &'static BigInt {
    &SIGN_BIT
}

/// 2^160
pub fn addr_modulus() -> &'static BigInt {
    &ADDR_MODULUS
}

//! 256-bit symbolic scalar.
//!
//! A [`SymWord`] pairs a provenance tag with an unbounded integer formula. The formula
//! backend does not bound width, so every operator here reduces modulo 2^256 or masks to
//! 256 bits before returning. Signed readings (two's complement) happen only inside the
//! operators that need them.

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SymError, SymResult};
use crate::expr::{BoolExpr, IntExpr, TerOp};
use crate::provenance::Provenance;
use crate::{W256, WORD_BITS, WORD_BYTES, sign_bit, word_mask, word_modulus};

/// Symbolic 256-bit machine word.
///
/// There is deliberately no `PartialEq`: whether two formulas denote the same number is
/// a solver question. Use [`SymWord::sym_eq`] to build that question, or
/// [`SymWord::try_eq`] when both sides are known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymWord {
    provenance: Provenance,
    expr: IntExpr,
}

fn modulus() -> IntExpr {
    IntExpr::Lit(word_modulus().clone())
}

fn mask() -> IntExpr {
    IntExpr::Lit(word_mask().clone())
}

fn bits() -> IntExpr {
    IntExpr::lit(WORD_BITS as u64)
}

fn wrap(expr: IntExpr) -> IntExpr {
    expr.modulo(&modulus())
}

fn masked(expr: IntExpr) -> IntExpr {
    expr & mask()
}

/// Two's-complement reading of an in-range word.
fn to_signed(expr: &IntExpr) -> IntExpr {
    let negative = expr.ge(&IntExpr::Lit(sign_bit().clone()));
    IntExpr::ite(negative, expr - &modulus(), expr.clone())
}

/// Big-endian fold of byte formulas into one integer.
fn reassemble(bytes: &[IntExpr]) -> IntExpr {
    let base = IntExpr::lit(256u64);
    bytes
        .iter()
        .fold(IntExpr::zero(), |acc, byte| &(&acc * &base) + byte)
}

/// `ite(cond, then_(), 0)` that skips building `then_` when `cond` is already decided.
fn guarded(cond: BoolExpr, then_: impl FnOnce() -> IntExpr, otherwise: IntExpr) -> IntExpr {
    match cond.as_lit() {
        Some(true) => then_(),
        Some(false) => otherwise,
        None => IntExpr::ite(cond, then_(), otherwise),
    }
}

impl SymWord {
    /// Literal word, reduced modulo 2^256.
    pub fn lit(value: W256) -> Self {
        Self::from_expr(wrap(IntExpr::from(&value)))
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_expr(IntExpr::lit(value))
    }

    pub fn zero() -> Self {
        Self::from_u64(0)
    }

    /// Named unknown. Range constraints on the variable belong to the solver layer.
    pub fn var(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            provenance: Provenance::Var(name.clone()),
            expr: IntExpr::Var(name),
        }
    }

    /// Wraps a formula the caller knows to be in `[0, 2^256)`.
    pub fn from_expr(expr: IntExpr) -> Self {
        Self {
            provenance: Provenance::None,
            expr,
        }
    }

    /// Big-endian reassembly of a byte window, tagged with the window itself.
    pub fn from_bytes(bytes: &[IntExpr]) -> Self {
        Self {
            provenance: Provenance::FromBytes(bytes.to_vec()),
            expr: reassemble(bytes),
        }
    }

    pub fn expr(&self) -> &IntExpr {
        &self.expr
    }

    pub fn into_expr(self) -> IntExpr {
        self.expr
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// The 32-byte window this word was read from, if the formula is exactly that
    /// window reassembled. A tag that disagrees with the formula is ignored.
    fn byte_window(&self) -> Option<&[IntExpr]> {
        let window = self
            .provenance
            .source_bytes()
            .filter(|b| b.len() == WORD_BYTES)?;
        (reassemble(window) == self.expr).then_some(window)
    }

    /// Splits the word into 32 big-endian byte formulas.
    pub fn to_bytes(&self) -> Vec<IntExpr> {
        if let Some(value) = self.expr.as_lit() {
            let (_, raw) = value.to_bytes_be();
            let mut bytes = vec![IntExpr::zero(); WORD_BYTES - raw.len().min(WORD_BYTES)];
            bytes.extend(raw.into_iter().map(IntExpr::from));
            return bytes;
        }
        if let Some(bytes) = self.byte_window() {
            return bytes.to_vec();
        }
        let ff = IntExpr::lit(0xffu64);
        (0..WORD_BYTES)
            .map(|i| {
                let shift = IntExpr::lit(8 * (WORD_BYTES - 1 - i) as u64);
                &(&self.expr >> &shift) & &ff
            })
            .collect()
    }

    /// Low eight bits as a byte formula.
    pub fn low_byte(&self) -> IntExpr {
        &self.expr & &IntExpr::lit(0xffu64)
    }

    fn lift1(&self, f: impl FnOnce(&IntExpr) -> IntExpr) -> SymWord {
        SymWord::from_expr(f(&self.expr))
    }

    fn lift2(&self, other: &SymWord, f: impl FnOnce(&IntExpr, &IntExpr) -> IntExpr) -> SymWord {
        SymWord::from_expr(f(&self.expr, &other.expr))
    }

    fn bool_word(cond: BoolExpr) -> SymWord {
        SymWord::from_expr(IntExpr::ite(cond, IntExpr::one(), IntExpr::zero()))
    }

    /// Signed division, truncating toward zero. `-2^255 / -1` wraps to `-2^255`.
    pub fn sdiv(&self, other: &SymWord) -> SymWord {
        self.lift2(other, |a, b| wrap(&to_signed(a) / &to_signed(b)))
    }

    /// Signed remainder; takes the sign of the dividend.
    pub fn smod(&self, other: &SymWord) -> SymWord {
        self.lift2(other, |a, b| wrap(&to_signed(a) % &to_signed(b)))
    }

    /// `(self + y) mod z` without intermediate wrap, then reduced modulo 2^256.
    pub fn addmod(&self, y: &SymWord, z: &SymWord) -> SymWord {
        SymWord::from_expr(wrap(IntExpr::ternary(
            TerOp::AddMod,
            self.expr.clone(),
            y.expr.clone(),
            z.expr.clone(),
        )))
    }

    /// `(self * y) mod z` without intermediate wrap.
    pub fn mulmod(&self, y: &SymWord, z: &SymWord) -> SymWord {
        SymWord::from_expr(IntExpr::ternary(
            TerOp::MulMod,
            self.expr.clone(),
            y.expr.clone(),
            z.expr.clone(),
        ))
    }

    pub fn exp(&self, exponent: &SymWord) -> SymWord {
        SymWord::from_expr(IntExpr::ternary(
            TerOp::PowMod,
            self.expr.clone(),
            exponent.expr.clone(),
            modulus(),
        ))
    }

    pub fn lt(&self, other: &SymWord) -> SymWord {
        Self::bool_word(self.expr.lt(&other.expr))
    }

    pub fn gt(&self, other: &SymWord) -> SymWord {
        Self::bool_word(self.expr.gt(&other.expr))
    }

    pub fn slt(&self, other: &SymWord) -> SymWord {
        Self::bool_word(to_signed(&self.expr).lt(&to_signed(&other.expr)))
    }

    pub fn sgt(&self, other: &SymWord) -> SymWord {
        Self::bool_word(to_signed(&self.expr).gt(&to_signed(&other.expr)))
    }

    /// Machine `EQ`: 1 or 0 as a word.
    pub fn eq_word(&self, other: &SymWord) -> SymWord {
        Self::bool_word(self.sym_eq(other))
    }

    pub fn is_zero(&self) -> SymWord {
        Self::bool_word(self.expr.equals(&IntExpr::zero()))
    }

    /// Equality as a formula for the constraint layer.
    pub fn sym_eq(&self, other: &SymWord) -> BoolExpr {
        self.expr.equals(&other.expr)
    }

    /// Host-level equality, defined only when both words are literals.
    pub fn try_eq(&self, other: &SymWord) -> SymResult<bool> {
        match (self.expr.as_lit(), other.expr.as_lit()) {
            (Some(a), Some(b)) => Ok(a == b),
            _ => Err(SymError::UnresolvedEquality),
        }
    }

    /// `self << amount`; zero once the amount reaches 256.
    pub fn shift_left(&self, amount: &SymWord) -> SymWord {
        let in_range = amount.expr.lt(&bits());
        SymWord::from_expr(guarded(
            in_range,
            || masked(&self.expr << &amount.expr),
            IntExpr::zero(),
        ))
    }

    /// `self >> amount`, logical.
    ///
    /// Words read from memory shifted by a known whole number of bytes are shifted on the
    /// byte window instead, which keeps the formula a plain reassembly of bytes.
    pub fn shift_right(&self, amount: &SymWord) -> SymWord {
        if let Some(shifted) = self.shift_bytes_right(amount) {
            return shifted;
        }
        let in_range = amount.expr.lt(&bits());
        SymWord::from_expr(guarded(
            in_range,
            || masked(&self.expr >> &amount.expr),
            IntExpr::zero(),
        ))
    }

    fn shift_bytes_right(&self, amount: &SymWord) -> Option<SymWord> {
        if self.expr.is_lit() {
            return None;
        }
        let shift = amount.expr.as_lit()?.to_usize()?;
        if shift % 8 != 0 || shift > WORD_BITS {
            return None;
        }
        let window = self.byte_window()?;
        let dropped = shift / 8;
        tracing::trace!(bytes = dropped, "right shift on byte window");
        let mut bytes = vec![IntExpr::zero(); dropped];
        bytes.extend_from_slice(&window[..WORD_BYTES - dropped]);
        Some(SymWord::from_bytes(&bytes))
    }

    /// Arithmetic shift right. Shifts of 256 or more give 0 or all ones by sign.
    pub fn sar(&self, amount: &SymWord) -> SymWord {
        self.lift2(amount, |v, n| wrap(&to_signed(v) >> n))
    }

    pub fn rotl(&self, amount: &SymWord) -> SymWord {
        let k = amount.expr.modulo(&bits());
        let back = &bits() - &k;
        self.lift1(|v| masked(&(v << &k) | &(v >> &back)))
    }

    pub fn rotr(&self, amount: &SymWord) -> SymWord {
        let k = amount.expr.modulo(&bits());
        let back = &bits() - &k;
        self.lift1(|v| masked(&(v >> &k) | &(v << &back)))
    }

    pub fn popcount(&self) -> SymWord {
        self.lift1(IntExpr::popcount)
    }

    /// 1 if bit `index` (counted from the least significant end) is set.
    pub fn test_bit(&self, index: &SymWord) -> SymWord {
        self.lift2(index, IntExpr::test_bit)
    }

    /// Machine `BYTE`: byte `index` counted from the most significant end, 0 past 31.
    pub fn byte(&self, index: &SymWord) -> SymWord {
        let in_range = index.expr.lt(&IntExpr::lit(WORD_BYTES as u64));
        let value = &self.expr;
        SymWord::from_expr(guarded(
            in_range,
            || {
                let last = IntExpr::lit((WORD_BYTES - 1) as u64);
                let shift = &(&last - &index.expr) * &IntExpr::lit(8u64);
                &(value >> &shift) & &IntExpr::lit(0xffu64)
            },
            IntExpr::zero(),
        ))
    }

    /// Machine `SIGNEXTEND`: extends the sign of byte `byte_index` (from the least
    /// significant end) through the rest of the word.
    pub fn signextend(&self, byte_index: &SymWord) -> SymWord {
        let in_range = byte_index.expr.lt(&IntExpr::lit((WORD_BYTES - 1) as u64));
        let value = &self.expr;
        SymWord::from_expr(guarded(
            in_range,
            || {
                let width = &(&byte_index.expr + &IntExpr::one()) * &IntExpr::lit(8u64);
                let low_mask = &(&IntExpr::one() << &width) - &IntExpr::one();
                let low = value & &low_mask;
                let negative = value
                    .test_bit(&(&width - &IntExpr::one()))
                    .equals(&IntExpr::one());
                let high = &mask() ^ &low_mask;
                IntExpr::ite(negative, &low | &high, low)
            },
            value.clone(),
        ))
    }
}

impl From<u64> for SymWord {
    fn from(value: u64) -> Self {
        SymWord::from_u64(value)
    }
}

impl From<W256> for SymWord {
    fn from(value: W256) -> Self {
        SymWord::lit(value)
    }
}

impl std::ops::Add for &SymWord {
    type Output = SymWord;

    fn add(self, rhs: &SymWord) -> SymWord {
        self.lift2(rhs, |a, b| wrap(a + b))
    }
}

impl std::ops::Sub for &SymWord {
    type Output = SymWord;

    fn sub(self, rhs: &SymWord) -> SymWord {
        self.lift2(rhs, |a, b| wrap(a - b))
    }
}

impl std::ops::Mul for &SymWord {
    type Output = SymWord;

    fn mul(self, rhs: &SymWord) -> SymWord {
        self.lift2(rhs, |a, b| wrap(a * b))
    }
}

/// Unsigned division; dividing by zero gives zero.
impl std::ops::Div for &SymWord {
    type Output = SymWord;

    fn div(self, rhs: &SymWord) -> SymWord {
        self.lift2(rhs, |a, b| a / b)
    }
}

/// Unsigned remainder; zero divisor gives zero.
impl std::ops::Rem for &SymWord {
    type Output = SymWord;

    fn rem(self, rhs: &SymWord) -> SymWord {
        self.lift2(rhs, |a, b| a % b)
    }
}

impl std::ops::BitAnd for &SymWord {
    type Output = SymWord;

    fn bitand(self, rhs: &SymWord) -> SymWord {
        self.lift2(rhs, |a, b| masked(a & b))
    }
}

impl std::ops::BitOr for &SymWord {
    type Output = SymWord;

    fn bitor(self, rhs: &SymWord) -> SymWord {
        self.lift2(rhs, |a, b| masked(a | b))
    }
}

impl std::ops::BitXor for &SymWord {
    type Output = SymWord;

    fn bitxor(self, rhs: &SymWord) -> SymWord {
        self.lift2(rhs, |a, b| masked(a ^ b))
    }
}

impl std::ops::Not for &SymWord {
    type Output = SymWord;

    fn not(self) -> SymWord {
        self.lift1(|a| masked(a ^ &mask()))
    }
}

impl std::ops::Shl for &SymWord {
    type Output = SymWord;

    fn shl(self, amount: &SymWord) -> SymWord {
        self.shift_left(amount)
    }
}

impl std::ops::Shr for &SymWord {
    type Output = SymWord;

    fn shr(self, amount: &SymWord) -> SymWord {
        self.shift_right(amount)
    }
}

impl fmt::Display for SymWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self.expr.as_lit() {
            Some(v) => v.to_string(),
            None => "<symbolic>".to_string(),
        };
        if self.provenance.is_none() {
            write!(f, "{}", value)
        } else {
            write!(f, "{} ({})", self.provenance, value)
        }
    }
}

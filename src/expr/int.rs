//! Unbounded integer formulas.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::expr::boolean::BoolExpr;
use crate::expr::walk::{self, Node};

/// Left shifts of literals beyond this many bits are kept symbolic.
const MAX_FOLD_SHIFT: usize = 1 << 16;

/// Binary operators over unbounded integers.
///
/// Division and remainder truncate toward zero. `Mod` is the floored modulus, so it is
/// never negative for a positive divisor. Dividing by zero yields zero for all three,
/// which is the machine's convention and keeps every literal fold total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    /// 1 if bit `rhs` of `lhs` is set, else 0.
    TestBit,
}

/// Fused three-operand operators: `(x OP y) mod z`, zero when `z` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerOp {
    AddMod,
    MulMod,
    PowMod,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Integer formula.
///
/// Equality on `IntExpr` is structural: two formulas that differ syntactically may still
/// denote the same number. Children are shared through `Arc`, so cloning is shallow.
pub enum IntExpr {
    Lit(BigInt),
    Var(String),
    Popcount(Arc<IntExpr>),
    Binary(BinOp, Arc<IntExpr>, Arc<IntExpr>),
    Ternary(TerOp, Arc<IntExpr>, Arc<IntExpr>, Arc<IntExpr>),
    Ite(Arc<BoolExpr>, Arc<IntExpr>, Arc<IntExpr>),
}

fn floor_mod(x: &BigInt, m: &BigInt) -> BigInt {
    if m.is_zero() {
        return BigInt::zero();
    }
    let r = x % m;
    if !r.is_zero() && r.is_negative() != m.is_negative() {
        r + m
    } else {
        r
    }
}

impl BinOp {
    /// Evaluates the operator on literals. `None` means the result is not worth
    /// materializing (oversized shifts) or the operands fall outside the operator's domain.
    pub fn eval(self, x: &BigInt, y: &BigInt) -> Option<BigInt> {
        let value = match self {
            BinOp::Add => x + y,
            BinOp::Sub => x - y,
            BinOp::Mul => x * y,
            BinOp::Div if y.is_zero() => BigInt::zero(),
            BinOp::Div => x / y,
            BinOp::Rem if y.is_zero() => BigInt::zero(),
            BinOp::Rem => x % y,
            BinOp::Mod => floor_mod(x, y),
            BinOp::And => x & y,
            BinOp::Or => x | y,
            BinOp::Xor => x ^ y,
            BinOp::Shl => {
                let n = y.to_usize().filter(|n| *n <= MAX_FOLD_SHIFT)?;
                x << n
            }
            BinOp::Shr => {
                if y.is_negative() {
                    return None;
                }
                match y.to_usize() {
                    Some(n) => x >> n,
                    None if x.is_negative() => -BigInt::one(),
                    None => BigInt::zero(),
                }
            }
            BinOp::TestBit => {
                if y.is_negative() {
                    return None;
                }
                let set = match y.to_u64() {
                    Some(n) => x.bit(n),
                    None => x.is_negative(),
                };
                BigInt::from(set as u8)
            }
        };
        Some(value)
    }

    /// Identities that hold regardless of the symbolic operand.
    fn simplify(self, lhs: &IntExpr, rhs: &IntExpr) -> Option<IntExpr> {
        let zero = || Some(IntExpr::zero());
        match self {
            BinOp::Add | BinOp::Or | BinOp::Xor if lhs.is_lit_u64(0) => Some(rhs.clone()),
            BinOp::Add | BinOp::Or | BinOp::Xor | BinOp::Sub | BinOp::Shl | BinOp::Shr
                if rhs.is_lit_u64(0) =>
            {
                Some(lhs.clone())
            }
            BinOp::Shl | BinOp::Shr if lhs.is_lit_u64(0) => zero(),
            BinOp::Mul | BinOp::And if lhs.is_lit_u64(0) || rhs.is_lit_u64(0) => zero(),
            BinOp::Mul if lhs.is_lit_u64(1) => Some(rhs.clone()),
            BinOp::Mul | BinOp::Div if rhs.is_lit_u64(1) => Some(lhs.clone()),
            BinOp::Div if lhs.is_lit_u64(0) || rhs.is_lit_u64(0) => zero(),
            BinOp::Rem | BinOp::Mod
                if lhs.is_lit_u64(0) || rhs.is_lit_u64(0) || rhs.is_lit_u64(1) =>
            {
                zero()
            }
            BinOp::Mod => match lhs {
                IntExpr::Binary(BinOp::Mod, _, m) if **m == *rhs => Some(lhs.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Mod => "mod",
            BinOp::And => "&",
            BinOp::Or => "|",
            BinOp::Xor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::TestBit => "bit",
        }
    }
}

impl TerOp {
    pub fn eval(self, x: &BigInt, y: &BigInt, m: &BigInt) -> Option<BigInt> {
        if m.is_zero() {
            return Some(BigInt::zero());
        }
        match self {
            TerOp::AddMod => Some(floor_mod(&(x + y), m)),
            TerOp::MulMod => Some(floor_mod(&(x * y), m)),
            TerOp::PowMod if y.is_negative() || m.is_negative() => None,
            TerOp::PowMod => Some(x.modpow(y, m)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TerOp::AddMod => "addmod",
            TerOp::MulMod => "mulmod",
            TerOp::PowMod => "powmod",
        }
    }
}

impl IntExpr {
    pub fn lit(value: impl Into<BigInt>) -> Self {
        IntExpr::Lit(value.into())
    }

    pub fn zero() -> Self {
        IntExpr::Lit(BigInt::zero())
    }

    pub fn one() -> Self {
        IntExpr::Lit(BigInt::one())
    }

    /// Free variable, left for the solver to assign.
    pub fn var(name: impl Into<String>) -> Self {
        IntExpr::Var(name.into())
    }

    /// Returns the literal value if the formula has already folded to one.
    pub fn as_lit(&self) -> Option<&BigInt> {
        match self {
            IntExpr::Lit(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_lit(&self) -> bool {
        matches!(self, IntExpr::Lit(_))
    }

    fn is_lit_u64(&self, n: u64) -> bool {
        self.as_lit().is_some_and(|v| v.to_u64() == Some(n))
    }

    /// Builds `lhs OP rhs`, folding literals and trivial identities.
    pub fn binary(op: BinOp, lhs: IntExpr, rhs: IntExpr) -> Self {
        if let (Some(x), Some(y)) = (lhs.as_lit(), rhs.as_lit()) {
            if let Some(value) = op.eval(x, y) {
                return IntExpr::Lit(value);
            }
        }
        if let Some(simplified) = op.simplify(&lhs, &rhs) {
            return simplified;
        }
        IntExpr::Binary(op, Arc::new(lhs), Arc::new(rhs))
    }

    /// Builds the fused `(x OP y) mod m`.
    pub fn ternary(op: TerOp, x: IntExpr, y: IntExpr, m: IntExpr) -> Self {
        if let (Some(a), Some(b), Some(c)) = (x.as_lit(), y.as_lit(), m.as_lit()) {
            if let Some(value) = op.eval(a, b, c) {
                return IntExpr::Lit(value);
            }
        }
        if m.is_lit_u64(0) || m.is_lit_u64(1) {
            return IntExpr::zero();
        }
        IntExpr::Ternary(op, Arc::new(x), Arc::new(y), Arc::new(m))
    }

    /// `if cond then then_ else otherwise`.
    pub fn ite(cond: BoolExpr, then_: IntExpr, otherwise: IntExpr) -> Self {
        if let Some(c) = cond.as_lit() {
            return if c { then_ } else { otherwise };
        }
        if then_ == otherwise {
            return then_;
        }
        IntExpr::Ite(Arc::new(cond), Arc::new(then_), Arc::new(otherwise))
    }

    /// Floored modulus; non-negative whenever `m` is positive.
    pub fn modulo(&self, m: &IntExpr) -> Self {
        IntExpr::binary(BinOp::Mod, self.clone(), m.clone())
    }

    pub fn test_bit(&self, bit: &IntExpr) -> Self {
        IntExpr::binary(BinOp::TestBit, self.clone(), bit.clone())
    }

    pub fn popcount(&self) -> Self {
        match self.as_lit() {
            Some(v) if !v.is_negative() => IntExpr::lit(v.magnitude().count_ones()),
            _ => IntExpr::Popcount(Arc::new(self.clone())),
        }
    }

    pub fn lt(&self, other: &IntExpr) -> BoolExpr {
        BoolExpr::lt(self.clone(), other.clone())
    }

    pub fn le(&self, other: &IntExpr) -> BoolExpr {
        BoolExpr::le(self.clone(), other.clone())
    }

    pub fn gt(&self, other: &IntExpr) -> BoolExpr {
        BoolExpr::lt(other.clone(), self.clone())
    }

    pub fn ge(&self, other: &IntExpr) -> BoolExpr {
        BoolExpr::le(other.clone(), self.clone())
    }

    pub fn equals(&self, other: &IntExpr) -> BoolExpr {
        BoolExpr::cmp_eq(self.clone(), other.clone())
    }

    /// Value of the formula once every variable takes its value from `model`.
    ///
    /// `None` if a variable is unassigned or an operator leaves its domain.
    pub fn eval(&self, model: &HashMap<String, BigInt>) -> Option<BigInt> {
        walk::eval_int(self, model)
    }

    /// Number of nodes in the formula tree, counting shared children once per use.
    pub fn size(&self) -> usize {
        walk::size(Node::Int(self))
    }
}

impl Default for IntExpr {
    fn default() -> Self {
        IntExpr::zero()
    }
}

impl From<u64> for IntExpr {
    fn from(value: u64) -> Self {
        IntExpr::lit(value)
    }
}

impl From<u8> for IntExpr {
    fn from(value: u8) -> Self {
        IntExpr::lit(value)
    }
}

impl From<BigInt> for IntExpr {
    fn from(value: BigInt) -> Self {
        IntExpr::Lit(value)
    }
}

impl From<&BigUint> for IntExpr {
    fn from(value: &BigUint) -> Self {
        IntExpr::Lit(BigInt::from(value.clone()))
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl std::ops::$trait<&IntExpr> for &IntExpr {
            type Output = IntExpr;

            fn $method(self, rhs: &IntExpr) -> IntExpr {
                IntExpr::binary($op, self.clone(), rhs.clone())
            }
        }

        impl std::ops::$trait for IntExpr {
            type Output = IntExpr;

            fn $method(self, rhs: IntExpr) -> IntExpr {
                IntExpr::binary($op, self, rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add, BinOp::Add);
impl_binary_operator!(Sub, sub, BinOp::Sub);
impl_binary_operator!(Mul, mul, BinOp::Mul);
impl_binary_operator!(Div, div, BinOp::Div);
impl_binary_operator!(Rem, rem, BinOp::Rem);
impl_binary_operator!(BitAnd, bitand, BinOp::And);
impl_binary_operator!(BitOr, bitor, BinOp::Or);
impl_binary_operator!(BitXor, bitxor, BinOp::Xor);
impl_binary_operator!(Shl, shl, BinOp::Shl);
impl_binary_operator!(Shr, shr, BinOp::Shr);

impl fmt::Display for IntExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntExpr::Lit(v) if v.bits() > 64 => write!(f, "0x{:x}", v),
            IntExpr::Lit(v) => write!(f, "{}", v),
            IntExpr::Var(name) => write!(f, "{}", name),
            IntExpr::Popcount(x) => write!(f, "popcount({})", x),
            IntExpr::Binary(op, a, b) => write!(f, "({} {} {})", a, op.symbol(), b),
            IntExpr::Ternary(op, a, b, c) => write!(f, "{}({}, {}, {})", op.name(), a, b, c),
            IntExpr::Ite(c, a, b) => write!(f, "ite({}, {}, {})", c, a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_fold() {
        let sum = IntExpr::lit(40u64) + IntExpr::lit(2u64);
        assert_eq!(sum, IntExpr::lit(42u64));

        let shifted = IntExpr::lit(1u64) << IntExpr::lit(256u64);
        assert_eq!(shifted.as_lit().unwrap().bits(), 257);
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        let x = IntExpr::lit(7u64);
        assert_eq!(&x / &IntExpr::zero(), IntExpr::zero());
        assert_eq!(&x % &IntExpr::zero(), IntExpr::zero());
        assert_eq!(x.modulo(&IntExpr::zero()), IntExpr::zero());

        // Symbolic dividend still collapses
        let v = IntExpr::var("v");
        assert_eq!(&v / &IntExpr::zero(), IntExpr::zero());
    }

    #[test]
    fn test_truncating_versus_floored() {
        let neg = IntExpr::lit(-7);
        let two = IntExpr::lit(2u64);
        assert_eq!(&neg / &two, IntExpr::lit(-3));
        assert_eq!(&neg % &two, IntExpr::lit(-1));
        assert_eq!(neg.modulo(&two), IntExpr::lit(1u64));
    }

    #[test]
    fn test_identities_keep_formula_small() {
        let v = IntExpr::var("v");
        assert_eq!(&v + &IntExpr::zero(), v);
        assert_eq!(&v * &IntExpr::one(), v);
        assert_eq!(&v & &IntExpr::zero(), IntExpr::zero());
        assert_eq!(&v >> &IntExpr::zero(), v);

        let m = IntExpr::lit(256u64);
        let once = v.modulo(&m);
        assert_eq!(once.modulo(&m), once);
    }

    #[test]
    fn test_ite_collapses() {
        let v = IntExpr::var("v");
        let w = IntExpr::var("w");
        assert_eq!(IntExpr::ite(BoolExpr::lit(true), v.clone(), w.clone()), v);
        assert_eq!(IntExpr::ite(v.lt(&w), w.clone(), w.clone()), w);
        assert!(matches!(IntExpr::ite(v.lt(&w), v, w), IntExpr::Ite(..)));
    }

    #[test]
    fn test_fused_modular_ops() {
        let x = IntExpr::lit(10u64);
        let y = IntExpr::lit(7u64);
        let m = IntExpr::lit(6u64);
        assert_eq!(
            IntExpr::ternary(TerOp::AddMod, x.clone(), y.clone(), m.clone()),
            IntExpr::lit(5u64)
        );
        assert_eq!(
            IntExpr::ternary(TerOp::MulMod, x.clone(), y.clone(), m.clone()),
            IntExpr::lit(4u64)
        );
        assert_eq!(
            IntExpr::ternary(TerOp::PowMod, x, y, IntExpr::zero()),
            IntExpr::zero()
        );
    }

    #[test]
    fn test_bit_queries() {
        let x = IntExpr::lit(0b1011u64);
        assert_eq!(x.popcount(), IntExpr::lit(3u64));
        assert_eq!(x.test_bit(&IntExpr::lit(1u64)), IntExpr::one());
        assert_eq!(x.test_bit(&IntExpr::lit(2u64)), IntExpr::zero());
        assert_eq!(x.test_bit(&IntExpr::lit(1_000_000u64)), IntExpr::zero());
    }

    #[test]
    fn test_eval_under_model() {
        let e = &(&IntExpr::var("a") * &IntExpr::lit(3u64)) - &IntExpr::var("b");
        let mut model = HashMap::new();
        model.insert("a".to_string(), BigInt::from(5));
        assert_eq!(e.eval(&model), None);
        model.insert("b".to_string(), BigInt::from(1));
        assert_eq!(e.eval(&model), Some(BigInt::from(14)));
    }

    #[test]
    fn test_display() {
        let e = &IntExpr::var("a") + &IntExpr::lit(1u64);
        assert_eq!(e.to_string(), "(a + 1)");
        assert_eq!(e.size(), 3);
    }
}

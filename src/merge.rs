//! Joining two values under a path condition.
//!
//! `merge(cond, a, b)` is the value that is `a` when `cond` holds and `b` otherwise. The
//! execution engine uses it to join diverging branches; nothing here knows about paths.

use crate::expr::{BoolExpr, IntExpr};
use crate::memory::buffer::Buffer;
use crate::word::address::SymAddr;
use crate::word::scalar::SymWord;

pub trait Merge: Sized {
    fn merge(cond: &BoolExpr, then_: &Self, otherwise: &Self) -> Self;
}

impl Merge for IntExpr {
    fn merge(cond: &BoolExpr, then_: &Self, otherwise: &Self) -> Self {
        IntExpr::ite(cond.clone(), then_.clone(), otherwise.clone())
    }
}

impl Merge for BoolExpr {
    fn merge(cond: &BoolExpr, then_: &Self, otherwise: &Self) -> Self {
        if then_ == otherwise {
            return then_.clone();
        }
        cond.and(then_).or(&(!cond).and(otherwise))
    }
}

/// Equal formulas merge to themselves and keep the first branch's provenance.
impl Merge for SymWord {
    fn merge(cond: &BoolExpr, then_: &Self, otherwise: &Self) -> Self {
        if then_.expr() == otherwise.expr() {
            return then_.clone();
        }
        SymWord::from_expr(IntExpr::merge(cond, then_.expr(), otherwise.expr()))
    }
}

impl Merge for SymAddr {
    fn merge(cond: &BoolExpr, then_: &Self, otherwise: &Self) -> Self {
        if then_.expr() == otherwise.expr() {
            return then_.clone();
        }
        SymAddr::from_expr(IntExpr::merge(cond, then_.expr(), otherwise.expr()))
    }
}

/// Element-wise; the shorter side is padded with `T::default()`.
impl<T: Merge + Default + Clone> Merge for Vec<T> {
    fn merge(cond: &BoolExpr, then_: &Self, otherwise: &Self) -> Self {
        let len = then_.len().max(otherwise.len());
        (0..len)
            .map(|i| {
                let a = then_.get(i).cloned().unwrap_or_default();
                let b = otherwise.get(i).cloned().unwrap_or_default();
                T::merge(cond, &a, &b)
            })
            .collect()
    }
}

/// Buffers merge byte-wise. Memory is zero past its end, so padding with zero is exact.
impl Merge for Buffer {
    fn merge(cond: &BoolExpr, then_: &Self, otherwise: &Self) -> Self {
        if let (Buffer::Concrete(a), Buffer::Concrete(b)) = (then_, otherwise) {
            if a == b {
                return then_.clone();
            }
        }
        Buffer::Symbolic(Vec::<IntExpr>::merge(cond, &then_.lift(), &otherwise.lift()))
    }
}

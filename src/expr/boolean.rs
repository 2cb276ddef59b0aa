//! Boolean formulas over integer formulas.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::expr::int::IntExpr;
use crate::expr::walk::{self, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Lt,
    Le,
}

impl CmpOp {
    pub fn holds(self, x: &BigInt, y: &BigInt) -> bool {
        match self {
            CmpOp::Eq => x == y,
            CmpOp::Lt => x < y,
            CmpOp::Le => x <= y,
        }
    }
}

/// Boolean formula, the kind a path condition or equality query is made of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolExpr {
    Lit(bool),
    Cmp(CmpOp, Arc<IntExpr>, Arc<IntExpr>),
    Not(Arc<BoolExpr>),
    And(Arc<BoolExpr>, Arc<BoolExpr>),
    Or(Arc<BoolExpr>, Arc<BoolExpr>),
}

impl BoolExpr {
    pub fn lit(value: bool) -> Self {
        BoolExpr::Lit(value)
    }

    /// Propositional variable, encoded as an integer variable that is nonzero.
    pub fn var(name: impl Into<String>) -> Self {
        !BoolExpr::cmp_eq(IntExpr::var(name), IntExpr::zero())
    }

    pub fn as_lit(&self) -> Option<bool> {
        match self {
            BoolExpr::Lit(b) => Some(*b),
            _ => None,
        }
    }

    fn compare(op: CmpOp, lhs: IntExpr, rhs: IntExpr) -> Self {
        if let (Some(x), Some(y)) = (lhs.as_lit(), rhs.as_lit()) {
            return BoolExpr::Lit(op.holds(x, y));
        }
        if lhs == rhs {
            return BoolExpr::Lit(op != CmpOp::Lt);
        }
        BoolExpr::Cmp(op, Arc::new(lhs), Arc::new(rhs))
    }

    pub fn cmp_eq(lhs: IntExpr, rhs: IntExpr) -> Self {
        Self::compare(CmpOp::Eq, lhs, rhs)
    }

    pub fn lt(lhs: IntExpr, rhs: IntExpr) -> Self {
        Self::compare(CmpOp::Lt, lhs, rhs)
    }

    pub fn le(lhs: IntExpr, rhs: IntExpr) -> Self {
        Self::compare(CmpOp::Le, lhs, rhs)
    }

    pub fn and(&self, other: &BoolExpr) -> Self {
        match (self.as_lit(), other.as_lit()) {
            (Some(false), _) | (_, Some(false)) => BoolExpr::Lit(false),
            (Some(true), _) => other.clone(),
            (_, Some(true)) => self.clone(),
            _ if self == other => self.clone(),
            _ => BoolExpr::And(Arc::new(self.clone()), Arc::new(other.clone())),
        }
    }

    pub fn or(&self, other: &BoolExpr) -> Self {
        match (self.as_lit(), other.as_lit()) {
            (Some(true), _) | (_, Some(true)) => BoolExpr::Lit(true),
            (Some(false), _) => other.clone(),
            (_, Some(false)) => self.clone(),
            _ if self == other => self.clone(),
            _ => BoolExpr::Or(Arc::new(self.clone()), Arc::new(other.clone())),
        }
    }

    /// Truth value once every variable takes its value from `model`.
    pub fn eval(&self, model: &HashMap<String, BigInt>) -> Option<bool> {
        walk::eval_bool(self, model)
    }

    pub fn size(&self) -> usize {
        walk::size(Node::Bool(self))
    }
}

impl std::ops::Not for BoolExpr {
    type Output = BoolExpr;

    fn not(self) -> BoolExpr {
        match &self {
            BoolExpr::Lit(b) => return BoolExpr::Lit(!b),
            BoolExpr::Not(inner) => return BoolExpr::clone(inner),
            _ => {}
        }
        BoolExpr::Not(Arc::new(self))
    }
}

impl std::ops::Not for &BoolExpr {
    type Output = BoolExpr;

    fn not(self) -> BoolExpr {
        !self.clone()
    }
}

impl fmt::Display for BoolExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolExpr::Lit(b) => write!(f, "{}", b),
            BoolExpr::Cmp(op, a, b) => {
                let symbol = match op {
                    CmpOp::Eq => "==",
                    CmpOp::Lt => "<",
                    CmpOp::Le => "<=",
                };
                write!(f, "({} {} {})", a, symbol, b)
            }
            BoolExpr::Not(x) => write!(f, "!{}", x),
            BoolExpr::And(a, b) => write!(f, "({} && {})", a, b),
            BoolExpr::Or(a, b) => write!(f, "({} || {})", a, b),
        }
    }
}

//! Solver-facing formulas.
//!
//! Integer formulas range over unbounded integers; boolean formulas compare them.
//! Every constructor folds literal operands eagerly, so a formula built only from
//! literals is always a literal. Anything bigger is left for the constraint layer.

pub mod boolean;
pub mod int;
mod walk;

pub use boolean::{BoolExpr, CmpOp};
pub use int::{BinOp, IntExpr, TerOp};

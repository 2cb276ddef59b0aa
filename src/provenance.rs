//! Provenance tags for symbolic words.
//!
//! A tag records how a word was derived so it can be printed in a form a person can
//! follow. Tags never take part in equality or ordering of values; operators strip them.
//! The one consumer besides printing is the right-shift fast path, which looks for
//! [`Provenance::FromBytes`] to shift whole bytes instead of building a shift formula.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::expr::IntExpr;

/// How a word came to be.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Provenance {
    #[default]
    None,
    /// Named unknown.
    Var(String),
    /// `left symbol right`, e.g. `(a + b)`.
    Infix {
        symbol: String,
        left: String,
        right: String,
    },
    /// `symbol(left, right)`, e.g. `max(a, b)`.
    Prefix {
        symbol: String,
        left: String,
        right: String,
    },
    Unary { symbol: String, operand: String },
    /// Reassembled big-endian from exactly these memory bytes.
    FromBytes(Vec<IntExpr>),
}

impl Provenance {
    pub fn var(name: impl Into<String>) -> Self {
        Provenance::Var(name.into())
    }

    pub fn infix(symbol: &str, left: &impl fmt::Display, right: &impl fmt::Display) -> Self {
        Provenance::Infix {
            symbol: symbol.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn prefix(symbol: &str, left: &impl fmt::Display, right: &impl fmt::Display) -> Self {
        Provenance::Prefix {
            symbol: symbol.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn unary(symbol: &str, operand: &impl fmt::Display) -> Self {
        Provenance::Unary {
            symbol: symbol.to_string(),
            operand: operand.to_string(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Provenance::None)
    }

    /// The byte window a word was read from, if it was read from memory.
    pub fn source_bytes(&self) -> Option<&[IntExpr]> {
        match self {
            Provenance::FromBytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::None => Ok(()),
            Provenance::Var(name) => write!(f, "{}", name),
            Provenance::Infix {
                symbol,
                left,
                right,
            } => write!(f, "({} {} {})", left, symbol, right),
            Provenance::Prefix {
                symbol,
                left,
                right,
            } => write!(f, "{}({}, {})", symbol, left, right),
            Provenance::Unary { symbol, operand } => write!(f, "{}({})", symbol, operand),
            Provenance::FromBytes(bytes) => write!(f, "bytes[{}]", bytes.len()),
        }
    }
}

//! 160-bit symbolic address.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::expr::IntExpr;
use crate::provenance::Provenance;
use crate::word::scalar::SymWord;
use crate::{ADDR_BITS, addr_modulus};

/// Address-width counterpart of [`SymWord`]. Literal addresses live in `[0, 2^160)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymAddr {
    provenance: Provenance,
    expr: IntExpr,
}

impl SymAddr {
    pub fn lit(value: BigUint) -> Self {
        Self::from_expr(IntExpr::from(&value).modulo(&IntExpr::Lit(addr_modulus().clone())))
    }

    pub fn var(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            provenance: Provenance::Var(name.clone()),
            expr: IntExpr::Var(name),
        }
    }

    /// Keeps the low 160 bits of a word.
    pub fn from_word(word: &SymWord) -> Self {
        Self::from_expr(word.expr().modulo(&IntExpr::Lit(addr_modulus().clone())))
    }

    pub(crate) fn from_expr(expr: IntExpr) -> Self {
        Self {
            provenance: Provenance::None,
            expr,
        }
    }

    /// Zero-extends back to a full word.
    pub fn to_word(&self) -> SymWord {
        SymWord::from_expr(self.expr.clone())
    }

    pub fn expr(&self) -> &IntExpr {
        &self.expr
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }
}

impl fmt::Display for SymAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self.expr.as_lit() {
            Some(v) => format!("0x{:0width$x}", v, width = ADDR_BITS / 4),
            None => "<symbolic>".to_string(),
        };
        if self.provenance.is_none() {
            write!(f, "{}", value)
        } else {
            write!(f, "{} ({})", self.provenance, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn test_truncates_word() {
        let word = SymWord::lit((BigUint::one() << 200) + BigUint::from(0xabcu32));
        let addr = SymAddr::from_word(&word);
        assert_eq!(addr.expr(), &IntExpr::lit(0xabcu64));
        assert_eq!(addr.to_string(), format!("0x{:040x}", 0xabc));
    }

    #[test]
    fn test_symbolic_address_round_trip() {
        let addr = SymAddr::var("caller");
        assert!(!addr.expr().is_lit());
        assert_eq!(addr.to_string(), "caller (<symbolic>)");
        assert!(!addr.to_word().expr().is_lit());
    }
}

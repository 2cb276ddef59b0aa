//! Error types for resolving symbolic values

use thiserror::Error;

/// Result type alias for operations that may need a resolved value
pub type SymResult<T> = std::result::Result<T, SymError>;

/// Errors raised when a caller asks for a concrete answer the value cannot give
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymError {
    /// Value was forced to a literal but still depends on unknowns
    #[error("cannot force unresolved {what} to a concrete value")]
    Unresolved { what: &'static str },

    /// Host-level equality asked of a formula; use `sym_eq` instead
    #[error("structural equality on unresolved words is a solver question")]
    UnresolvedEquality,

    /// Write window lies outside addressable memory
    #[error("memory offset {offset} is not addressable")]
    OffsetOverflow { offset: String },
}

impl SymError {
    pub fn unresolved(what: &'static str) -> Self {
        SymError::Unresolved { what }
    }

    pub fn overflow(offset: impl ToString) -> Self {
        SymError::OffsetOverflow {
            offset: offset.to_string(),
        }
    }
}

//! Symbolic machine words.
//!
//! Provides the 256-bit scalar with the machine's full operator set and the 160-bit
//! address built on top of it.

pub mod address;
pub mod scalar;

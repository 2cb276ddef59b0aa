//! Machine memory.
//!
//! Provides the concrete byte-array primitives, the two-form buffer built on them, and
//! the bounded selector for reads whose offset or valid length is symbolic.

pub mod buffer;
pub mod concrete;
pub mod selector;

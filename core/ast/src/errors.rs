//! Error types for the AST crate.
//!
//! These are the fatal class of front-end failures: the arena could not hand
//! out memory or a literal could not be represented. Everything recoverable is
//! reported through [`crate::diagnostics::Diagnostics`] instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[must_use = "errors must not be silently ignored"]
pub enum AstError {
    /// The system allocator refused to provide a new arena block.
    #[error("arena exhausted while allocating {requested} bytes")]
    ArenaExhausted { requested: usize },

    /// `align` was zero or not a power of two, or the size overflowed.
    #[error("invalid allocation layout: size {size}, alignment {align}")]
    InvalidLayout { size: usize, align: usize },

    /// A numeric literal does not fit the target representation.
    #[error("{kind} literal `{text}` is out of range")]
    LiteralOutOfRange { kind: &'static str, text: String },
}

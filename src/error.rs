use thiserror::Error;

use crate::Symbol;

/// Errors raised by automaton constructions and queries.
/// An error always aborts the single operation in progress; no partially built automaton is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// Invalid bounds for a bounded repetition.
    #[error("invalid repetition bounds: minimum {min} exceeds maximum {max}")]
    Construction { min: u32, max: u32 },

    /// A total alphabet that does not contain every symbol used by an automaton.
    #[error("alphabet mismatch: symbols {} are not part of the given alphabet", display_symbols(.missing))]
    AlphabetMismatch { missing: Vec<Symbol> },

    /// An internal invariant was violated.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// The operation observed a cancellation request.
    #[error("operation cancelled")]
    Cancelled,

    /// The reference regex parser rejected its input.
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },
}

fn display_symbols(symbols: &[Symbol]) -> String {
    use itertools::Itertools;
    format!("{{{}}}", symbols.iter().join(", "))
}

pub type Result<T> = std::result::Result<T, AutomatonError>;

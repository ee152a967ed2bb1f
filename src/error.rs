//! Error types shared by every code in the crate.

use thiserror::Error;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the codecs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A codeword or data element was something other than 0 or 1
    #[error("invalid bit value {value} at position {position}, expected 0 or 1")]
    InvalidBit { position: usize, value: u8 },

    /// A data word had the wrong number of bits
    #[error("expected {expected} bits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A nonzero syndrome that no single-bit error produces
    #[error("syndrome {syndrome:#04x} does not correspond to any single-bit error")]
    UnmappedSyndrome { syndrome: u8 },

    /// A buffer or argument the codec cannot interpret
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A parity-check matrix supplied at runtime was rejected
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    /// Decoded link control failed its Reed-Solomon check
    #[error("link control check failed, syndromes {syndromes:02x?}")]
    LinkControlCheck { syndromes: [u8; 3] },
}

/// Defects in a parity-check matrix definition.
///
/// Kept `Copy` so that matrix validation can run inside `const fn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// Parity equation count outside `1..=5`
    #[error("a code needs between 1 and 5 parity equations, got {0}")]
    ParityCount(usize),

    /// Codeword length not in `parity + 1..=32`
    #[error("codeword length {length} must exceed the parity count {parity} and be at most 32")]
    CodeLength { length: usize, parity: usize },

    /// An equation mask has bits at or beyond the codeword length
    #[error("equation {equation} references a position beyond the codeword")]
    PositionOutOfRange { equation: usize },

    /// Every equation must cover its own parity bit and no other
    #[error("equation {equation} does not check exactly its own parity bit")]
    NotSystematic { equation: usize },

    /// A column of zeros: errors at this position are invisible
    #[error("position {position} is not covered by any equation")]
    ZeroColumn { position: usize },

    /// Two columns are equal, so their errors cannot be told apart
    #[error("positions {first} and {second} share syndrome {syndrome:#04x}")]
    DuplicateColumn {
        first: usize,
        second: usize,
        syndrome: u8,
    },
}

impl Error {
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

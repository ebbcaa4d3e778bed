//! Error types for rhythm tokenization
//!
//! `TokenizerError` covers configuration, authoring and encoding failures.
//! `DecodeError` covers malformed token streams handed back by the model side.

use thiserror::Error;

use crate::models::Beat;

/// Errors raised while configuring, authoring or encoding a composition
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenizerError {
    /// Non-positive cycle length, snap or subdivision ceiling
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A hit lies outside `[0, n_beats)`; indicates a quantizer bug, not a user error
    #[error("Beat {beat} is outside the cycle [0, {n_beats})")]
    InvalidBeat { beat: Beat, n_beats: u32 },

    /// Asked to encode a composition with no cycles
    #[error("Composition is empty")]
    EmptyComposition,

    /// Tried to commit a cycle with no markers
    #[error("Cycle has no markers")]
    EmptyCycle,

    #[error("Cycle index {index} out of range (composition has {len} cycles)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Pointer input {0} is not a usable number")]
    NonFiniteInput(f64),

    #[error("Unknown sound: '{0}'")]
    UnknownSound(String),

    /// Grid policy could not place every hit within the subdivision ceiling
    #[error("Cycle {cycle}, beat {beat_index}: hits do not fit a power-of-two grid of at most {max} positions")]
    Unrepresentable {
        cycle: usize,
        beat_index: u32,
        max: u32,
    },

    /// Legacy policy: hits so close together that `1 / gap` exceeds what the model reads
    #[error("Cycle {cycle}, beat {beat_index}: hits {required} positions apart per beat, the model accepts at most {max}")]
    SubdivisionTooFine {
        cycle: usize,
        beat_index: u32,
        required: i64,
        max: u32,
    },

    /// Beat arithmetic does not fit in 64-bit fractions
    #[error("Beat {beat} is too fine to compute with exactly")]
    PrecisionOverflow { beat: Beat },
}

/// Errors raised while parsing a token stream back into a composition
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("Unknown token '{token}' at index {index}")]
    UnknownToken { index: usize, token: String },

    #[error("Expected {expected} at index {index}, found '{found}'")]
    UnexpectedToken {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Token stream ended while expecting {expected}")]
    UnexpectedEnd { expected: String },

    #[error("Cycle {cycle} has {found} beats, expected {expected}")]
    BeatCountMismatch {
        cycle: usize,
        expected: u32,
        found: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

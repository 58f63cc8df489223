//! Error types for the puzzle engine.
//!
//! Pours never fail: an illegal pour moves zero units. Errors are reserved for
//! malformed input (bottle construction, level documents, config files) and
//! for replays that hit an illegal move.

use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// A level-language or board-code parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number (0 when parsing a bare board code).
    pub line: usize,
    /// Human-readable description.
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Top-level error type for the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A bottle must hold at least one slot.
    #[error("Bottle capacity must be at least 1")]
    ZeroCapacity,

    /// More units than slots.
    #[error("Bottle holds {count} units but capacity is {capacity}")]
    Overfilled {
        /// Declared capacity.
        capacity: usize,
        /// Units supplied.
        count: usize,
    },

    /// Bottle index outside the board.
    #[error("Bottle index {index} out of range (board has {len} bottles)")]
    BottleIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of bottles on the board.
        len: usize,
    },

    /// Malformed level-language input.
    #[error("Failed to parse level: {0}")]
    Parse(#[from] ParseError),

    /// A recorded move could not be replayed.
    #[error("Illegal move #{ordinal}: bottle {from} cannot pour into bottle {to}")]
    IllegalMove {
        /// 0-based position in the step list.
        ordinal: usize,
        /// Source bottle index.
        from: usize,
        /// Target bottle index.
        to: usize,
    },

    /// Config file failed to parse.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ron::error::SpannedError),
}

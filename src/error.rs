//! Error types for the ttt-mdp crate

use thiserror::Error;

/// Main error type for the ttt-mdp crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid move: position {position} is not playable")]
    InvalidMove { position: usize },

    #[error("game already over")]
    GameOver,

    #[error("action at position {position} is illegal in state '{state}'")]
    IllegalAction { state: String, position: usize },

    #[error("transition model produced no outcomes for legal action {position} in state '{state}'")]
    MissingTransition { state: String, position: usize },

    #[error("no action defined in policy for state '{state}'")]
    NoActionDefined { state: String },

    #[error("state '{state}' is missing from the value table")]
    UnknownState { state: String },

    #[error("non-terminal state '{state}' has no available actions")]
    NoActionsAvailable { state: String },

    #[error("board string too short: expected {expected} cells, got {got} in '{context}'")]
    InvalidBoardLength {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("invalid piece counts: X={x_count}, O={o_count} (must be equal or X ahead by 1)")]
    InvalidPieceCounts { x_count: usize, o_count: usize },

    #[error("invalid label format '{label}' (expected format: '{expected}')")]
    InvalidLabelFormat { label: String, expected: String },

    #[error("missing {part} in label '{label}'")]
    MissingLabelPart { part: String, label: String },

    #[error("invalid player '{player}' in label '{label}' (expected 'X' or 'O')")]
    InvalidPlayerString { player: String, label: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

//! Error types of each layer.

use std::time::Duration;

use thiserror::Error;

use crate::model::GameOver;

/// Malformed position or move strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("invalid position string {0:?}")]
    PositionFormat(String),

    #[error("both sides of the position use the same color marker")]
    SameSideMarkers,

    #[error("square {0} is listed more than once")]
    DuplicateSquare(u8),

    #[error("invalid move string {0:?}")]
    MoveFormat(String),

    #[error("square {0} is not on the board")]
    SquareOutOfRange(u32),

    #[error("squares {from} and {to} are neither a step nor a jump apart")]
    BadStepDistance { from: u8, to: u8 },

    #[error("a normal move names exactly two squares, got {0}")]
    NormalMoveLength(usize),
}

/// Failures of the rules core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Notation(#[from] NotationError),

    /// Well formed, but not among the legal moves of the position.
    #[error("illegal move {0}")]
    IllegalMove(String),

    #[error("the game is already over: {0}")]
    GameOver(GameOver),

    /// The board disagreed with a move while it was being applied.
    #[error("corrupt board at square {square}: {reason}")]
    Invariant { square: u8, reason: &'static str },
}

/// Failures talking to an engine process.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not start engine {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("engine i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine did not become ready within {0:?}")]
    StartTimeout(Duration),

    #[error("engine did not answer within {0:?}")]
    Timeout(Duration),

    #[error("engine closed its output")]
    Closed,

    #[error("expected {expected} from engine, got {got:?}")]
    Unexpected { expected: &'static str, got: String },
}

/// Failures of an engine-versus-engine match.
#[derive(Debug, Error)]
pub enum ComparatorError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("invalid start position {position:?}: {source}")]
    Position {
        position: String,
        #[source]
        source: GameError,
    },

    #[error("engine {engine} played badly: {source}")]
    IllegalMove {
        engine: String,
        #[source]
        source: GameError,
    },

    #[error("engines disagree: {0}")]
    Disagreement(String),

    #[error("the match file lists no positions")]
    NoPositions,

    #[error("match setting {name} must be a non-negative number of seconds, got {value}")]
    Setting { name: &'static str, value: f64 },

    #[error("invalid match file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("could not read or write {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("match cancelled")]
    Cancelled,
}

/// Failures reading or writing saved games.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("could not access saved game: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed saved game: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures playing through a list of openings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OpeningError {
    #[error("opening on line {line} does not have exactly three moves")]
    MoveCount { line: usize },

    #[error("opening on line {line}: {source}")]
    Game {
        line: usize,
        #[source]
        source: GameError,
    },
}

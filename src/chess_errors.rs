//! Errors used throughout the rules engine.
//!
//! `ChessErrors` is the single recoverable error type of the crate. Off-board
//! coordinates are not represented here: constructing one panics, since it can
//! only come from a caller bug.

use std::error::Error;
use std::fmt;

use crate::game_state::chess_types::{Coordinate, PieceKind};

pub type ChessResult<T> = Result<T, ChessErrors>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChessErrors {
    /// A FEN string (or one of its fields) could not be interpreted.
    InvalidFen(String),

    /// A square or move in algebraic notation could not be parsed.
    InvalidAlgebraic(String),

    /// No legal action of the piece on `start` ends on `end`.
    IllegalMove { start: Coordinate, end: Coordinate },

    /// Pawns promote to a knight, bishop, rook or queen only.
    InvalidPromotionTarget(PieceKind),

    /// The square that should hold the moving piece is empty.
    NoPieceAt(Coordinate),

    /// The side asked to move has no legal action (checkmate or stalemate).
    NoLegalMoves,

    /// An engine or UCI option was unknown or carried a bad value.
    InvalidOption { name: String, value: String },
}

impl fmt::Display for ChessErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChessErrors::InvalidFen(msg) => write!(f, "invalid FEN: {msg}"),
            ChessErrors::InvalidAlgebraic(msg) => write!(f, "invalid algebraic notation: {msg}"),
            ChessErrors::IllegalMove { start, end } => write!(f, "illegal move {start}{end}"),
            ChessErrors::InvalidPromotionTarget(kind) => {
                write!(f, "cannot promote to {kind:?}")
            }
            ChessErrors::NoPieceAt(at) => write!(f, "no piece on {at}"),
            ChessErrors::NoLegalMoves => write!(f, "no legal moves available"),
            ChessErrors::InvalidOption { name, value } => {
                write!(f, "invalid value '{value}' for option '{name}'")
            }
        }
    }
}

impl Error for ChessErrors {}

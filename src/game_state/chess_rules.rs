//! Canonical chess-rule constants.
//!
//! Static rule-related literals: the standard starting position, the
//! fifty-move threshold, repetition threshold and search score sentinels.

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Placement field of [`STARTING_POSITION_FEN`].
pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Half-moves without a pawn move or capture after which the game is drawn.
pub const FIFTY_MOVE_HALFMOVES: u16 = 100;

/// Occurrences of the same placement that draw the game.
pub const REPETITION_DRAW_COUNT: usize = 3;

/// Score of a position in which Black is checkmated.
pub const WHITE_WINS_SCORE: i32 = 1_000_000;

/// Score of a position in which White is checkmated.
pub const BLACK_WINS_SCORE: i32 = -WHITE_WINS_SCORE;

/// Search depth of the reference configuration, in plies.
pub const DEFAULT_SEARCH_DEPTH: u8 = 4;

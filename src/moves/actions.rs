//! Actions: the five shapes a move can take and how each one builds the
//! successor position.
//!
//! An `Action` is created by move generation, applied once and discarded.
//! `apply` never touches its input; it clones the placement into a new
//! `Position` and mutates only that copy.

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_types::{Coordinate, Piece, PieceKind};
use crate::game_state::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Move,
    Capture,
    EnPassant,
    Promotion(PieceKind),
    /// King travels `start -> end`, rook travels `rook_from -> rook_to`.
    Castle {
        rook_from: Coordinate,
        rook_to: Coordinate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    start: Coordinate,
    end: Coordinate,
    piece: Piece,
    kind: ActionKind,
}

impl Action {
    pub fn new_move(start: Coordinate, end: Coordinate, piece: Piece) -> Self {
        Self::with_kind(start, end, piece, ActionKind::Move)
    }

    pub fn capture(start: Coordinate, end: Coordinate, piece: Piece) -> Self {
        Self::with_kind(start, end, piece, ActionKind::Capture)
    }

    pub fn en_passant(start: Coordinate, end: Coordinate, pawn: Piece) -> Self {
        Self::with_kind(start, end, pawn, ActionKind::EnPassant)
    }

    /// Rejects promotion to a pawn or a king.
    pub fn new_promotion(
        start: Coordinate,
        end: Coordinate,
        pawn: Piece,
        promote_to: PieceKind,
    ) -> ChessResult<Self> {
        if !promote_to.is_promotion_target() {
            return Err(ChessErrors::InvalidPromotionTarget(promote_to));
        }
        Ok(Self::with_kind(
            start,
            end,
            pawn,
            ActionKind::Promotion(promote_to),
        ))
    }

    pub fn castle(
        start: Coordinate,
        end: Coordinate,
        king: Piece,
        rook_from: Coordinate,
        rook_to: Coordinate,
    ) -> Self {
        Self::with_kind(start, end, king, ActionKind::Castle { rook_from, rook_to })
    }

    fn with_kind(start: Coordinate, end: Coordinate, piece: Piece, kind: ActionKind) -> Self {
        Self {
            start,
            end,
            piece,
            kind,
        }
    }

    #[inline]
    pub fn start(&self) -> Coordinate {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Coordinate {
        self.end
    }

    /// The moving piece as it was when the action was generated.
    #[inline]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    #[inline]
    pub fn promotion(&self) -> Option<PieceKind> {
        match self.kind {
            ActionKind::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    /// True for every action that removes an opposing piece, including
    /// en passant and capturing promotions.
    pub fn is_capture(&self) -> bool {
        match self.kind {
            ActionKind::Capture | ActionKind::EnPassant => true,
            ActionKind::Promotion(_) => self.start.file() != self.end.file(),
            _ => false,
        }
    }

    #[inline]
    pub fn is_kingside_castle(&self) -> bool {
        matches!(self.kind, ActionKind::Castle { rook_to, .. } if rook_to.file() == 5)
    }

    /// Builds the successor position, refreshing the kings' check flags.
    pub fn apply(&self, position: &Position) -> Position {
        let mut next = self.apply_unflagged(position);
        next.refresh_check_flags();
        next
    }

    /// Successor without the display-only check flags; the legality filter
    /// only needs placement.
    pub(crate) fn apply_unflagged(&self, position: &Position) -> Position {
        let clock = position.halfmove_clock();
        let moved = self.piece.with_moved();

        match self.kind {
            ActionKind::Move => {
                let is_pawn = self.piece.kind == PieceKind::Pawn;
                let mut next = position.successor(
                    if is_pawn { 0 } else { clock.saturating_add(1) },
                    self.start,
                    self.end,
                );
                next.move_piece_to(moved, self.start, self.end);
                if is_pawn && self.start.rank().abs_diff(self.end.rank()) == 2 {
                    next.unpassant_at(self.end);
                } else {
                    next.unpassant();
                }
                next
            }
            ActionKind::Capture => {
                let mut next = position.successor(0, self.start, self.end);
                next.move_piece_to(moved, self.start, self.end);
                next.unpassant();
                next
            }
            ActionKind::EnPassant => {
                let mut next = position.successor(0, self.start, self.end);
                next.move_piece_to(moved, self.start, self.end);
                next.remove_piece_at(Coordinate::new(self.end.file(), self.start.rank()));
                next.unpassant();
                next
            }
            ActionKind::Promotion(kind) => {
                let mut next = position.successor(0, self.start, self.end);
                next.remove_piece_at(self.start);
                next.place_piece_at(Piece::new(kind, self.piece.side).with_moved(), self.end);
                next.unpassant();
                next
            }
            ActionKind::Castle { rook_from, rook_to } => {
                let mut next = position.successor(clock.saturating_add(1), self.start, self.end);
                // In Chess960 the king and rook may land on each other's
                // start squares, so lift both before placing either.
                let rook = next.remove_piece_at(rook_from);
                next.remove_piece_at(self.start);
                next.place_piece_at(moved, self.end);
                if let Some(rook) = rook {
                    next.place_piece_at(rook.with_moved(), rook_to);
                }
                next.unpassant();
                next
            }
        }
    }

    /// Algebraic-style notation, with `+` or `#` judged on `after`, the
    /// position this action produced.
    pub fn notation(&self, after: &Position) -> String {
        let mut out = match self.kind {
            ActionKind::Castle { .. } => {
                if self.is_kingside_castle() {
                    "O-O".to_owned()
                } else {
                    "O-O-O".to_owned()
                }
            }
            ActionKind::Move => format!("{}{}", self.piece_prefix(), self.end),
            ActionKind::Capture | ActionKind::EnPassant => {
                format!("{}x{}", self.capture_prefix(), self.end)
            }
            ActionKind::Promotion(kind) => {
                let letter = kind.notation_letter().unwrap_or('Q');
                if self.start.file() == self.end.file() {
                    format!("{}={letter}", self.end)
                } else {
                    format!("{}x{}={letter}", self.capture_prefix(), self.end)
                }
            }
        };

        let defender = self.piece.side.opponent();
        if after.checkmated(defender) {
            out.push('#');
        } else if after.in_check(defender) {
            out.push('+');
        }
        out
    }

    fn piece_prefix(&self) -> String {
        self.piece
            .kind
            .notation_letter()
            .map(String::from)
            .unwrap_or_default()
    }

    /// Pawns capture with their file letter, other pieces with their letter.
    fn capture_prefix(&self) -> String {
        match self.piece.kind {
            PieceKind::Pawn => char::from(b'a' + self.start.file()).to_string(),
            _ => self.piece_prefix(),
        }
    }

    /// Coordinate notation as used by UCI (`e2e4`, `e7e8q`).
    pub fn to_long_algebraic(&self) -> String {
        let mut out = format!("{}{}", self.start, self.end);
        if let Some(kind) = self.promotion() {
            out.push(kind.fen_char());
        }
        out
    }
}

//! Castling, in the general form that covers both the standard game and
//! Chess960. Ordinary king steps come from the leaping rules.
//!
//! After castling the king stands on the g-file (kingside) or c-file
//! (queenside) and the rook right beside it, on the f-file or d-file,
//! whatever files they started on.

use crate::game_state::chess_types::{Coordinate, PieceKind, Side};
use crate::game_state::position::Position;
use crate::moves::actions::Action;

const KINGSIDE_KING_FILE: u8 = 6;
const KINGSIDE_ROOK_FILE: u8 = 5;
const QUEENSIDE_KING_FILE: u8 = 2;
const QUEENSIDE_ROOK_FILE: u8 = 3;

/// Square of `side`'s unmoved king on its back rank, if there is one.
fn home_king(position: &Position, side: Side) -> Option<Coordinate> {
    let at = position.king_square(side)?;
    let king = position.get(at)?;
    (!king.moved && at.rank() == side.back_rank()).then_some(at)
}

/// The rook `side` would castle with toward `kingside`: the outermost
/// unmoved rook on that side of an unmoved king. `None` once either piece
/// has moved, which is exactly when that castling right is gone.
pub fn castling_rook(position: &Position, side: Side, kingside: bool) -> Option<Coordinate> {
    let king = home_king(position, side)?;
    let rank = side.back_rank();
    let candidates: Vec<u8> = if kingside {
        (king.file() + 1..8).rev().collect()
    } else {
        (0..king.file()).collect()
    };
    candidates
        .into_iter()
        .map(|file| Coordinate::new(file, rank))
        .find(|at| {
            position
                .get(*at)
                .is_some_and(|piece| piece.is(PieceKind::Rook, side) && !piece.moved)
        })
}

fn file_span(files: &[u8]) -> std::ops::RangeInclusive<u8> {
    let low = files.iter().copied().min().unwrap_or(0);
    let high = files.iter().copied().max().unwrap_or(0);
    low..=high
}

fn castle_toward(position: &Position, king_at: Coordinate, kingside: bool) -> Option<Action> {
    let king = position.get(king_at)?;
    let side = king.side;
    let rank = side.back_rank();
    let rook_from = castling_rook(position, side, kingside)?;
    let (king_file, rook_file) = if kingside {
        (KINGSIDE_KING_FILE, KINGSIDE_ROOK_FILE)
    } else {
        (QUEENSIDE_KING_FILE, QUEENSIDE_ROOK_FILE)
    };
    let king_to = Coordinate::new(king_file, rank);
    let rook_to = Coordinate::new(rook_file, rank);

    let span = file_span(&[king_at.file(), king_to.file(), rook_from.file(), rook_to.file()]);
    let clear = span
        .map(|file| Coordinate::new(file, rank))
        .filter(|at| *at != king_at && *at != rook_from)
        .all(|at| !position.is_piece(at));
    if !clear {
        return None;
    }

    let safe = file_span(&[king_at.file(), king_to.file()])
        .map(|file| Coordinate::new(file, rank))
        .all(|at| !position.attacked(at, side));
    if !safe {
        return None;
    }

    Some(Action::castle(king_at, king_to, king, rook_from, rook_to))
}

/// Castles available to the king on `at`: kingside first, then queenside.
pub fn generate_castles(position: &Position, at: Coordinate) -> Vec<Action> {
    let Some(king) = position.get(at) else {
        return Vec::new();
    };
    if king.kind != PieceKind::King
        || home_king(position, king.side) != Some(at)
        || position.in_check(king.side)
    {
        return Vec::new();
    }
    [true, false]
        .into_iter()
        .filter_map(|kingside| castle_toward(position, at, kingside))
        .collect()
}

//! Leaping pieces: knights and kings try each fixed offset once.

use crate::game_state::chess_types::{Coordinate, PieceKind};
use crate::game_state::position::Position;
use crate::moves::actions::Action;

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

pub fn offsets_for(kind: PieceKind) -> &'static [(i8, i8)] {
    match kind {
        PieceKind::Knight => &KNIGHT_OFFSETS,
        PieceKind::King => &KING_OFFSETS,
        _ => &[],
    }
}

/// In-bounds empty destinations.
pub fn generate_leaping_moves(position: &Position, at: Coordinate) -> Vec<Action> {
    let Some(piece) = position.get(at) else {
        return Vec::new();
    };
    offsets_for(piece.kind)
        .iter()
        .filter_map(|&(d_file, d_rank)| at.offset(d_file, d_rank))
        .filter(|to| !position.is_piece(*to))
        .map(|to| Action::new_move(at, to, piece))
        .collect()
}

/// In-bounds destinations holding an opposing piece.
pub fn generate_leaping_captures(position: &Position, at: Coordinate) -> Vec<Action> {
    let Some(piece) = position.get(at) else {
        return Vec::new();
    };
    offsets_for(piece.kind)
        .iter()
        .filter_map(|&(d_file, d_rank)| at.offset(d_file, d_rank))
        .filter(|to| position.is_side(*to, piece.side.opponent()))
        .map(|to| Action::capture(at, to, piece))
        .collect()
}

pub fn leaping_attacks(position: &Position, target: Coordinate, from: Coordinate) -> bool {
    let Some(piece) = position.get(from) else {
        return false;
    };
    offsets_for(piece.kind)
        .iter()
        .any(|&(d_file, d_rank)| from.offset(d_file, d_rank) == Some(target))
}

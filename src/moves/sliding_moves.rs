//! Sliding pieces: rooks, bishops and queens walk rays outward from their
//! square until the board edge or the first occupied square.

use crate::game_state::chess_types::{Coordinate, PieceKind};
use crate::game_state::position::Position;
use crate::moves::actions::Action;

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

pub fn directions_for(kind: PieceKind) -> &'static [(i8, i8)] {
    match kind {
        PieceKind::Rook => &ROOK_DIRECTIONS,
        PieceKind::Bishop => &BISHOP_DIRECTIONS,
        PieceKind::Queen => &QUEEN_DIRECTIONS,
        _ => &[],
    }
}

/// Empty squares along every ray, stopping before the first piece.
pub fn generate_sliding_moves(position: &Position, at: Coordinate) -> Vec<Action> {
    let Some(piece) = position.get(at) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for &(d_file, d_rank) in directions_for(piece.kind) {
        let mut cursor = at.offset(d_file, d_rank);
        while let Some(to) = cursor {
            if position.is_piece(to) {
                break;
            }
            out.push(Action::new_move(at, to, piece));
            cursor = to.offset(d_file, d_rank);
        }
    }
    out
}

/// At most one capture per ray: the first occupied square, if it holds an
/// opposing piece.
pub fn generate_sliding_captures(position: &Position, at: Coordinate) -> Vec<Action> {
    let Some(piece) = position.get(at) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for &(d_file, d_rank) in directions_for(piece.kind) {
        if let Some(to) = first_occupied(position, at, d_file, d_rank) {
            if position.is_side(to, piece.side.opponent()) {
                out.push(Action::capture(at, to, piece));
            }
        }
    }
    out
}

/// True when `target` lies on one of the piece's rays with nothing between.
pub fn sliding_attacks(position: &Position, target: Coordinate, from: Coordinate) -> bool {
    let Some(piece) = position.get(from) else {
        return false;
    };
    if target == from {
        return false;
    }
    let d_file = (target.file() as i8 - from.file() as i8).signum();
    let d_rank = (target.rank() as i8 - from.rank() as i8).signum();
    let aligned = directions_for(piece.kind).contains(&(d_file, d_rank))
        && (target.file() == from.file()
            || target.rank() == from.rank()
            || target.file().abs_diff(from.file()) == target.rank().abs_diff(from.rank()));
    if !aligned {
        return false;
    }

    let mut cursor = from.offset(d_file, d_rank);
    while let Some(square) = cursor {
        if square == target {
            return true;
        }
        if position.is_piece(square) {
            return false;
        }
        cursor = square.offset(d_file, d_rank);
    }
    false
}

fn first_occupied(position: &Position, at: Coordinate, d_file: i8, d_rank: i8) -> Option<Coordinate> {
    let mut cursor = at.offset(d_file, d_rank);
    while let Some(square) = cursor {
        if position.is_piece(square) {
            return Some(square);
        }
        cursor = square.offset(d_file, d_rank);
    }
    None
}

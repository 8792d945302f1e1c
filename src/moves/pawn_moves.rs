//! Pawn rules: pushes, diagonal captures, en passant and promotion.
//!
//! Any step that would land on the far rank is produced only by
//! [`generate_pawn_promotions`], as four promotion actions per destination.

use crate::game_state::chess_types::{Coordinate, Piece, PieceKind, Side, PROMOTION_KINDS};
use crate::game_state::position::Position;
use crate::moves::actions::Action;

fn pawn_on(position: &Position, at: Coordinate) -> Option<Piece> {
    position.get(at).filter(|piece| piece.kind == PieceKind::Pawn)
}

/// Square one step ahead of a pawn of `side` on `at`.
#[inline]
fn ahead(at: Coordinate, side: Side) -> Option<Coordinate> {
    at.offset(0, side.forward())
}

fn promotes_from(at: Coordinate, side: Side) -> bool {
    ahead(at, side).is_some_and(|to| to.rank() == side.promotion_rank())
}

/// Diagonal targets holding an opposing piece other than the king.
fn capture_targets(position: &Position, at: Coordinate, pawn: Piece) -> Vec<Coordinate> {
    [-1, 1]
        .iter()
        .filter_map(|&d_file| at.offset(d_file, pawn.side.forward()))
        .filter(|to| {
            position
                .get(*to)
                .is_some_and(|target| target.side != pawn.side && target.kind != PieceKind::King)
        })
        .collect()
}

/// Single push, plus the double push from the starting rank when both
/// squares are empty.
pub fn generate_pawn_moves(position: &Position, at: Coordinate) -> Vec<Action> {
    let Some(pawn) = pawn_on(position, at) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    if promotes_from(at, pawn.side) {
        return out;
    }
    let Some(one) = ahead(at, pawn.side).filter(|to| !position.is_piece(*to)) else {
        return out;
    };
    out.push(Action::new_move(at, one, pawn));
    if at.rank() == pawn.side.pawn_start_rank() {
        if let Some(two) = ahead(one, pawn.side).filter(|to| !position.is_piece(*to)) {
            out.push(Action::new_move(at, two, pawn));
        }
    }
    out
}

pub fn generate_pawn_captures(position: &Position, at: Coordinate) -> Vec<Action> {
    let Some(pawn) = pawn_on(position, at) else {
        return Vec::new();
    };
    if promotes_from(at, pawn.side) {
        return Vec::new();
    }
    capture_targets(position, at, pawn)
        .into_iter()
        .map(|to| Action::capture(at, to, pawn))
        .collect()
}

/// Captures of an orthogonally adjacent pawn that just double-stepped.
pub fn generate_pawn_en_passants(position: &Position, at: Coordinate) -> Vec<Action> {
    let Some(pawn) = pawn_on(position, at) else {
        return Vec::new();
    };
    if at.rank() != pawn.side.en_passant_rank() {
        return Vec::new();
    }
    [-1, 1]
        .iter()
        .filter_map(|&d_file| {
            let beside = at.offset(d_file, 0)?;
            let passed = pawn_on(position, beside)?;
            if passed.side == pawn.side || !passed.en_passant {
                return None;
            }
            let to = beside.offset(0, pawn.side.forward())?;
            (!position.is_piece(to)).then(|| Action::en_passant(at, to, pawn))
        })
        .collect()
}

/// Four promotion actions for every reachable square on the far rank.
pub fn generate_pawn_promotions(position: &Position, at: Coordinate) -> Vec<Action> {
    let Some(pawn) = pawn_on(position, at) else {
        return Vec::new();
    };
    if !promotes_from(at, pawn.side) {
        return Vec::new();
    }
    let mut destinations = capture_targets(position, at, pawn);
    if let Some(push) = ahead(at, pawn.side).filter(|to| !position.is_piece(*to)) {
        destinations.push(push);
    }

    let mut out = Vec::with_capacity(destinations.len() * PROMOTION_KINDS.len());
    for to in destinations {
        for kind in PROMOTION_KINDS {
            if let Ok(action) = Action::new_promotion(at, to, pawn, kind) {
                out.push(action);
            }
        }
    }
    out
}

/// A pawn attacks the two squares diagonally ahead of it, occupied or not.
pub fn pawn_attacks(position: &Position, target: Coordinate, from: Coordinate) -> bool {
    let Some(pawn) = pawn_on(position, from) else {
        return false;
    };
    target.file().abs_diff(from.file()) == 1
        && target.rank() as i8 - from.rank() as i8 == pawn.side.forward()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::actions::ActionKind;
    use crate::utils::algebraic::algebraic_to_coordinate;
    use crate::utils::fen_parser::parse_position;

    fn sq(name: &str) -> Coordinate {
        algebraic_to_coordinate(name).expect("valid square")
    }

    #[test]
    fn double_push_needs_both_squares_empty() {
        let open = parse_position("4k3/8/8/8/8/8/4P3/4K3", "-", "-", "0").expect("valid");
        assert_eq!(generate_pawn_moves(&open, sq("e2")).len(), 2);

        let blocked = parse_position("4k3/8/8/8/4n3/8/4P3/4K3", "-", "-", "0").expect("valid");
        assert_eq!(generate_pawn_moves(&blocked, sq("e2")).len(), 1);

        let jammed = parse_position("4k3/8/8/8/8/4n3/4P3/4K3", "-", "-", "0").expect("valid");
        assert!(generate_pawn_moves(&jammed, sq("e2")).is_empty());
    }

    #[test]
    fn pawns_do_not_capture_kings_or_friends() {
        let position = parse_position("8/8/8/8/8/3k1N2/4P3/4K3", "-", "-", "0").expect("valid");
        assert!(generate_pawn_captures(&position, sq("e2")).is_empty());
        assert!(pawn_attacks(&position, sq("d3"), sq("e2")));
        assert!(!pawn_attacks(&position, sq("e3"), sq("e2")));
    }

    #[test]
    fn black_pawn_captures_downward() {
        let position = parse_position("4k3/8/8/3p4/2N1B3/8/8/4K3", "-", "-", "0").expect("valid");
        let mut ends: Vec<_> = generate_pawn_captures(&position, sq("d5"))
            .iter()
            .map(|a| a.end())
            .collect();
        ends.sort();
        assert_eq!(ends, vec![sq("c4"), sq("e4")]);
    }

    #[test]
    fn en_passant_only_against_a_just_double_stepped_pawn() {
        let fresh = parse_position("4k3/8/8/3pP3/8/8/8/4K3", "-", "d6", "0").expect("valid");
        let actions = generate_pawn_en_passants(&fresh, sq("e5"));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].end(), sq("d6"));

        let stale = parse_position("4k3/8/8/3pP3/8/8/8/4K3", "-", "-", "0").expect("valid");
        assert!(generate_pawn_en_passants(&stale, sq("e5")).is_empty());
    }

    #[test]
    fn en_passant_window_closes_after_one_move() {
        let en_passants = |position: &Position| {
            position
                .all_actions(Side::White)
                .iter()
                .filter(|a| a.kind() == ActionKind::EnPassant)
                .count()
        };

        let start = parse_position("4k3/3p4/8/4P3/8/8/8/4K3", "-", "-", "0").expect("valid");
        let after_d5 = start.make_move(sq("d7"), sq("d5")).expect("double step");
        assert_eq!(en_passants(&after_d5), 1);

        let delayed = after_d5
            .make_move(sq("e1"), sq("e2"))
            .and_then(|p| p.make_move(sq("e8"), sq("e7")))
            .expect("quiet king moves");
        assert_eq!(en_passants(&delayed), 0);
        assert!(delayed.is_piece(sq("d5")));
    }

    #[test]
    fn promotion_yields_four_actions_per_destination() {
        let position = parse_position("1r2k3/P7/8/8/8/8/8/4K3", "-", "-", "0").expect("valid");
        assert!(generate_pawn_moves(&position, sq("a7")).is_empty());
        assert!(generate_pawn_captures(&position, sq("a7")).is_empty());
        let promotions = generate_pawn_promotions(&position, sq("a7"));
        assert_eq!(promotions.len(), 8);
        assert_eq!(
            promotions.iter().filter(|a| a.end() == sq("b8")).count(),
            4
        );
    }
}

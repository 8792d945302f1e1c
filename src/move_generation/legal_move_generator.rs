//! Legal move generation.
//!
//! Pseudo-legal actions come from the per-kind rule table; each one is
//! applied to a scratch successor and dropped when it leaves the mover's
//! own king attacked.

use crate::game_state::chess_types::{Coordinate, Side};
use crate::game_state::position::Position;
use crate::move_generation::move_generator::{GeneratedMove, MoveAnnotations, MoveGenerator};
use crate::moves::actions::Action;
use crate::moves::piece_rules::rules_for;

/// Legal actions of the piece on `at`; empty for an empty square.
pub fn generate_actions(position: &Position, at: Coordinate) -> Vec<Action> {
    let Some(piece) = position.get(at) else {
        return Vec::new();
    };
    rules_for(piece.kind)
        .pseudo_legal(position, at)
        .into_iter()
        .filter(|action| !action.apply_unflagged(position).in_check(piece.side))
        .collect()
}

/// Legal actions of every piece of `side`, squares scanned from a1 to h8.
pub fn all_actions(position: &Position, side: Side) -> Vec<Action> {
    let squares: Vec<Coordinate> = position.pieces_of(side).map(|(at, _)| at).collect();
    let mut out = Vec::with_capacity(48);
    for at in squares {
        out.extend(generate_actions(position, at));
    }
    out
}

/// Generator that also annotates each move with check and mate flags.
pub struct LegalMoveGenerator;

/// Same moves as [`LegalMoveGenerator`] without the annotation pass.
pub struct FastLegalMoveGenerator;

impl MoveGenerator for LegalMoveGenerator {
    fn generate_legal_moves(&self, position: &Position, side: Side) -> Vec<GeneratedMove> {
        generate_legal_moves_internal(position, side, true)
    }
}

impl MoveGenerator for FastLegalMoveGenerator {
    fn generate_legal_moves(&self, position: &Position, side: Side) -> Vec<GeneratedMove> {
        generate_legal_moves_internal(position, side, false)
    }
}

fn generate_legal_moves_internal(position: &Position, side: Side, annotate: bool) -> Vec<GeneratedMove> {
    all_actions(position, side)
        .into_iter()
        .map(|action| {
            let position_after = action.apply(position);
            let annotations = if annotate {
                let gives_check = position_after.in_check(side.opponent());
                MoveAnnotations {
                    gives_check,
                    is_checkmate: gives_check
                        && all_actions(&position_after, side.opponent()).is_empty(),
                }
            } else {
                MoveAnnotations::default()
            };
            GeneratedMove {
                action,
                position_after,
                annotations,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen_parser::parse_position;

    #[test]
    fn pinned_piece_cannot_leave_the_pin_line() {
        // The e2 knight shields its king from the e8 rook.
        let position = parse_position("4r1k1/8/8/8/8/8/4N3/4K3", "-", "-", "0").expect("valid");
        assert!(generate_actions(&position, Coordinate::new(4, 1)).is_empty());
    }

    #[test]
    fn annotated_generator_flags_mate_in_one() {
        let position = parse_position("6k1/5ppp/8/8/8/8/8/R5K1", "-", "-", "0").expect("valid");
        let moves = LegalMoveGenerator.generate_legal_moves(&position, Side::White);
        let mates: Vec<_> = moves
            .iter()
            .filter(|mv| mv.annotations.is_checkmate)
            .map(|mv| mv.action.to_long_algebraic())
            .collect();
        assert_eq!(mates, vec!["a1a8".to_owned()]);

        let fast = FastLegalMoveGenerator.generate_legal_moves(&position, Side::White);
        assert_eq!(fast.len(), moves.len());
        assert!(fast.iter().all(|mv| mv.annotations == MoveAnnotations::default()));
    }
}

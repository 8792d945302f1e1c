//! Coordinate ("long algebraic") move notation as spoken by UCI:
//! `e2e4`, `e7e8q`, and for castling either the king's destination
//! (`e1g1`) or, in Chess960 mode, king-takes-own-rook (`e1h1`).

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_types::{PieceKind, Side};
use crate::game_state::position::Position;
use crate::moves::actions::{Action, ActionKind};
use crate::utils::algebraic::algebraic_to_coordinate;

/// UCI spelling of `action`; castles are written king-to-rook when
/// `chess960` is set.
pub fn action_to_long_algebraic(action: &Action, chess960: bool) -> String {
    match action.kind() {
        ActionKind::Castle { rook_from, .. } if chess960 => {
            format!("{}{}", action.start(), rook_from)
        }
        _ => action.to_long_algebraic(),
    }
}

/// Resolves `long_algebraic` against the legal actions of `side`.
pub fn long_algebraic_to_action(
    long_algebraic: &str,
    position: &Position,
    side: Side,
) -> ChessResult<Action> {
    let text = long_algebraic.trim();
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(ChessErrors::InvalidAlgebraic(format!(
            "invalid long algebraic move: {long_algebraic}"
        )));
    }

    let from = algebraic_to_coordinate(&text[0..2])?;
    let to = algebraic_to_coordinate(&text[2..4])?;
    let promotion = match text[4..].chars().next() {
        None => None,
        Some(ch) => {
            let kind = PieceKind::from_fen_char(ch)
                .filter(|kind| kind.is_promotion_target())
                .ok_or_else(|| {
                    ChessErrors::InvalidAlgebraic(format!("invalid promotion piece '{ch}'"))
                })?;
            Some(kind)
        }
    };

    if !position.is_side(from, side) {
        return Err(ChessErrors::IllegalMove {
            start: from,
            end: to,
        });
    }

    position
        .all_actions(side)
        .into_iter()
        .filter(|action| action.start() == from)
        .find(|action| {
            let lands = match action.kind() {
                ActionKind::Castle { rook_from, .. } => action.end() == to || rook_from == to,
                _ => action.end() == to,
            };
            lands && action.promotion() == promotion
        })
        .ok_or(ChessErrors::IllegalMove {
            start: from,
            end: to,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen_parser::parse_position;

    #[test]
    fn plain_moves_resolve_against_legal_actions() {
        let position = Position::standard();
        let action = long_algebraic_to_action("e2e4", &position, Side::White).expect("legal");
        assert_eq!(action_to_long_algebraic(&action, false), "e2e4");
        assert!(long_algebraic_to_action("e2e5", &position, Side::White).is_err());
        assert!(long_algebraic_to_action("e7e5", &position, Side::White).is_err());
        assert!(matches!(
            long_algebraic_to_action("e2", &position, Side::White),
            Err(ChessErrors::InvalidAlgebraic(_))
        ));
    }

    #[test]
    fn promotion_suffix_selects_the_piece() {
        let position = parse_position("4k3/1P6/8/8/8/8/8/4K3", "-", "-", "0").expect("valid");
        let knight = long_algebraic_to_action("b7b8n", &position, Side::White).expect("legal");
        assert_eq!(knight.promotion(), Some(PieceKind::Knight));
        assert_eq!(action_to_long_algebraic(&knight, false), "b7b8n");
        assert!(long_algebraic_to_action("b7b8", &position, Side::White).is_err());
        assert!(long_algebraic_to_action("b7b8k", &position, Side::White).is_err());
    }

    #[test]
    fn castling_accepts_both_spellings() {
        let position = parse_position("4k3/8/8/8/8/8/8/4K2R", "K", "-", "0").expect("valid");
        let by_king = long_algebraic_to_action("e1g1", &position, Side::White).expect("legal");
        let by_rook = long_algebraic_to_action("e1h1", &position, Side::White).expect("legal");
        assert_eq!(by_king, by_rook);
        assert_eq!(action_to_long_algebraic(&by_king, false), "e1g1");
        assert_eq!(action_to_long_algebraic(&by_king, true), "e1h1");
    }
}

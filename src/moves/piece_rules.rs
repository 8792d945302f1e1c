//! Per-kind rule table.
//!
//! Every piece kind maps to one `PieceRules` value holding the generator
//! for each action shape plus its attack test. Shapes a kind never
//! produces point at [`no_actions`]. Move generation and attack detection
//! go through [`rules_for`] and never branch on the kind themselves.

use crate::game_state::chess_types::{Coordinate, PieceKind};
use crate::game_state::position::Position;
use crate::moves::actions::Action;
use crate::moves::king_moves::generate_castles;
use crate::moves::leaping_moves::{generate_leaping_captures, generate_leaping_moves, leaping_attacks};
use crate::moves::pawn_moves::{
    generate_pawn_captures, generate_pawn_en_passants, generate_pawn_moves,
    generate_pawn_promotions, pawn_attacks,
};
use crate::moves::sliding_moves::{generate_sliding_captures, generate_sliding_moves, sliding_attacks};

pub type ActionGenerator = fn(&Position, Coordinate) -> Vec<Action>;

/// `attacks(position, target, from)` tells whether the piece on `from`
/// attacks `target`, whatever stands there.
pub type AttackTest = fn(&Position, Coordinate, Coordinate) -> bool;

#[derive(Clone, Copy)]
pub struct PieceRules {
    pub kind: PieceKind,
    pub generate_moves: ActionGenerator,
    pub generate_captures: ActionGenerator,
    pub generate_en_passants: ActionGenerator,
    pub generate_promotions: ActionGenerator,
    pub generate_castles: ActionGenerator,
    pub attacks: AttackTest,
}

impl PieceRules {
    /// Pseudo-legal actions of the piece on `at`, in the fixed order
    /// moves, captures, en passant, promotions, castles.
    pub fn pseudo_legal(&self, position: &Position, at: Coordinate) -> Vec<Action> {
        let mut out = (self.generate_moves)(position, at);
        out.extend((self.generate_captures)(position, at));
        out.extend((self.generate_en_passants)(position, at));
        out.extend((self.generate_promotions)(position, at));
        out.extend((self.generate_castles)(position, at));
        out
    }
}

pub fn no_actions(_position: &Position, _at: Coordinate) -> Vec<Action> {
    Vec::new()
}

const fn stepping(kind: PieceKind, generate_castles: ActionGenerator) -> PieceRules {
    PieceRules {
        kind,
        generate_moves: generate_leaping_moves,
        generate_captures: generate_leaping_captures,
        generate_en_passants: no_actions,
        generate_promotions: no_actions,
        generate_castles,
        attacks: leaping_attacks,
    }
}

const fn sliding(kind: PieceKind) -> PieceRules {
    PieceRules {
        kind,
        generate_moves: generate_sliding_moves,
        generate_captures: generate_sliding_captures,
        generate_en_passants: no_actions,
        generate_promotions: no_actions,
        generate_castles: no_actions,
        attacks: sliding_attacks,
    }
}

static PAWN_RULES: PieceRules = PieceRules {
    kind: PieceKind::Pawn,
    generate_moves: generate_pawn_moves,
    generate_captures: generate_pawn_captures,
    generate_en_passants: generate_pawn_en_passants,
    generate_promotions: generate_pawn_promotions,
    generate_castles: no_actions,
    attacks: pawn_attacks,
};
static KNIGHT_RULES: PieceRules = stepping(PieceKind::Knight, no_actions);
static BISHOP_RULES: PieceRules = sliding(PieceKind::Bishop);
static ROOK_RULES: PieceRules = sliding(PieceKind::Rook);
static QUEEN_RULES: PieceRules = sliding(PieceKind::Queen);
static KING_RULES: PieceRules = stepping(PieceKind::King, generate_castles);

pub fn rules_for(kind: PieceKind) -> &'static PieceRules {
    match kind {
        PieceKind::Pawn => &PAWN_RULES,
        PieceKind::Knight => &KNIGHT_RULES,
        PieceKind::Bishop => &BISHOP_RULES,
        PieceKind::Rook => &ROOK_RULES,
        PieceKind::Queen => &QUEEN_RULES,
        PieceKind::King => &KING_RULES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Side;

    #[test]
    fn table_is_indexed_by_kind() {
        for kind in [
            PieceKind::Pawn,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
            PieceKind::King,
        ] {
            assert_eq!(rules_for(kind).kind, kind);
        }
    }

    #[test]
    fn pseudo_legal_knight_actions_in_start_position() {
        let position = Position::standard();
        let g1 = Coordinate::new(6, 0);
        let actions = rules_for(PieceKind::Knight).pseudo_legal(&position, g1);
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().all(|a| a.piece().is(PieceKind::Knight, Side::White)));
    }
}

//! Perft: exhaustive legal-move tree counts used to validate generation.

use std::sync::Arc;
use std::thread;

use crate::game_state::chess_types::Side;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_generator::{FastLegalMoveGenerator, LegalMoveGenerator};
use crate::move_generation::move_generator::{GeneratedMove, MoveGenerator};
use crate::moves::actions::ActionKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }

    fn record_leaf(&mut self, mv: &GeneratedMove) {
        self.nodes += 1;
        if mv.action.is_capture() {
            self.captures += 1;
        }
        match mv.action.kind() {
            ActionKind::EnPassant => self.en_passant += 1,
            ActionKind::Castle { .. } => self.castles += 1,
            ActionKind::Promotion(_) => self.promotions += 1,
            ActionKind::Move | ActionKind::Capture => {}
        }
        if mv.annotations.gives_check {
            self.checks += 1;
        }
        if mv.annotations.is_checkmate {
            self.checkmates += 1;
        }
    }
}

pub fn perft<G: MoveGenerator>(generator: &G, position: &Position, side: Side, depth: u8) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }

    let mut total = PerftCounts::default();
    for mv in generator.generate_legal_moves(position, side) {
        perft_recurse(generator, &mv, side.opponent(), depth, 1, &mut total);
    }
    total
}

/// Full counts, check and mate annotations included.
pub fn perft_legal(position: &Position, side: Side, depth: u8) -> PerftCounts {
    perft(&LegalMoveGenerator, position, side, depth)
}

/// Node count only; skips the annotation pass.
pub fn perft_nodes(position: &Position, side: Side, depth: u8) -> usize {
    perft(&FastLegalMoveGenerator, position, side, depth).nodes
}

/// Splits the root moves across one thread each. A panicking worker
/// re-raises its panic on the calling thread.
pub fn perft_multi_threaded(
    generator: Arc<dyn MoveGenerator>,
    position: &Position,
    side: Side,
    depth: u8,
) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }

    let root_moves = generator.generate_legal_moves(position, side);
    let mut handles = Vec::with_capacity(root_moves.len());
    for mv in root_moves {
        let generator_ref = Arc::clone(&generator);
        handles.push(thread::spawn(move || {
            let mut local = PerftCounts::default();
            perft_recurse(generator_ref.as_ref(), &mv, side.opponent(), depth, 1, &mut local);
            local
        }));
    }

    let mut total = PerftCounts::default();
    for handle in handles {
        let local = handle
            .join()
            .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
        total.merge(local);
    }
    total
}

fn perft_recurse<G: MoveGenerator + ?Sized>(
    generator: &G,
    mv: &GeneratedMove,
    side: Side,
    search_depth: u8,
    current_depth: u8,
    counts: &mut PerftCounts,
) {
    if current_depth == search_depth {
        counts.record_leaf(mv);
        return;
    }
    for child in generator.generate_legal_moves(&mv.position_after, side) {
        perft_recurse(generator, &child, side.opponent(), search_depth, current_depth + 1, counts);
    }
}

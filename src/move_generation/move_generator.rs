use crate::game_state::chess_types::Side;
use crate::game_state::position::Position;
use crate::moves::actions::Action;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveAnnotations {
    pub gives_check: bool,
    pub is_checkmate: bool,
}

/// A legal action together with the position it produces.
#[derive(Debug, Clone)]
pub struct GeneratedMove {
    pub action: Action,
    pub position_after: Position,
    pub annotations: MoveAnnotations,
}

pub trait MoveGenerator: Send + Sync {
    fn generate_legal_moves(&self, position: &Position, side: Side) -> Vec<GeneratedMove>;
}

//! Engine abstraction layer used by the UCI front end and game sessions.
//!
//! Defines common input parameters and output payloads so different engine
//! strategies can be selected at runtime behind a single trait interface.

use crate::chess_errors::ChessResult;
use crate::game_state::chess_types::Side;
use crate::game_state::position::Position;
use crate::moves::actions::Action;

#[derive(Debug, Clone, Default)]
pub struct GoParams {
    /// Overrides the engine's configured depth for this request.
    pub depth: Option<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub best_move: Option<Action>,
    /// Score in the absolute convention (White positive), when known.
    pub score: Option<i32>,
    /// UCI `info` lines describing the search.
    pub info_lines: Vec<String>,
}

pub trait Engine: Send {
    fn name(&self) -> &str;

    fn new_game(&mut self) {}

    fn set_option(&mut self, _name: &str, _value: &str) -> ChessResult<()> {
        Ok(())
    }

    /// `best_move` is `None` only when `side` has no legal move.
    fn choose_move(
        &mut self,
        position: &Position,
        side: Side,
        params: &GoParams,
    ) -> ChessResult<EngineOutput>;
}

//! A game in progress: the current position plus everything a `Position`
//! deliberately leaves out (side to move, move number, history, selection).
//!
//! History is append-only while playing and truncated by [`GameSession::take_back`].
//! It exists for repetition counting, take-back and PGN export.

use std::collections::BTreeSet;

use rand::Rng;

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::game_state::chess960::{chess960_position, chess960_position_from_index};
use crate::game_state::chess_rules::REPETITION_DRAW_COUNT;
use crate::game_state::chess_types::{Coordinate, PieceKind, Side};
use crate::game_state::position::{Position, Termination};
use crate::moves::actions::Action;
use crate::utils::fen_generator::generate_fen;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Checkmate { winner: Side },
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    Repetition,
}

impl GameOutcome {
    /// PGN result token.
    pub fn result_token(&self) -> &'static str {
        match self {
            GameOutcome::Checkmate { winner: Side::White } => "1-0",
            GameOutcome::Checkmate { winner: Side::Black } => "0-1",
            _ => "1/2-1/2",
        }
    }
}

/// One move as it was played, with its notation fixed at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub action: Action,
    pub side: Side,
    pub notation: String,
}

#[derive(Debug, Clone)]
struct Snapshot {
    position: Position,
    side_to_move: Side,
    fullmove_number: u16,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    position: Position,
    side_to_move: Side,
    fullmove_number: u16,
    history: Vec<Snapshot>,
    moves: Vec<PlayedMove>,
    selected: Option<Coordinate>,
    initial_fen: String,
    chess960: bool,
}

impl GameSession {
    /// Standard game, White to move.
    pub fn new() -> Self {
        Self::from_position(Position::standard(), Side::White, 1)
    }

    pub fn from_position(position: Position, side_to_move: Side, fullmove_number: u16) -> Self {
        let mut session = Self {
            position,
            side_to_move,
            fullmove_number,
            history: Vec::new(),
            moves: Vec::new(),
            selected: None,
            initial_fen: String::new(),
            chess960: false,
        };
        session.initial_fen = session.fen();
        session
    }

    pub fn chess960_from_index(index: u16) -> ChessResult<Self> {
        let mut session = Self::from_position(chess960_position_from_index(index)?, Side::White, 1);
        session.chess960 = true;
        Ok(session)
    }

    /// Random Chess960 game; returns the setup index alongside.
    pub fn chess960<R: Rng + ?Sized>(rng: &mut R) -> (u16, Self) {
        let (index, position) = chess960_position(rng);
        let mut session = Self::from_position(position, Side::White, 1);
        session.chess960 = true;
        (index, session)
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    pub fn set_chess960(&mut self, chess960: bool) {
        self.chess960 = chess960;
    }

    /// FEN of the position the session started from.
    pub fn initial_fen(&self) -> &str {
        &self.initial_fen
    }

    pub fn moves(&self) -> &[PlayedMove] {
        &self.moves
    }

    /// Prior positions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Position> + '_ {
        self.history.iter().map(|snapshot| &snapshot.position)
    }

    /// How often the current placement occurred before.
    pub fn repetition_count(&self) -> usize {
        self.history
            .iter()
            .filter(|snapshot| snapshot.position == self.position)
            .count()
    }

    pub fn fen(&self) -> String {
        generate_fen(self)
    }

    /// Selects the piece on `at` if it belongs to the side to move and
    /// returns its legal destinations. Anything else clears the selection.
    pub fn select(&mut self, at: Coordinate) -> BTreeSet<Coordinate> {
        if self.position.is_side(at, self.side_to_move) {
            self.selected = Some(at);
            self.position.legal_destinations(at)
        } else {
            self.selected = None;
            BTreeSet::new()
        }
    }

    #[inline]
    pub fn selected(&self) -> Option<Coordinate> {
        self.selected
    }

    /// True when `at` is a legal destination of the selected piece.
    pub fn is_highlighted(&self, at: Coordinate) -> bool {
        self.selected
            .is_some_and(|from| self.position.legal_destinations(from).contains(&at))
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Plays the legal action from `start` to `end`; promotions become queens.
    pub fn make_move(&mut self, start: Coordinate, end: Coordinate) -> ChessResult<Action> {
        self.make_move_with_promotion(start, end, None)
    }

    pub fn make_move_with_promotion(
        &mut self,
        start: Coordinate,
        end: Coordinate,
        promotion: Option<PieceKind>,
    ) -> ChessResult<Action> {
        if self.position.is_piece(start) && !self.position.is_side(start, self.side_to_move) {
            return Err(ChessErrors::IllegalMove { start, end });
        }
        let action = self.position.find_action(start, end, promotion)?;
        self.apply_action(action);
        Ok(action)
    }

    /// Plays an action previously produced for the current position.
    pub fn play_action(&mut self, action: Action) -> ChessResult<()> {
        if action.piece().side != self.side_to_move
            || !self.position.all_actions(self.side_to_move).contains(&action)
        {
            return Err(ChessErrors::IllegalMove {
                start: action.start(),
                end: action.end(),
            });
        }
        self.apply_action(action);
        Ok(())
    }

    fn apply_action(&mut self, action: Action) {
        let next = action.apply(&self.position);
        let mover = self.side_to_move;
        let previous = std::mem::replace(&mut self.position, next);
        self.history.push(Snapshot {
            position: previous,
            side_to_move: mover,
            fullmove_number: self.fullmove_number,
        });
        self.moves.push(PlayedMove {
            action,
            side: mover,
            notation: action.notation(&self.position),
        });
        if mover == Side::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = mover.opponent();
        self.selected = None;
    }

    /// Undoes the last move. Returns `false` when there is nothing to undo.
    pub fn take_back(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            return false;
        };
        self.moves.pop();
        self.position = snapshot.position;
        self.side_to_move = snapshot.side_to_move;
        self.fullmove_number = snapshot.fullmove_number;
        self.selected = None;
        true
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        if let Some(termination) = self.position.termination(self.side_to_move) {
            return Some(match termination {
                Termination::Checkmate { loser } => GameOutcome::Checkmate {
                    winner: loser.opponent(),
                },
                Termination::Stalemate => GameOutcome::Stalemate,
                Termination::InsufficientMaterial => GameOutcome::InsufficientMaterial,
                Termination::FiftyMoveRule => GameOutcome::FiftyMoveRule,
            });
        }
        if self.repetition_count() + 1 >= REPETITION_DRAW_COUNT {
            return Some(GameOutcome::Repetition);
        }
        None
    }

    /// Asks `engine` for a move in the current position and plays it.
    pub fn play_engine_move(
        &mut self,
        engine: &mut dyn Engine,
        params: &GoParams,
    ) -> ChessResult<EngineOutput> {
        let output = engine.choose_move(&self.position, self.side_to_move, params)?;
        let action = output.best_move.ok_or(ChessErrors::NoLegalMoves)?;
        self.play_action(action)?;
        Ok(output)
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

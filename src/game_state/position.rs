//! The board: piece placement plus the bookkeeping the rules need.
//!
//! A `Position` is a snapshot. The mutators in this module are crate-private
//! and only ever run on a freshly cloned value while an action builds the
//! successor, so a `Position` handed to a caller never changes afterwards.
//!
//! Equality and hashing look at piece placement only (kind and side per
//! square), which is what repetition counting and the search cache key on.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_rules::{BLACK_WINS_SCORE, FIFTY_MOVE_HALFMOVES, WHITE_WINS_SCORE};
use crate::game_state::chess_types::{Coordinate, Piece, PieceKind, Side};
use crate::move_generation::legal_move_generator::{all_actions, generate_actions};
use crate::moves::actions::Action;
use crate::moves::king_moves::castling_rook;
use crate::moves::piece_rules::rules_for;
use crate::utils::fen_generator::generate_placement;

/// Back rank of the standard setup, a-file first.
pub const STANDARD_BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Debug, Clone)]
pub struct Position {
    squares: [Option<Piece>; 64],
    halfmove_clock: u16,
    last_move: Option<(Coordinate, Coordinate)>,
}

/// Why a game ended, seen from the position alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Checkmate { loser: Side },
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
}

impl Position {
    /// Board with no pieces. Only used while assembling a position whose
    /// kings are placed before it is handed out.
    pub(crate) fn empty() -> Self {
        Self {
            squares: [None; 64],
            halfmove_clock: 0,
            last_move: None,
        }
    }

    /// The standard initial layout.
    pub fn standard() -> Self {
        Self::from_back_rank(&STANDARD_BACK_RANK)
    }

    /// Initial layout with the given White back rank mirrored for Black and a
    /// full row of pawns in front of each.
    pub fn from_back_rank(back_rank: &[PieceKind; 8]) -> Self {
        let mut position = Self::empty();
        for (file, kind) in back_rank.iter().enumerate() {
            let file = file as u8;
            for side in [Side::White, Side::Black] {
                position.put(Coordinate::new(file, side.back_rank()), Piece::new(*kind, side));
                position.put(
                    Coordinate::new(file, side.pawn_start_rank()),
                    Piece::new(PieceKind::Pawn, side),
                );
            }
        }
        position
    }

    #[inline]
    pub fn get(&self, at: Coordinate) -> Option<Piece> {
        self.squares[at.index()]
    }

    #[inline]
    pub fn is_piece(&self, at: Coordinate) -> bool {
        self.squares[at.index()].is_some()
    }

    #[inline]
    pub fn is_side(&self, at: Coordinate, side: Side) -> bool {
        matches!(self.get(at), Some(piece) if piece.side == side)
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    /// Start and end square of the action that produced this position.
    #[inline]
    pub fn last_move(&self) -> Option<(Coordinate, Coordinate)> {
        self.last_move
    }

    /// Every occupied square with its piece, a1 first.
    pub fn occupied(&self) -> impl Iterator<Item = (Coordinate, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(index, piece)| piece.map(|p| (Coordinate::from_index(index), p)))
    }

    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = (Coordinate, Piece)> + '_ {
        self.occupied().filter(move |(_, piece)| piece.side == side)
    }

    pub fn king_square(&self, side: Side) -> Option<Coordinate> {
        self.pieces_of(side)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(at, _)| at)
    }

    /// Successor skeleton: same pieces and clock, new last-move squares.
    pub(crate) fn successor(&self, halfmove_clock: u16, start: Coordinate, end: Coordinate) -> Self {
        Self {
            squares: self.squares,
            halfmove_clock,
            last_move: Some((start, end)),
        }
    }

    pub(crate) fn set_halfmove_clock(&mut self, halfmove_clock: u16) {
        self.halfmove_clock = halfmove_clock;
    }

    #[inline]
    pub(crate) fn put(&mut self, at: Coordinate, piece: Piece) {
        self.squares[at.index()] = Some(piece);
    }

    #[inline]
    pub(crate) fn remove_piece_at(&mut self, at: Coordinate) -> Option<Piece> {
        self.squares[at.index()].take()
    }

    /// Places a copy of `piece` on `at`, replacing any occupant.
    #[inline]
    pub(crate) fn place_piece_at(&mut self, piece: Piece, at: Coordinate) {
        self.put(at, piece);
    }

    /// Clears `to`, places `piece` there and empties `from`.
    pub(crate) fn move_piece_to(&mut self, piece: Piece, from: Coordinate, to: Coordinate) {
        self.remove_piece_at(to);
        self.place_piece_at(piece, to);
        if from != to {
            self.remove_piece_at(from);
        }
    }

    /// Clears the just-double-stepped flag of every pawn.
    pub(crate) fn unpassant(&mut self) {
        for piece in self.squares.iter_mut().flatten() {
            piece.en_passant = false;
        }
    }

    /// Clears every flag, then marks the pawn on `at` as just double-stepped.
    pub(crate) fn unpassant_at(&mut self, at: Coordinate) {
        self.unpassant();
        if let Some(piece) = self.squares[at.index()].as_mut() {
            if piece.kind == PieceKind::Pawn {
                piece.en_passant = true;
            }
        }
    }

    pub(crate) fn set_moved(&mut self, at: Coordinate) {
        if let Some(piece) = self.squares[at.index()].as_mut() {
            piece.moved = true;
        }
    }

    /// Recomputes the display-only check flag of both kings.
    pub(crate) fn refresh_check_flags(&mut self) {
        for side in [Side::White, Side::Black] {
            let checked = self.in_check(side);
            if let Some(king) = self.king_square(side) {
                if let Some(piece) = self.squares[king.index()].as_mut() {
                    piece.in_check = checked;
                }
            }
        }
    }

    /// True when any piece of `side`'s opponent attacks `target`.
    pub fn attacked(&self, target: Coordinate, side: Side) -> bool {
        self.pieces_of(side.opponent())
            .any(|(from, piece)| (rules_for(piece.kind).attacks)(self, target, from))
    }

    pub fn in_check(&self, side: Side) -> bool {
        self.king_square(side)
            .is_some_and(|king| self.attacked(king, side))
    }

    /// Every legal action of `side`.
    pub fn all_actions(&self, side: Side) -> Vec<Action> {
        all_actions(self, side)
    }

    /// Legal actions of the piece standing on `at` (empty for an empty square).
    pub fn actions_at(&self, at: Coordinate) -> Vec<Action> {
        generate_actions(self, at)
    }

    pub fn checkmated(&self, side: Side) -> bool {
        self.in_check(side) && self.all_actions(side).is_empty()
    }

    pub fn stalemated(&self, side: Side) -> bool {
        !self.in_check(side) && self.all_actions(side).is_empty()
    }

    /// Conservative draw heuristic: no rook, pawn or queen on the board and
    /// neither side holds two bishops or three knights. Not the full set of
    /// dead-position rules.
    pub fn insufficient_material(&self) -> bool {
        let mut bishops = [0u8; 2];
        let mut knights = [0u8; 2];
        for (_, piece) in self.occupied() {
            match piece.kind {
                PieceKind::Rook | PieceKind::Pawn | PieceKind::Queen => return false,
                PieceKind::Bishop => bishops[piece.side.index()] += 1,
                PieceKind::Knight => knights[piece.side.index()] += 1,
                PieceKind::King => {}
            }
        }
        bishops.iter().all(|&n| n < 2) && knights.iter().all(|&n| n < 3)
    }

    pub fn fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= FIFTY_MOVE_HALFMOVES
    }

    /// Either side checkmated or stalemated, or a draw by rule.
    pub fn end_of_game(&self) -> bool {
        self.fifty_move_draw()
            || self.insufficient_material()
            || [Side::White, Side::Black]
                .iter()
                .any(|side| self.all_actions(*side).is_empty())
    }

    /// How the game stands with `side_to_move` on turn, if it is over.
    pub fn termination(&self, side_to_move: Side) -> Option<Termination> {
        let has_actions = !self.all_actions(side_to_move).is_empty();
        self.termination_with(side_to_move, has_actions)
    }

    pub(crate) fn termination_with(&self, side_to_move: Side, has_actions: bool) -> Option<Termination> {
        if !has_actions {
            return Some(if self.in_check(side_to_move) {
                Termination::Checkmate {
                    loser: side_to_move,
                }
            } else {
                Termination::Stalemate
            });
        }
        if self.insufficient_material() {
            return Some(Termination::InsufficientMaterial);
        }
        if self.fifty_move_draw() {
            return Some(Termination::FiftyMoveRule);
        }
        None
    }

    /// Signed material sum, White positive.
    pub fn material(&self) -> i32 {
        self.occupied().map(|(_, piece)| piece.signed_value()).sum()
    }

    /// Static value independent of whose turn it is: mate sentinels when
    /// either side is checkmated, 0 for any other finished game, material
    /// otherwise.
    pub fn heuristic_value(&self) -> i32 {
        if self.checkmated(Side::White) {
            return BLACK_WINS_SCORE;
        }
        if self.checkmated(Side::Black) {
            return WHITE_WINS_SCORE;
        }
        if self.fifty_move_draw()
            || self.insufficient_material()
            || self.stalemated(Side::White)
            || self.stalemated(Side::Black)
        {
            return 0;
        }
        self.material()
    }

    /// Static value with `side_to_move` on turn; the search scores leaves
    /// with this.
    pub fn evaluate(&self, side_to_move: Side) -> i32 {
        let has_actions = !self.all_actions(side_to_move).is_empty();
        self.evaluate_with(side_to_move, has_actions)
    }

    pub(crate) fn evaluate_with(&self, side_to_move: Side, has_actions: bool) -> i32 {
        match self.termination_with(side_to_move, has_actions) {
            Some(Termination::Checkmate { loser: Side::White }) => BLACK_WINS_SCORE,
            Some(Termination::Checkmate { loser: Side::Black }) => WHITE_WINS_SCORE,
            Some(_) => 0,
            None => self.material(),
        }
    }

    /// Squares the piece on `at` can legally reach.
    pub fn legal_destinations(&self, at: Coordinate) -> BTreeSet<Coordinate> {
        self.actions_at(at).iter().map(|action| action.end()).collect()
    }

    /// Applies the legal action of the piece on `start` that ends on `end`.
    /// Promotions default to a queen.
    pub fn make_move(&self, start: Coordinate, end: Coordinate) -> ChessResult<Position> {
        self.make_move_with_promotion(start, end, None)
    }

    pub fn make_move_with_promotion(
        &self,
        start: Coordinate,
        end: Coordinate,
        promotion: Option<PieceKind>,
    ) -> ChessResult<Position> {
        Ok(self.find_action(start, end, promotion)?.apply(self))
    }

    /// The legal action matching `start`, `end` and (for promotions) the
    /// requested piece kind.
    pub fn find_action(
        &self,
        start: Coordinate,
        end: Coordinate,
        promotion: Option<PieceKind>,
    ) -> ChessResult<Action> {
        if !self.is_piece(start) {
            return Err(ChessErrors::NoPieceAt(start));
        }
        if let Some(kind) = promotion {
            if !kind.is_promotion_target() {
                return Err(ChessErrors::InvalidPromotionTarget(kind));
            }
        }
        let wanted = promotion.unwrap_or(PieceKind::Queen);
        self.actions_at(start)
            .into_iter()
            .filter(|action| action.end() == end)
            .find(|action| action.promotion().map_or(true, |kind| kind == wanted))
            .ok_or(ChessErrors::IllegalMove { start, end })
    }

    /// Placement field of FEN, rank 8 first.
    pub fn fen(&self) -> String {
        generate_placement(self)
    }

    /// Castling field of FEN (`KQkq` subset or `-`).
    pub fn castling_fen(&self) -> String {
        let mut out = String::new();
        for side in [Side::White, Side::Black] {
            for (kingside, letter) in [(true, 'k'), (false, 'q')] {
                if castling_rook(self, side, kingside).is_some() {
                    out.push(match side {
                        Side::White => letter.to_ascii_uppercase(),
                        Side::Black => letter,
                    });
                }
            }
        }
        if out.is_empty() {
            out.push('-');
        }
        out
    }

    /// Square behind the pawn that just double-stepped, if any.
    pub fn en_passant_target(&self) -> Option<Coordinate> {
        self.occupied()
            .find(|(_, piece)| piece.kind == PieceKind::Pawn && piece.en_passant)
            .and_then(|(at, piece)| at.offset(0, -piece.side.forward()))
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.squares
            .iter()
            .zip(other.squares.iter())
            .all(|(a, b)| a.map(|p| (p.kind, p.side)) == b.map(|p| (p.kind, p.side)))
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for square in &self.squares {
            square.map(|p| (p.kind, p.side)).hash(state);
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen_parser::parse_position;

    fn sq(name: &str) -> Coordinate {
        crate::utils::algebraic::algebraic_to_coordinate(name).expect("valid square")
    }

    #[test]
    fn standard_position_has_twenty_legal_actions_for_white() {
        let position = Position::standard();
        assert_eq!(position.all_actions(Side::White).len(), 20);
        assert_eq!(position.all_actions(Side::Black).len(), 20);
        assert_eq!(position.fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
        assert_eq!(position.castling_fen(), "KQkq");
    }

    #[test]
    fn fools_mate_checkmates_white() {
        let mut position = Position::standard();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            position = position.make_move(sq(from), sq(to)).expect("legal move");
        }
        assert!(position.in_check(Side::White));
        assert!(position.checkmated(Side::White));
        assert!(position.all_actions(Side::White).is_empty());
        assert_eq!(position.heuristic_value(), BLACK_WINS_SCORE);
        assert_eq!(
            position.termination(Side::White),
            Some(Termination::Checkmate { loser: Side::White })
        );
        let king = position.get(sq("e1")).expect("white king");
        assert!(king.in_check);
    }

    #[test]
    fn applying_an_action_leaves_the_original_untouched() {
        let position = Position::standard();
        let next = position.make_move(sq("e2"), sq("e4")).expect("legal move");
        assert!(position.is_piece(sq("e2")));
        assert!(!position.is_piece(sq("e4")));
        assert!(next.is_piece(sq("e4")));
        assert_ne!(position, next);
        assert_eq!(next.last_move(), Some((sq("e2"), sq("e4"))));
    }

    #[test]
    fn equality_ignores_flags_and_clocks() {
        let a = parse_position("4k3/8/8/8/4P3/8/8/4K3", "-", "e3", "7").expect("valid");
        let b = parse_position("4k3/8/8/8/4P3/8/8/4K3", "-", "-", "0").expect("valid");
        assert_eq!(a, b);
        assert_ne!(a.en_passant_target(), b.en_passant_target());
    }

    #[test]
    fn illegal_destination_is_reported() {
        let position = Position::standard();
        let err = position
            .make_move(sq("e2"), sq("e5"))
            .expect_err("e2e5 is not legal");
        assert_eq!(
            err,
            ChessErrors::IllegalMove {
                start: sq("e2"),
                end: sq("e5")
            }
        );
        assert_eq!(
            position.make_move(sq("e4"), sq("e5")).expect_err("empty square"),
            ChessErrors::NoPieceAt(sq("e4"))
        );
    }

    #[test]
    fn insufficient_material_for_bare_kings_only() {
        let bare = parse_position("4k3/8/8/8/8/8/8/4K3", "-", "-", "0").expect("valid");
        assert!(bare.insufficient_material());
        let with_pawn = parse_position("4k3/8/8/8/8/8/4P3/4K3", "-", "-", "0").expect("valid");
        assert!(!with_pawn.insufficient_material());
        let two_bishops = parse_position("4k3/8/8/8/8/8/8/2B1KB2", "-", "-", "0").expect("valid");
        assert!(!two_bishops.insufficient_material());
        let one_knight = parse_position("4k3/8/8/8/8/8/8/1N2K3", "-", "-", "0").expect("valid");
        assert!(one_knight.insufficient_material());
        assert_eq!(bare.heuristic_value(), 0);
    }

    #[test]
    fn fifty_move_counter_reaching_one_hundred_draws() {
        let position = parse_position("4k3/8/8/8/8/8/8/R3K3", "-", "-", "99").expect("valid");
        assert!(!position.fifty_move_draw());
        let next = position.make_move(sq("a1"), sq("a2")).expect("legal");
        assert_eq!(next.halfmove_clock(), 100);
        assert!(next.fifty_move_draw());
        assert_eq!(next.termination(Side::Black), Some(Termination::FiftyMoveRule));
    }

    #[test]
    fn stalemate_is_detected_for_the_side_without_moves() {
        let position = parse_position("7k/5Q2/6K1/8/8/8/8/8", "-", "-", "0").expect("valid");
        assert!(position.stalemated(Side::Black));
        assert!(!position.checkmated(Side::Black));
        assert_eq!(position.evaluate(Side::Black), 0);
        assert_eq!(position.evaluate(Side::White), position.material());
    }

    #[test]
    fn legal_destinations_of_a_knight() {
        let position = Position::standard();
        let destinations = position.legal_destinations(sq("g1"));
        assert_eq!(
            destinations.into_iter().collect::<Vec<_>>(),
            vec![sq("f3"), sq("h3")]
        );
        assert!(position.legal_destinations(sq("e4")).is_empty());
    }
}

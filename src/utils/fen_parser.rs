//! FEN parsing.
//!
//! [`parse_position`] rebuilds a `Position` from the placement field plus the
//! castling, en-passant and half-move fields. [`parse_fen`] reads all six
//! fields into a `GameSession`.
//!
//! FEN does not record which pieces have moved, so the parser infers it:
//! pawns off their starting rank are marked moved, and a rook without a
//! matching castling right is marked moved.

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_types::{Coordinate, Piece, PieceKind, Side};
use crate::game_state::game_session::GameSession;
use crate::game_state::position::Position;
use crate::utils::algebraic::algebraic_to_coordinate;

fn invalid(msg: impl Into<String>) -> ChessErrors {
    ChessErrors::InvalidFen(msg.into())
}

/// Parse a full FEN string. The two clock fields may be omitted and then
/// default to `0 1`.
pub fn parse_fen(fen: &str) -> ChessResult<GameSession> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| invalid("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| invalid("missing side to move"))?;
    let castling_part = parts.next().ok_or_else(|| invalid("missing castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| invalid("missing en-passant square"))?;
    let halfmove_part = parts.next().unwrap_or("0");
    let fullmove_part = parts.next().unwrap_or("1");

    if parts.next().is_some() {
        return Err(invalid("extra trailing fields"));
    }

    let side_to_move = parse_side_to_move(side_part)?;
    let position = parse_position(board_part, castling_part, en_passant_part, halfmove_part)?;
    // Only the side that just moved can have a pawn open to en passant.
    let passed_pawn_side = position
        .occupied()
        .find(|(_, piece)| piece.kind == PieceKind::Pawn && piece.en_passant)
        .map(|(_, piece)| piece.side);
    if passed_pawn_side == Some(side_to_move) {
        return Err(invalid(format!(
            "en-passant square {en_passant_part} does not fit the side to move"
        )));
    }
    let fullmove_number = fullmove_part
        .parse::<u16>()
        .map_err(|_| invalid(format!("invalid fullmove number: {fullmove_part}")))?;

    Ok(GameSession::from_position(
        position,
        side_to_move,
        fullmove_number.max(1),
    ))
}

/// Build a `Position` from the placement field and the castling,
/// en-passant and half-move fields.
pub fn parse_position(
    placement: &str,
    castling: &str,
    en_passant: &str,
    halfmove: &str,
) -> ChessResult<Position> {
    let mut position = parse_board(placement)?;

    for side in [Side::White, Side::Black] {
        let kings = position
            .pieces_of(side)
            .filter(|(_, piece)| piece.kind == PieceKind::King)
            .count();
        if kings != 1 {
            return Err(invalid(format!("{side} must have exactly one king, found {kings}")));
        }
    }

    mark_moved_pawns(&mut position)?;
    apply_castling_rights(&mut position, castling)?;
    apply_en_passant(&mut position, en_passant)?;

    let halfmove_clock = halfmove
        .parse::<u16>()
        .map_err(|_| invalid(format!("invalid halfmove clock: {halfmove}")))?;
    position.set_halfmove_clock(halfmove_clock);
    position.refresh_check_flags();

    Ok(position)
}

fn parse_board(board_part: &str) -> ChessResult<Position> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid("board layout must contain 8 ranks"));
    }

    let mut position = Position::empty();
    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - fen_rank_idx as u8;
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(invalid(format!("invalid empty-square count '{ch}'")));
                }
                file += empty_count as u8;
                if file > 8 {
                    return Err(invalid(format!("rank {} has too many files", rank + 1)));
                }
                continue;
            }

            let piece = Piece::from_fen_char(ch)
                .ok_or_else(|| invalid(format!("invalid piece character '{ch}'")))?;
            if file >= 8 {
                return Err(invalid(format!("rank {} has too many files", rank + 1)));
            }
            position.put(Coordinate::new(file, rank), piece);
            file += 1;
        }

        if file != 8 {
            return Err(invalid(format!("rank {} does not sum to 8 files", rank + 1)));
        }
    }

    Ok(position)
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Side> {
    match side_part {
        "w" => Ok(Side::White),
        "b" => Ok(Side::Black),
        _ => Err(invalid(format!("invalid side to move: {side_part}"))),
    }
}

fn mark_moved_pawns(position: &mut Position) -> ChessResult<()> {
    let pawns: Vec<(Coordinate, Piece)> = position
        .occupied()
        .filter(|(_, piece)| piece.kind == PieceKind::Pawn)
        .collect();
    for (at, pawn) in pawns {
        if at.rank() == 0 || at.rank() == 7 {
            return Err(invalid(format!("pawn on {at} cannot stand on the first or last rank")));
        }
        if at.rank() != pawn.side.pawn_start_rank() {
            position.set_moved(at);
        }
    }
    Ok(())
}

/// Castling letters: `K`/`Q` (outermost rook on that wing) or, for
/// Chess960 positions, the file letter of the rook (`HAha`).
fn apply_castling_rights(position: &mut Position, castling: &str) -> ChessResult<()> {
    let mut kept: Vec<(Side, Option<bool>, Option<u8>)> = Vec::new();
    if castling != "-" {
        for ch in castling.chars() {
            let side = if ch.is_ascii_uppercase() { Side::White } else { Side::Black };
            match ch.to_ascii_lowercase() {
                'k' => kept.push((side, Some(true), None)),
                'q' => kept.push((side, Some(false), None)),
                file @ 'a'..='h' => kept.push((side, None, Some(file as u8 - b'a'))),
                _ => return Err(invalid(format!("invalid castling character '{ch}'"))),
            }
        }
    }

    for side in [Side::White, Side::Black] {
        let rank = side.back_rank();
        let king_file = position
            .king_square(side)
            .filter(|at| at.rank() == rank)
            .map(|at| at.file());

        let rooks: Vec<Coordinate> = position
            .pieces_of(side)
            .filter(|(_, piece)| piece.kind == PieceKind::Rook)
            .map(|(at, _)| at)
            .collect();

        for at in rooks {
            let keeps_right = at.rank() == rank
                && king_file.is_some_and(|king_file| {
                    let kingside = at.file() > king_file;
                    kept.iter().any(|&(right_side, wing, file)| {
                        right_side == side
                            && match (wing, file) {
                                (Some(wing), _) => {
                                    wing == kingside && is_outermost(position, side, at, kingside)
                                }
                                (None, Some(file)) => file == at.file(),
                                (None, None) => false,
                            }
                    })
                });
            if !keeps_right {
                position.set_moved(at);
            }
        }

        if king_file.is_none() {
            if let Some(king) = position.king_square(side) {
                position.set_moved(king);
            }
        }
    }
    Ok(())
}

fn is_outermost(position: &Position, side: Side, at: Coordinate, kingside: bool) -> bool {
    let outward: Vec<u8> = if kingside {
        (at.file() + 1..8).collect()
    } else {
        (0..at.file()).collect()
    };
    !outward.into_iter().any(|file| {
        position
            .get(Coordinate::new(file, at.rank()))
            .is_some_and(|piece| piece.is(PieceKind::Rook, side))
    })
}

/// The target square sits directly behind the pawn that just double-stepped.
fn apply_en_passant(position: &mut Position, en_passant: &str) -> ChessResult<()> {
    if en_passant == "-" {
        return Ok(());
    }
    let target = algebraic_to_coordinate(en_passant)?;
    let side = match target.rank() {
        2 => Side::White,
        5 => Side::Black,
        _ => {
            return Err(invalid(format!(
                "en-passant square {target} must be on rank 3 or 6"
            )))
        }
    };
    let pawn_at = target
        .offset(0, side.forward())
        .ok_or_else(|| invalid(format!("en-passant square {target} is off the board")))?;
    let has_pawn = position
        .get(pawn_at)
        .is_some_and(|piece| piece.is(PieceKind::Pawn, side));
    if !has_pawn {
        return Err(invalid(format!(
            "no {side} pawn in front of en-passant square {target}"
        )));
    }
    position.unpassant_at(pawn_at);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::moves::king_moves::castling_rook;

    #[test]
    fn parse_starting_fen() {
        let session = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");
        assert_eq!(session.side_to_move(), Side::White);
        assert_eq!(session.fullmove_number(), 1);
        assert_eq!(session.position().halfmove_clock(), 0);
        assert_eq!(session.position(), &Position::standard());
        assert_eq!(session.fen(), STARTING_POSITION_FEN);
    }

    #[test]
    fn missing_or_extra_kings_are_rejected() {
        assert!(matches!(
            parse_position("8/8/8/8/8/8/8/4K3", "-", "-", "0"),
            Err(ChessErrors::InvalidFen(_))
        ));
        assert!(parse_position("4k3/8/8/8/8/8/8/3KK3", "-", "-", "0").is_err());
    }

    #[test]
    fn malformed_layouts_are_rejected() {
        for bad in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRR",
            "rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "Pnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
        ] {
            assert!(parse_position(bad, "-", "-", "0").is_err(), "{bad} should fail");
        }
        assert!(parse_fen("8/8/8/8/8/8/8/8 x - -").is_err());
    }

    #[test]
    fn castling_field_controls_rook_flags() {
        let position = parse_position("r3k2r/8/8/8/8/8/8/R3K2R", "Kq", "-", "0").expect("valid");
        assert!(castling_rook(&position, Side::White, true).is_some());
        assert!(castling_rook(&position, Side::White, false).is_none());
        assert!(castling_rook(&position, Side::Black, true).is_none());
        assert!(castling_rook(&position, Side::Black, false).is_some());
        assert_eq!(position.castling_fen(), "Kq");
    }

    #[test]
    fn file_letter_castling_rights() {
        let position = parse_position("1r2k1r1/8/8/8/8/8/8/1R2K1R1", "GBgb", "-", "0").expect("valid");
        assert_eq!(position.castling_fen(), "KQkq");
    }

    #[test]
    fn en_passant_field_flags_the_double_stepped_pawn() {
        let position =
            parse_position("4k3/8/8/8/3pP3/8/8/4K3", "-", "e3", "0").expect("valid");
        assert_eq!(position.en_passant_target(), Some(Coordinate::new(4, 2)));
        assert!(position.get(Coordinate::new(4, 3)).expect("pawn").en_passant);

        assert!(parse_position("4k3/8/8/8/8/8/8/4K3", "-", "e3", "0").is_err());
        assert!(parse_position("4k3/8/8/8/4P3/8/8/4K3", "-", "e4", "0").is_err());
    }

    #[test]
    fn pawns_off_their_start_rank_count_as_moved() {
        let position = parse_position("4k3/8/8/8/4P3/8/3P4/4K3", "-", "-", "0").expect("valid");
        assert!(position.get(Coordinate::new(4, 3)).expect("pawn").moved);
        assert!(!position.get(Coordinate::new(3, 1)).expect("pawn").moved);
    }
}

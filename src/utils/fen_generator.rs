use crate::game_state::chess_types::{Coordinate, Side};
use crate::game_state::game_session::GameSession;
use crate::game_state::position::Position;

/// All six FEN fields of a session.
pub fn generate_fen(session: &GameSession) -> String {
    let position = session.position();
    let side_to_move = match session.side_to_move() {
        Side::White => "w",
        Side::Black => "b",
    };
    let en_passant = position
        .en_passant_target()
        .map(|at| at.to_string())
        .unwrap_or_else(|| "-".to_owned());

    format!(
        "{} {} {} {} {} {}",
        generate_placement(position),
        side_to_move,
        position.castling_fen(),
        en_passant,
        position.halfmove_clock(),
        session.fullmove_number()
    )
}

/// Placement field: ranks 8 down to 1, runs of empty squares as digits.
pub fn generate_placement(position: &Position) -> String {
    let mut out = String::with_capacity(72);

    for rank in (0..8u8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8u8 {
            match position.get(Coordinate::new(file, rank)) {
                Some(piece) => {
                    if empty_count > 0 {
                        out.push(char::from(b'0' + empty_count));
                        empty_count = 0;
                    }
                    out.push(piece.fen_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if rank > 0 {
            out.push('/');
        }
    }

    out
}

//! Terminal-oriented Unicode board renderer for debugging and the UCI `d`
//! command.

use crate::game_state::chess_types::{Coordinate, Piece, PieceKind, Side};
use crate::game_state::game_session::GameSession;
use crate::game_state::position::Position;

/// Render the board to a Unicode string, rank 8 at the top.
pub fn render_position(position: &Position) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");

    for rank in (0..8u8).rev() {
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for file in 0..8u8 {
            match position.get(Coordinate::new(file, rank)) {
                Some(piece) => out.push(piece_to_unicode(piece)),
                None => out.push('·'),
            }

            if file < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + rank));
        out.push('\n');
    }

    out.push_str("  a b c d e f g h");

    out
}

/// Board plus FEN, side to move and any check.
pub fn render_session(session: &GameSession) -> String {
    let mut out = render_position(session.position());
    out.push_str(&format!("\nFen: {}", session.fen()));
    out.push_str(&format!("\nSide to move: {}", session.side_to_move()));
    if session.position().in_check(session.side_to_move()) {
        out.push_str(" (in check)");
    }
    out
}

fn piece_to_unicode(piece: Piece) -> char {
    match (piece.side, piece.kind) {
        (Side::White, PieceKind::Pawn) => '♙',
        (Side::White, PieceKind::Knight) => '♘',
        (Side::White, PieceKind::Bishop) => '♗',
        (Side::White, PieceKind::Rook) => '♖',
        (Side::White, PieceKind::Queen) => '♕',
        (Side::White, PieceKind::King) => '♔',
        (Side::Black, PieceKind::Pawn) => '♟',
        (Side::Black, PieceKind::Knight) => '♞',
        (Side::Black, PieceKind::Bishop) => '♝',
        (Side::Black, PieceKind::Rook) => '♜',
        (Side::Black, PieceKind::Queen) => '♛',
        (Side::Black, PieceKind::King) => '♚',
    }
}

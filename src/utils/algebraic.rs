//! Square conversions for algebraic coordinates (`e4`).

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_types::Coordinate;

/// Convert algebraic notation (for example: "e4") to a coordinate.
#[inline]
pub fn algebraic_to_coordinate(square: &str) -> ChessResult<Coordinate> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessErrors::InvalidAlgebraic(format!(
            "expected a two-character square, got '{square}'"
        )));
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) {
        return Err(ChessErrors::InvalidAlgebraic(format!(
            "invalid file '{}'",
            file as char
        )));
    }
    if !(b'1'..=b'8').contains(&rank) {
        return Err(ChessErrors::InvalidAlgebraic(format!(
            "invalid rank '{}'",
            rank as char
        )));
    }

    Ok(Coordinate::new(file - b'a', rank - b'1'))
}

/// Convert a coordinate to algebraic notation (for example: "e4").
#[inline]
pub fn coordinate_to_algebraic(at: Coordinate) -> String {
    at.to_string()
}

#[cfg(test)]
mod tests {
    use super::{algebraic_to_coordinate, coordinate_to_algebraic};
    use crate::chess_errors::ChessErrors;
    use crate::game_state::chess_types::Coordinate;

    #[test]
    fn corner_squares_convert_both_ways() {
        assert_eq!(
            algebraic_to_coordinate("a1").expect("a1 should parse"),
            Coordinate::new(0, 0)
        );
        assert_eq!(
            algebraic_to_coordinate("h8").expect("h8 should parse"),
            Coordinate::new(7, 7)
        );
        assert_eq!(coordinate_to_algebraic(Coordinate::new(4, 3)), "e4");
    }

    #[test]
    fn malformed_squares_are_rejected() {
        for bad in ["", "e", "i1", "a9", "e44", "E4"] {
            assert!(
                matches!(algebraic_to_coordinate(bad), Err(ChessErrors::InvalidAlgebraic(_))),
                "{bad} should not parse"
            );
        }
    }
}

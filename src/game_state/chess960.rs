//! Chess960 starting positions.
//!
//! Positions are numbered 0..960 in the usual Scharnagl scheme, where
//! index 518 is the standard setup. Each index fixes both bishops, the
//! queen, then the knights; the three squares left over take rook, king,
//! rook from the a-file side.

use rand::Rng;

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_types::PieceKind;
use crate::game_state::position::{Position, STANDARD_BACK_RANK};

pub const CHESS960_POSITION_COUNT: u16 = 960;

/// Index of the standard setup.
pub const CHESS960_STANDARD_INDEX: u16 = 518;

/// Knight placements among the five squares left after bishops and queen.
const KNIGHT_SLOTS: [(usize, usize); 10] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (1, 2),
    (1, 3),
    (1, 4),
    (2, 3),
    (2, 4),
    (3, 4),
];

fn place_on_empty(rank: &mut [Option<PieceKind>; 8], nth: usize, kind: PieceKind) {
    if let Some(slot) = rank.iter_mut().filter(|slot| slot.is_none()).nth(nth) {
        *slot = Some(kind);
    }
}

/// White back rank of Chess960 position `index`, a-file first.
pub fn chess960_back_rank(index: u16) -> ChessResult<[PieceKind; 8]> {
    if index >= CHESS960_POSITION_COUNT {
        return Err(ChessErrors::InvalidOption {
            name: "Chess960 index".to_owned(),
            value: index.to_string(),
        });
    }

    let mut rank: [Option<PieceKind>; 8] = [None; 8];
    let mut n = index as usize;

    rank[2 * (n % 4) + 1] = Some(PieceKind::Bishop);
    n /= 4;
    rank[2 * (n % 4)] = Some(PieceKind::Bishop);
    n /= 4;

    place_on_empty(&mut rank, n % 6, PieceKind::Queen);
    n /= 6;

    // Second knight first so the first one's slot index stays valid.
    let (first, second) = KNIGHT_SLOTS[n];
    place_on_empty(&mut rank, second, PieceKind::Knight);
    place_on_empty(&mut rank, first, PieceKind::Knight);

    for kind in [PieceKind::Rook, PieceKind::King, PieceKind::Rook] {
        place_on_empty(&mut rank, 0, kind);
    }

    let mut out = [PieceKind::Pawn; 8];
    for (slot, kind) in out.iter_mut().zip(rank) {
        *slot = kind.ok_or_else(|| ChessErrors::InvalidOption {
            name: "Chess960 index".to_owned(),
            value: index.to_string(),
        })?;
    }
    Ok(out)
}

pub fn chess960_position_from_index(index: u16) -> ChessResult<Position> {
    Ok(Position::from_back_rank(&chess960_back_rank(index)?))
}

/// A uniformly chosen Chess960 setup and its index.
pub fn chess960_position<R: Rng + ?Sized>(rng: &mut R) -> (u16, Position) {
    let index = rng.random_range(0..CHESS960_POSITION_COUNT);
    let back_rank = chess960_back_rank(index).unwrap_or(STANDARD_BACK_RANK);
    (index, Position::from_back_rank(&back_rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::{Coordinate, Side};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn index_518_is_the_standard_setup() {
        assert_eq!(
            chess960_back_rank(CHESS960_STANDARD_INDEX).expect("valid index"),
            STANDARD_BACK_RANK
        );
        assert_eq!(
            chess960_position_from_index(CHESS960_STANDARD_INDEX).expect("valid index"),
            Position::standard()
        );
    }

    #[test]
    fn index_zero_matches_the_published_table() {
        use PieceKind::*;
        assert_eq!(
            chess960_back_rank(0).expect("valid index"),
            [Bishop, Bishop, Queen, Knight, Knight, Rook, King, Rook]
        );
    }

    #[test]
    fn every_index_obeys_the_setup_rules() {
        let mut seen = std::collections::HashSet::new();
        for index in 0..CHESS960_POSITION_COUNT {
            let rank = chess960_back_rank(index).expect("valid index");
            let files_of = |kind: PieceKind| -> Vec<u8> {
                (0..8u8).filter(|&f| rank[f as usize] == kind).collect()
            };

            let bishops = files_of(PieceKind::Bishop);
            assert_eq!(bishops.len(), 2);
            assert_ne!(
                Coordinate::new(bishops[0], 0).is_light(),
                Coordinate::new(bishops[1], 0).is_light(),
                "bishops share a colour in position {index}"
            );

            let rooks = files_of(PieceKind::Rook);
            let king = files_of(PieceKind::King);
            assert_eq!(rooks.len(), 2);
            assert_eq!(king.len(), 1);
            assert!(rooks[0] < king[0] && king[0] < rooks[1]);
            assert_eq!(files_of(PieceKind::Knight).len(), 2);
            assert_eq!(files_of(PieceKind::Queen).len(), 1);

            seen.insert(rank);
        }
        assert_eq!(seen.len(), CHESS960_POSITION_COUNT as usize);
        assert!(chess960_back_rank(CHESS960_POSITION_COUNT).is_err());
    }

    #[test]
    fn seeded_choice_is_deterministic() {
        let mut a = StdRng::seed_from_u64(960);
        let mut b = StdRng::seed_from_u64(960);
        let (index_a, position_a) = chess960_position(&mut a);
        let (index_b, position_b) = chess960_position(&mut b);
        assert_eq!(index_a, index_b);
        assert_eq!(position_a, position_b);
        assert!(position_a.king_square(Side::White).is_some());
        assert_eq!(position_a.all_actions(Side::White).len(), position_b.all_actions(Side::White).len());
    }
}

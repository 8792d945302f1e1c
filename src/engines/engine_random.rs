//! Skill-level-1 random-move engine.
//!
//! Selects uniformly from legal moves; used for diagnostics, integration
//! testing and the weakest play level. Seedable for reproducible games.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::game_state::chess_types::Side;
use crate::game_state::position::Position;

pub struct RandomEngine {
    rng: StdRng,
}

impl RandomEngine {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for RandomEngine {
    fn name(&self) -> &str {
        "random"
    }

    fn set_option(&mut self, name: &str, value: &str) -> ChessResult<()> {
        if name.eq_ignore_ascii_case("Seed") {
            let seed = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ChessErrors::InvalidOption {
                    name: name.to_owned(),
                    value: value.to_owned(),
                })?;
            self.rng = StdRng::seed_from_u64(seed);
        }
        Ok(())
    }

    fn choose_move(
        &mut self,
        position: &Position,
        side: Side,
        params: &GoParams,
    ) -> ChessResult<EngineOutput> {
        let legal_moves = position.all_actions(side);

        let mut out = EngineOutput::default();
        out.info_lines.push(format!(
            "info string random_engine legal_moves {}",
            legal_moves.len()
        ));
        if let Some(depth) = params.depth {
            out.info_lines
                .push(format!("info string random_engine requested_depth {depth}"));
        }

        out.best_move = legal_moves.as_slice().choose(&mut self.rng).copied();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Coordinate;

    #[test]
    fn seeded_engines_agree() {
        let position = Position::standard();
        let mut a = RandomEngine::with_seed(42);
        let mut b = RandomEngine::new();
        b.set_option("Seed", "42").expect("numeric seed");
        for _ in 0..5 {
            let left = a
                .choose_move(&position, Side::White, &GoParams::default())
                .expect("choose");
            let right = b
                .choose_move(&position, Side::White, &GoParams::default())
                .expect("choose");
            assert_eq!(left.best_move, right.best_move);
            assert!(left.best_move.is_some());
        }
    }

    #[test]
    fn checkmated_side_gets_no_move() {
        let mut position = Position::standard();
        for (from, to) in [((5, 1), (5, 2)), ((4, 6), (4, 4)), ((6, 1), (6, 3)), ((3, 7), (7, 3))] {
            position = position
                .make_move(Coordinate::new(from.0, from.1), Coordinate::new(to.0, to.1))
                .expect("legal move");
        }
        let out = RandomEngine::with_seed(1)
            .choose_move(&position, Side::White, &GoParams::default())
            .expect("choose");
        assert!(out.best_move.is_none());
    }

    #[test]
    fn bad_seed_is_rejected() {
        let mut engine = RandomEngine::with_seed(0);
        assert!(engine.set_option("Seed", "abc").is_err());
    }
}

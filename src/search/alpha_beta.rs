//! Fixed-depth alpha-beta search over the legal move tree.
//!
//! Scores are absolute: White wants them high, Black wants them low, no
//! matter whose turn produced the position. Checkmate scores are the
//! `WHITE_WINS_SCORE` / `BLACK_WINS_SCORE` sentinels with no distance
//! adjustment, so among several mates the first one generated wins.

use std::time::{Duration, Instant};

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_rules::DEFAULT_SEARCH_DEPTH;
use crate::game_state::chess_types::Side;
use crate::game_state::position::Position;
use crate::moves::actions::Action;
use crate::search::value_cache::{Bound, CachePolicy, CacheStats, ValueCache};

/// Largest depth the engines accept.
pub const MAX_SEARCH_DEPTH: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies searched below the root, at least 1.
    pub depth: u8,
    pub cache_policy: CachePolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_SEARCH_DEPTH,
            cache_policy: CachePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaf_evaluations: u64,
    pub cutoffs: u64,
    pub cache: CacheStats,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_action: Action,
    pub score: i32,
    pub depth: u8,
    pub stats: SearchStats,
}

#[derive(Debug, Clone)]
pub struct AlphaBetaSearch {
    config: SearchConfig,
    cache: ValueCache,
    stats: SearchStats,
}

impl AlphaBetaSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            cache: ValueCache::new(config.cache_policy),
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
        self.cache = ValueCache::new(config.cache_policy);
    }

    /// Counters of the most recent search.
    #[inline]
    pub fn stats(&self) -> SearchStats {
        let mut stats = self.stats;
        stats.cache = self.cache.stats();
        stats
    }

    /// Value of `position` searched `depth` plies deep with `side_to_move`
    /// on turn. Values outside `(alpha, beta)` are bounds, as usual for a
    /// fail-soft search.
    pub fn alpha_beta(
        &mut self,
        position: &Position,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        side_to_move: Side,
    ) -> i32 {
        self.stats.nodes += 1;
        if let Some(value) = self.cache.probe(position, depth, alpha, beta) {
            return value;
        }

        let actions = position.all_actions(side_to_move);
        let has_actions = !actions.is_empty();
        if depth == 0 || position.termination_with(side_to_move, has_actions).is_some() {
            let value = position.evaluate_with(side_to_move, has_actions);
            self.stats.leaf_evaluations += 1;
            self.cache.store(position, depth, value, Bound::Exact);
            return value;
        }

        let (alpha_in, beta_in) = (alpha, beta);
        let maximizing = side_to_move == Side::White;
        let mut best = if maximizing { i32::MIN } else { i32::MAX };

        for action in actions {
            let child = action.apply_unflagged(position);
            let value = self.alpha_beta(&child, depth - 1, alpha, beta, side_to_move.opponent());
            if maximizing {
                best = best.max(value);
                alpha = alpha.max(best);
                if best >= beta {
                    self.stats.cutoffs += 1;
                    break;
                }
            } else {
                best = best.min(value);
                beta = beta.min(best);
                if best <= alpha {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
        }

        let bound = if best <= alpha_in {
            Bound::Upper
        } else if best >= beta_in {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.cache.store(position, depth, best, bound);
        best
    }

    /// Best action for `side`: every root action is scored by a full-window
    /// search `depth - 1` plies deep, so `depth` counts the root move itself.
    /// A configured depth of 4 therefore looks 4 plies ahead, one fewer than
    /// a search that runs the full depth below each root move. Ties keep the
    /// earliest action.
    pub fn pick_move(&mut self, position: &Position, side: Side) -> ChessResult<SearchResult> {
        let started = Instant::now();
        let depth = self.config.depth.clamp(1, MAX_SEARCH_DEPTH);
        self.cache = ValueCache::new(self.config.cache_policy);
        self.stats = SearchStats::default();

        let actions = position.all_actions(side);
        let mut best: Option<(Action, i32)> = None;
        for action in actions {
            let child = action.apply(position);
            let value = self.alpha_beta(&child, depth - 1, i32::MIN, i32::MAX, side.opponent());
            let improves = match best {
                None => true,
                Some((_, best_value)) => match side {
                    Side::White => value > best_value,
                    Side::Black => value < best_value,
                },
            };
            if improves {
                best = Some((action, value));
            }
        }

        self.stats.elapsed = started.elapsed();
        let (best_action, score) = best.ok_or(ChessErrors::NoLegalMoves)?;
        Ok(SearchResult {
            best_action,
            score,
            depth,
            stats: self.stats(),
        })
    }
}

impl Default for AlphaBetaSearch {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::{BLACK_WINS_SCORE, WHITE_WINS_SCORE};
    use crate::utils::fen_parser::parse_fen;

    fn root(fen: &str) -> (Position, Side) {
        let session = parse_fen(fen).expect("test FEN should parse");
        (session.position().clone(), session.side_to_move())
    }

    fn search(depth: u8, cache_policy: CachePolicy) -> AlphaBetaSearch {
        AlphaBetaSearch::new(SearchConfig {
            depth,
            cache_policy,
        })
    }

    /// Plain minimax with the same leaf scoring and no pruning or cache.
    fn minimax(position: &Position, depth: u8, side: Side) -> i32 {
        let actions = position.all_actions(side);
        let has_actions = !actions.is_empty();
        if depth == 0 || position.termination_with(side, has_actions).is_some() {
            return position.evaluate_with(side, has_actions);
        }
        let values = actions
            .iter()
            .map(|action| minimax(&action.apply(position), depth - 1, side.opponent()));
        match side {
            Side::White => values.max().expect("at least one action"),
            Side::Black => values.min().expect("at least one action"),
        }
    }

    #[test]
    fn finds_back_rank_mate_for_white() {
        let (position, side) = root("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        for depth in [1, 3] {
            let result = search(depth, CachePolicy::DepthAware)
                .pick_move(&position, side)
                .expect("white has moves");
            assert_eq!(result.best_action.to_long_algebraic(), "a1a8");
            assert_eq!(result.score, WHITE_WINS_SCORE);
        }
    }

    #[test]
    fn finds_back_rank_mate_for_black() {
        let (position, side) = root("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1");
        let result = search(2, CachePolicy::DepthAware)
            .pick_move(&position, side)
            .expect("black has moves");
        assert_eq!(result.best_action.to_long_algebraic(), "a8a1");
        assert_eq!(result.score, BLACK_WINS_SCORE);
    }

    #[test]
    fn takes_a_hanging_queen() {
        let (position, side) = root("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
        let result = search(2, CachePolicy::DepthAware)
            .pick_move(&position, side)
            .expect("white has moves");
        assert_eq!(result.best_action.to_long_algebraic(), "d2d5");
    }

    #[test]
    fn no_legal_moves_is_an_error() {
        let (position, side) =
            root("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(
            search(2, CachePolicy::DepthAware).pick_move(&position, side).err(),
            Some(ChessErrors::NoLegalMoves)
        );
    }

    #[test]
    fn pruned_search_agrees_with_minimax() {
        let cases = [
            "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1",
            "8/8/8/4k3/8/8/3QK3/8 b - - 0 1",
            "r3k3/8/8/8/8/8/8/4K2R w K - 0 1",
            "4k3/8/8/3q4/8/2N5/3R4/4K3 w - - 0 1",
        ];
        for fen in cases {
            let (position, side) = root(fen);
            for depth in 1..=3u8 {
                let expected = minimax(&position, depth, side);
                for policy in [CachePolicy::Disabled, CachePolicy::DepthAware] {
                    let mut searcher = search(depth, policy);
                    let value = searcher.alpha_beta(&position, depth, i32::MIN, i32::MAX, side);
                    assert_eq!(value, expected, "{fen} depth {depth} {policy:?}");
                }
            }
        }
    }

    #[test]
    fn pick_move_score_matches_minimax_of_chosen_child() {
        let (position, side) = root("4k3/8/8/3q4/8/2N5/3R4/4K3 w - - 0 1");
        let result = search(3, CachePolicy::DepthAware)
            .pick_move(&position, side)
            .expect("white has moves");
        let child = result.best_action.apply(&position);
        assert_eq!(result.score, minimax(&child, 2, side.opponent()));
        assert_eq!(result.score, minimax(&position, 3, side));
    }

    #[test]
    fn depth_aware_cache_hits_on_transpositions() {
        let position = Position::standard();
        let mut searcher = search(3, CachePolicy::DepthAware);
        let result = searcher.pick_move(&position, Side::White).expect("moves");
        assert!(result.stats.cache.hits > 0);
        assert!(result.stats.nodes > 0);
        assert!(result.stats.cutoffs > 0);

        let mut uncached = search(3, CachePolicy::Disabled);
        let plain = uncached.pick_move(&position, Side::White).expect("moves");
        assert_eq!(plain.stats.cache, CacheStats::default());
        assert_eq!(plain.score, result.score);
        assert_eq!(plain.best_action, result.best_action);
    }

    #[test]
    fn position_only_cache_still_returns_a_legal_move() {
        let position = Position::standard();
        let result = search(3, CachePolicy::PositionOnly)
            .pick_move(&position, Side::White)
            .expect("moves");
        assert!(position.all_actions(Side::White).contains(&result.best_action));
    }
}

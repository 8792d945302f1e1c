//! Alpha-beta engine: fixed-depth search with a per-move value cache.

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::game_state::chess_types::Side;
use crate::game_state::position::Position;
use crate::search::alpha_beta::{AlphaBetaSearch, SearchConfig, MAX_SEARCH_DEPTH};
use crate::search::value_cache::CachePolicy;

pub struct AlphaBetaEngine {
    search: AlphaBetaSearch,
}

impl AlphaBetaEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            search: AlphaBetaSearch::new(config),
        }
    }

    pub fn with_depth(depth: u8) -> Self {
        Self::new(SearchConfig {
            depth,
            ..SearchConfig::default()
        })
    }

    pub fn config(&self) -> SearchConfig {
        self.search.config()
    }
}

impl Default for AlphaBetaEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

fn invalid_option(name: &str, value: &str) -> ChessErrors {
    ChessErrors::InvalidOption {
        name: name.to_owned(),
        value: value.to_owned(),
    }
}

impl Engine for AlphaBetaEngine {
    fn name(&self) -> &str {
        "alpha_beta"
    }

    fn set_option(&mut self, name: &str, value: &str) -> ChessResult<()> {
        let mut config = self.search.config();
        if name.eq_ignore_ascii_case("Depth") {
            let depth = value
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|depth| (1..=MAX_SEARCH_DEPTH).contains(depth))
                .ok_or_else(|| invalid_option(name, value))?;
            config.depth = depth;
        } else if name.eq_ignore_ascii_case("CachePolicy") {
            config.cache_policy =
                CachePolicy::from_option(value).ok_or_else(|| invalid_option(name, value))?;
        } else {
            return Ok(());
        }
        self.search.set_config(config);
        Ok(())
    }

    fn choose_move(
        &mut self,
        position: &Position,
        side: Side,
        params: &GoParams,
    ) -> ChessResult<EngineOutput> {
        let configured = self.search.config();
        if let Some(depth) = params.depth {
            self.search.set_config(SearchConfig {
                depth: depth.clamp(1, MAX_SEARCH_DEPTH),
                ..configured
            });
        }
        let picked = self.search.pick_move(position, side);
        self.search.set_config(configured);

        let mut out = EngineOutput::default();
        let result = match picked {
            Ok(result) => result,
            Err(ChessErrors::NoLegalMoves) => {
                out.info_lines
                    .push("info string alpha_beta no legal moves".to_owned());
                return Ok(out);
            }
            Err(err) => return Err(err),
        };

        let stats = result.stats;
        out.info_lines.push(format!(
            "info depth {} score cp {} nodes {} time {}",
            result.depth,
            result.score,
            stats.nodes,
            stats.elapsed.as_millis()
        ));
        out.info_lines.push(format!(
            "info string alpha_beta cache {} probes {} hits {} stores {} cutoffs {} leaves {}",
            configured.cache_policy.as_option(),
            stats.cache.probes,
            stats.cache.hits,
            stats.cache.stores,
            stats.cutoffs,
            stats.leaf_evaluations
        ));
        out.best_move = Some(result.best_action);
        out.score = Some(result.score);
        Ok(out)
    }
}

//! Per-search value cache keyed by position placement.
//!
//! Three policies are available. `PositionOnly` keys on the placement
//! alone and trusts whatever value was stored first, even one computed
//! at a shallower depth or under a narrower window. `DepthAware` keys on
//! (placement, remaining depth) and records whether the value is exact or
//! only a bound. The key ignores castling rights and en-passant flags, so
//! the search returns the same value with or without the cache only when
//! transposed positions also share those rights.

use std::collections::HashMap;

use crate::game_state::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    Disabled,
    PositionOnly,
    #[default]
    DepthAware,
}

impl CachePolicy {
    /// Parses the engine option spelling: `disabled`, `position` or `depth`.
    pub fn from_option(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" | "none" => Some(CachePolicy::Disabled),
            "position" | "position_only" => Some(CachePolicy::PositionOnly),
            "depth" | "depth_aware" => Some(CachePolicy::DepthAware),
            _ => None,
        }
    }

    pub fn as_option(&self) -> &'static str {
        match self {
            CachePolicy::Disabled => "disabled",
            CachePolicy::PositionOnly => "position",
            CachePolicy::DepthAware => "depth",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub value: i32,
    pub bound: Bound,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

#[derive(Debug, Clone)]
pub struct ValueCache {
    policy: CachePolicy,
    entries: HashMap<(Position, u8), CacheEntry>,
    stats: CacheStats,
}

impl ValueCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    #[inline]
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }

    fn key_depth(&self, depth: u8) -> u8 {
        match self.policy {
            CachePolicy::DepthAware => depth,
            _ => 0,
        }
    }

    /// A value usable in place of searching `position` at `depth` inside
    /// the window `(alpha, beta)`, if one is stored.
    pub fn probe(&mut self, position: &Position, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        if self.policy == CachePolicy::Disabled {
            return None;
        }
        self.stats.probes += 1;
        let key = (position.clone(), self.key_depth(depth));
        let entry = *self.entries.get(&key)?;
        let usable = match (self.policy, entry.bound) {
            (CachePolicy::PositionOnly, _) => true,
            (_, Bound::Exact) => true,
            (_, Bound::Lower) => entry.value >= beta,
            (_, Bound::Upper) => entry.value <= alpha,
        };
        if usable {
            self.stats.hits += 1;
            Some(entry.value)
        } else {
            None
        }
    }

    pub fn store(&mut self, position: &Position, depth: u8, value: i32, bound: Bound) {
        if self.policy == CachePolicy::Disabled {
            return;
        }
        self.stats.stores += 1;
        let bound = match self.policy {
            CachePolicy::PositionOnly => Bound::Exact,
            _ => bound,
        };
        let key = (position.clone(), self.key_depth(depth));
        self.entries.insert(key, CacheEntry { value, bound });
    }
}

//! Player progress as a plain value.
//!
//! The host loads and stores [`ProgressRecord`] however it likes; these
//! helpers only compute the next record.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::rng::splitmix64;

/// Best result recorded for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPerformance {
    pub moves_used: u32,
    pub score: u32,
    pub stars: u8,
}

impl LevelPerformance {
    /// Higher stars win, then fewer moves, then higher score.
    fn beats(&self, other: &LevelPerformance) -> bool {
        (self.stars, std::cmp::Reverse(self.moves_used), self.score)
            > (other.stars, std::cmp::Reverse(other.moves_used), other.score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressRecord {
    /// Root seed every level seed is derived from.
    pub campaign_seed: u64,
    pub highest_unlocked_level: u32,
    pub current_level: u32,
    pub current_seed: u64,
    pub current_score: u32,
    pub high_score: u32,
    pub star_balance: u32,
    pub completed_levels: BTreeSet<u32>,
    pub best_performance: BTreeMap<u32, LevelPerformance>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            campaign_seed: 0,
            highest_unlocked_level: 1,
            current_level: 1,
            current_seed: seed_for_level(0, 1),
            current_score: 0,
            high_score: 0,
            star_balance: 0,
            completed_levels: BTreeSet::new(),
            best_performance: BTreeMap::new(),
        }
    }
}

/// Deterministic level seed derived from a campaign seed.
pub fn seed_for_level(campaign_seed: u64, level: u32) -> u64 {
    splitmix64(campaign_seed ^ u64::from(level).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

impl ProgressRecord {
    /// Record after clearing `level`: unlocks the next level, moves on to it,
    /// adds `score` and `stars`, and keeps the best performance.
    #[must_use]
    pub fn with_completion(&self, level: u32, moves_used: u32, score: u32, stars: u8) -> Self {
        let mut next = self.clone();
        let performance = LevelPerformance {
            moves_used,
            score,
            stars,
        };
        next.completed_levels.insert(level);
        next.highest_unlocked_level = next.highest_unlocked_level.max(level.saturating_add(1));
        next.current_level = level.saturating_add(1);
        next.current_seed = seed_for_level(next.campaign_seed, next.current_level);
        next.current_score = next.current_score.saturating_add(score);
        next.high_score = next.high_score.max(next.current_score);
        next.star_balance = next.star_balance.saturating_add(u32::from(stars));
        let improved = next
            .best_performance
            .get(&level)
            .is_none_or(|best| performance.beats(best));
        if improved {
            next.best_performance.insert(level, performance);
        }
        next
    }

    /// Record after paying `cost` stars, or `None` if the balance is short.
    #[must_use]
    pub fn with_stars_spent(&self, cost: u32) -> Option<Self> {
        let balance = self.star_balance.checked_sub(cost)?;
        Some(Self {
            star_balance: balance,
            ..self.clone()
        })
    }

    /// Level to open on launch: the saved current level when it is unlocked,
    /// otherwise the highest unlocked one.
    pub fn resume_level(&self) -> u32 {
        if (1..=self.highest_unlocked_level).contains(&self.current_level) {
            self.current_level
        } else {
            self.highest_unlocked_level.max(1)
        }
    }

    pub fn is_completed(&self, level: u32) -> bool {
        self.completed_levels.contains(&level)
    }
}

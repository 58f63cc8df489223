//! Per-level difficulty profiles.

use serde::{Deserialize, Serialize};

/// Number of cosmetic theme buckets levels cycle through.
pub const THEME_COUNT: u32 = 6;

/// Levels per theme bucket.
pub const LEVELS_PER_THEME: u32 = 10;

/// Board shape and calibration for one level index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub level_index: u32,
    /// Total bottles, sinks included.
    pub bottle_count: usize,
    pub capacity: usize,
    pub color_count: usize,
    /// Empty non-sink bottles in the solved reference board.
    pub empty_count: usize,
    pub sink_count: usize,
    /// Reverse moves applied to the solved reference board. Also an upper
    /// bound on the optimal solution length.
    pub scramble_moves: u32,
    /// Accepted optimal-move band, inclusive.
    pub min_optimal: u32,
    pub max_optimal: u32,
    /// Extra moves granted on top of the optimal count.
    pub move_slack: u32,
    /// Scalar fed into scoring and pricing; grows with the level.
    pub difficulty: f64,
    pub theme_bucket: u32,
}

impl DifficultyProfile {
    /// Profile for `level_index`. Level 0 is treated as level 1.
    pub fn for_level(level_index: u32) -> Self {
        let level = level_index.max(1);
        let capacity = if level < 10 { 3 } else { 4 };
        let color_count = (2 + level as usize / 8).min(5);
        let empty_count = 2;
        let sink_count = usize::from(level >= 20);
        let scramble_moves = ((color_count * capacity / 2) as u32).max(3);

        Self {
            level_index: level,
            bottle_count: color_count + empty_count + sink_count,
            capacity,
            color_count,
            empty_count,
            sink_count,
            scramble_moves,
            min_optimal: (color_count as u32).max(2),
            max_optimal: scramble_moves,
            move_slack: 6u32.saturating_sub(level / 10).max(2),
            difficulty: 1.0 + f64::from(level - 1) * 0.05,
            theme_bucket: ((level - 1) / LEVELS_PER_THEME) % THEME_COUNT,
        }
    }

    /// Whether `optimal_moves` falls inside the accepted band.
    pub fn accepts(&self, optimal_moves: u32) -> bool {
        (self.min_optimal..=self.max_optimal).contains(&optimal_moves)
    }

    /// Moves allowed for a level whose optimal solution is `optimal_moves`.
    pub fn moves_allowed(&self, optimal_moves: u32) -> u32 {
        optimal_moves + self.move_slack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_matches_level_one() {
        assert_eq!(DifficultyProfile::for_level(0), DifficultyProfile::for_level(1));
    }

    #[test]
    fn profiles_grow_with_level() {
        let easy = DifficultyProfile::for_level(1);
        let hard = DifficultyProfile::for_level(50);
        assert_eq!(easy.capacity, 3);
        assert_eq!(easy.color_count, 2);
        assert_eq!(easy.sink_count, 0);
        assert_eq!(hard.capacity, 4);
        assert_eq!(hard.sink_count, 1);
        assert!(hard.color_count > easy.color_count);
        assert!(hard.difficulty > easy.difficulty);
        assert!(hard.move_slack <= easy.move_slack);
        assert_eq!(
            hard.bottle_count,
            hard.color_count + hard.empty_count + hard.sink_count
        );
    }

    #[test]
    fn band_is_consistent() {
        for level in 1..=120 {
            let profile = DifficultyProfile::for_level(level);
            assert!(profile.min_optimal >= 1);
            assert!(profile.min_optimal <= profile.max_optimal);
            assert!(profile.accepts(profile.min_optimal));
            assert!(!profile.accepts(profile.max_optimal + 1));
            assert!(profile.theme_bucket < THEME_COUNT);
        }
    }

    #[test]
    fn theme_bucket_changes_every_ten_levels() {
        assert_eq!(DifficultyProfile::for_level(1).theme_bucket, 0);
        assert_eq!(DifficultyProfile::for_level(10).theme_bucket, 0);
        assert_eq!(DifficultyProfile::for_level(11).theme_bucket, 1);
        assert_eq!(DifficultyProfile::for_level(61).theme_bucket, 0);
    }
}

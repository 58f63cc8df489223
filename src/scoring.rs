//! Score awards, attempt bookkeeping and assist pricing.

use serde::{Deserialize, Serialize};

/// Points for an optimal clear at difficulty 1.0.
pub const BASE_POINTS: f64 = 100.0;
/// Efficiency when the last allowed move is used.
pub const MIN_EFFICIENCY_IN_BUDGET: f64 = 0.25;
/// Efficiency once the move budget is exceeded.
pub const OVER_BUDGET_EFFICIENCY: f64 = 0.1;

fn sanitize_difficulty(difficulty: f64) -> f64 {
    if difficulty.is_finite() {
        difficulty.max(0.0)
    } else {
        0.0
    }
}

pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Fraction of the full award earned, in `[0.1, 1.0]`. Non-increasing in
    /// `moves_used`.
    pub fn efficiency(moves_used: u32, optimal_moves: u32, moves_allowed: u32) -> f64 {
        if moves_used <= optimal_moves {
            return 1.0;
        }
        if moves_used > moves_allowed || moves_allowed <= optimal_moves {
            return OVER_BUDGET_EFFICIENCY;
        }
        let over = f64::from(moves_used - optimal_moves);
        let span = f64::from(moves_allowed - optimal_moves);
        1.0 - (1.0 - MIN_EFFICIENCY_IN_BUDGET) * over / span
    }

    /// Points for clearing a level. Maximal at `moves_used == optimal_moves`
    /// and non-decreasing in `difficulty`.
    pub fn award(moves_used: u32, optimal_moves: u32, moves_allowed: u32, difficulty: f64) -> u32 {
        let efficiency = Self::efficiency(moves_used, optimal_moves, moves_allowed);
        (BASE_POINTS * sanitize_difficulty(difficulty) * efficiency).round() as u32
    }

    /// 3 stars for an optimal clear, 2 within budget, 1 otherwise.
    pub fn stars(moves_used: u32, optimal_moves: u32, moves_allowed: u32) -> u8 {
        if moves_used <= optimal_moves {
            3
        } else if moves_used <= moves_allowed {
            2
        } else {
            1
        }
    }
}

/// Running total plus the score of the attempt in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSession {
    total: u32,
    provisional: u32,
    in_attempt: bool,
}

impl ScoreSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn provisional(&self) -> u32 {
        self.provisional
    }

    pub fn in_attempt(&self) -> bool {
        self.in_attempt
    }

    /// Score to show while playing.
    pub fn displayed(&self) -> u32 {
        self.total.saturating_add(self.provisional)
    }

    pub fn begin_attempt(&mut self, baseline: u32) {
        self.total = baseline;
        self.provisional = 0;
        self.in_attempt = true;
    }

    /// Recomputes the provisional score. Same inputs, same value.
    pub fn update_provisional(
        &mut self,
        moves_used: u32,
        optimal_moves: u32,
        moves_allowed: u32,
        difficulty: f64,
    ) -> u32 {
        self.provisional =
            ScoreCalculator::award(moves_used, optimal_moves, moves_allowed, difficulty);
        self.provisional
    }

    /// Folds the provisional score into the total and returns the new total.
    pub fn commit_level(&mut self) -> u32 {
        self.total = self.total.saturating_add(self.provisional);
        self.provisional = 0;
        self.in_attempt = false;
        self.total
    }

    pub fn fail_level(&mut self) {
        self.provisional = 0;
        self.in_attempt = false;
    }

    /// Restarts the current attempt; the total is kept.
    pub fn reset_attempt(&mut self) {
        self.provisional = 0;
    }
}

/// Star prices for assists. Every price is non-decreasing in difficulty.
pub struct StarEconomy;

impl StarEconomy {
    pub const AUTO_SOLVE_BASE_COST: u32 = 5;
    pub const CONVERT_BASE_COST: u32 = 2;
    pub const HINT_BASE_COST: u32 = 1;

    fn scaled(base: u32, difficulty: f64, per_step: f64) -> u32 {
        let extra = (sanitize_difficulty(difficulty) - 1.0).max(0.0) * per_step;
        base.saturating_add(extra.ceil() as u32)
    }

    /// Price of letting the solver finish the level.
    pub fn resolve_auto_solve_cost(difficulty: f64) -> u32 {
        Self::scaled(Self::AUTO_SOLVE_BASE_COST, difficulty, 4.0)
    }

    /// Price of converting a bottle into a sink.
    pub fn resolve_convert_cost(difficulty: f64) -> u32 {
        Self::scaled(Self::CONVERT_BASE_COST, difficulty, 2.0)
    }

    /// Price of revealing the next optimal move.
    pub fn resolve_hint_cost(difficulty: f64) -> u32 {
        Self::scaled(Self::HINT_BASE_COST, difficulty, 1.0)
    }

    /// Stars paid out for a clear rated `stars`.
    pub fn stars_for_completion(stars: u8) -> u32 {
        u32::from(stars.min(3))
    }
}

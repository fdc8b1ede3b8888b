//! Engine configuration and policy tables.
//!
//! XP amounts and urgency thresholds are empirically tuned, not load-bearing,
//! so they live here as data with sensible defaults instead of hard-coded
//! branches in the engine.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::achievements::Rarity;

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub xp: XpPolicy,
    pub urgency: UrgencyThresholds,
    pub retry: RetryPolicy,
}

impl EngineConfig {
    /// Defaults with environment overrides, e.g.
    /// `MASTERY_MAX_COMMIT_ATTEMPTS=16`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(attempts) = env_u32("MASTERY_MAX_COMMIT_ATTEMPTS") {
            config.retry.max_commit_attempts = attempts.max(1);
        }
        if let Some(bonus) = env_u64("MASTERY_XP_PER_CORRECT") {
            config.xp.per_correct_bonus = bonus;
        }
        config
    }
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Bounds for the optimistic-concurrency commit loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_commit_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_commit_attempts: 8,
        }
    }
}

/// XP award tables: exam completion tiered by score bucket plus a flat
/// per-correct-answer bonus, achievement awards by rarity, and streak
/// milestone bonuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpPolicy {
    /// `(min score percent, xp)`, checked top-down; must stay sorted by
    /// descending score.
    pub exam_score_tiers: Vec<(u32, u64)>,
    pub per_correct_bonus: u64,
    pub common_award: u64,
    pub rare_award: u64,
    pub epic_award: u64,
    pub legendary_award: u64,
    /// `(streak day, bonus xp)` milestones.
    pub streak_milestones: Vec<(u32, u64)>,
}

impl Default for XpPolicy {
    fn default() -> Self {
        Self {
            exam_score_tiers: vec![(90, 100), (70, 60), (50, 30), (0, 10)],
            per_correct_bonus: 2,
            common_award: 25,
            rare_award: 50,
            epic_award: 100,
            legendary_award: 200,
            streak_milestones: vec![(7, 50), (30, 200), (100, 500)],
        }
    }
}

impl XpPolicy {
    /// XP for a completed exam: score-bucket tier plus the per-correct bonus.
    pub fn exam_award(&self, score_percent: u32, correct_answers: u32) -> u64 {
        let tier = self
            .exam_score_tiers
            .iter()
            .find(|(min_score, _)| score_percent >= *min_score)
            .map(|(_, xp)| *xp)
            .unwrap_or(0);
        tier + self.per_correct_bonus * u64::from(correct_answers)
    }

    pub fn achievement_award(&self, rarity: Rarity) -> u64 {
        match rarity {
            Rarity::Common => self.common_award,
            Rarity::Rare => self.rare_award,
            Rarity::Epic => self.epic_award,
            Rarity::Legendary => self.legendary_award,
        }
    }

    /// Bonus XP when a streak reaches a milestone day, if any.
    pub fn streak_bonus(&self, streak_days: u32) -> Option<u64> {
        self.streak_milestones
            .iter()
            .find(|(day, _)| *day == streak_days)
            .map(|(_, xp)| *xp)
    }
}

/// Review-queue urgency buckets; presentation policy, tunable per product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgencyThresholds {
    pub critical_within_hours: i64,
    pub high_within_hours: i64,
    pub medium_within_hours: i64,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self {
            critical_within_hours: 1,
            high_within_hours: 6,
            medium_within_hours: 24,
        }
    }
}

impl UrgencyThresholds {
    pub fn critical_within(&self) -> Duration {
        Duration::hours(self.critical_within_hours)
    }

    pub fn high_within(&self) -> Duration {
        Duration::hours(self.high_within_hours)
    }

    pub fn medium_within(&self) -> Duration {
        Duration::hours(self.medium_within_hours)
    }
}

//! Achievement unlock conditions.
//!
//! Conditions are tagged variants evaluated against a stats snapshot, not
//! parsed strings: the condition kind and target travel as structured data
//! (`{"kind": "exam_count", "target": 10}`) and new kinds are added by
//! extending the enum. Unlock bookkeeping (has this user already earned it)
//! stays with the caller, which checks before awarding XP.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Total exams completed.
    ExamCount,
    /// Best exam score, percent.
    ScorePercent,
    /// Current consecutive-day streak.
    StreakDays,
    /// Learner level reached.
    Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementCondition {
    pub kind: ConditionKind,
    pub target: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Snapshot of the numbers conditions are judged against; assembled by the
/// caller from engine state plus its own exam records.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerStats {
    pub exams_completed: u32,
    pub best_score_percent: u32,
    pub streak_days: u32,
    pub level: u32,
}

impl AchievementCondition {
    pub fn is_satisfied(&self, stats: &LearnerStats) -> bool {
        self.current_value(stats) >= self.target
    }

    /// Fraction of the way to the target, clamped to [0, 1]; 1.0 for a
    /// zero target.
    pub fn progress(&self, stats: &LearnerStats) -> f64 {
        if self.target == 0 {
            return 1.0;
        }
        (f64::from(self.current_value(stats)) / f64::from(self.target)).min(1.0)
    }

    fn current_value(&self, stats: &LearnerStats) -> u32 {
        match self.kind {
            ConditionKind::ExamCount => stats.exams_completed,
            ConditionKind::ScorePercent => stats.best_score_percent,
            ConditionKind::StreakDays => stats.streak_days,
            ConditionKind::Level => stats.level,
        }
    }
}

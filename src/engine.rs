//! Progression coordinator: the one component that mutates a user's
//! XP/level/streak state.
//!
//! Award calls arrive from many independent flows (exam submission, challenge
//! completion, flashcard rating, mission completion, achievement unlock) and
//! may race on the same user. Every mutation runs as a snapshot -> compute ->
//! compare-and-swap commit loop against the store, bounded by the retry
//! policy, so concurrent awards both land and a failed award applies nothing.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::ledger::{XpLedgerEntry, XpSource};
use crate::level::{level_for_xp, progress_for_xp, LevelProgress};
use crate::scheduler::{self, ReviewOutcome, ReviewState, Urgency};
use crate::store::{LearnerProfile, MemoryStore};
use crate::streak;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardResult {
    pub new_total_xp: u64,
    pub leveled_up: bool,
    pub new_level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakResult {
    pub streak_days: u32,
    /// Milestone bonus XP earned by this extension, if any. The caller feeds
    /// it back through [`ProgressionEngine::award_xp`] with
    /// [`XpSource::Streak`] once per milestone.
    pub milestone_bonus: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueItem {
    pub item_id: String,
    pub urgency: Urgency,
    pub next_review_at: DateTime<Utc>,
}

pub struct ProgressionEngine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    store: Arc<MemoryStore>,
}

impl ProgressionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }

    /// Called at account creation; idempotent.
    pub async fn create_learner(&self, user_id: &str) -> LearnerProfile {
        self.store.create_profile(user_id).await
    }

    /// Awards XP and appends the matching ledger entry atomically. No
    /// deduplication by `source_id`: independent events are independent
    /// awards, and "already granted" guards (e.g. an achievement that is
    /// already unlocked) belong to the caller.
    pub async fn award_xp(
        &self,
        user_id: &str,
        amount: u64,
        source: XpSource,
        source_id: &str,
        description: &str,
    ) -> EngineResult<AwardResult> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount);
        }

        let attempts = self.config.retry.max_commit_attempts;
        for attempt in 1..=attempts {
            let snapshot = self
                .store
                .snapshot(user_id)
                .await
                .ok_or_else(|| EngineError::UnknownUser(user_id.to_string()))?;

            let level_before = snapshot.profile.level;
            let new_total = snapshot.profile.cumulative_xp + amount;
            let level_after = level_for_xp(new_total);

            let mut profile = snapshot.profile.clone();
            profile.cumulative_xp = new_total;
            profile.level = level_after;

            let entry = XpLedgerEntry {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                amount,
                source,
                source_id: source_id.to_string(),
                description: description.to_string(),
                level_before,
                level_after,
                timestamp: self.clock.now(),
            };

            if self
                .store
                .commit_profile(snapshot.version, profile, Some(entry))
                .await
            {
                let leveled_up = level_after > level_before;
                if leveled_up {
                    tracing::info!(user_id, level_after, "learner leveled up");
                }
                tracing::debug!(user_id, amount, ?source, new_total, "xp awarded");
                return Ok(AwardResult {
                    new_total_xp: new_total,
                    leveled_up,
                    new_level: level_after,
                });
            }
            tracing::debug!(user_id, attempt, "award commit conflicted, retrying");
        }

        Err(EngineError::ConcurrentUpdateConflict { attempts })
    }

    /// Records a day of learning activity; idempotent for repeated calls
    /// with the same calendar date.
    pub async fn record_activity(
        &self,
        user_id: &str,
        activity_date: NaiveDate,
    ) -> EngineResult<StreakResult> {
        let attempts = self.config.retry.max_commit_attempts;
        for attempt in 1..=attempts {
            let snapshot = self
                .store
                .snapshot(user_id)
                .await
                .ok_or_else(|| EngineError::UnknownUser(user_id.to_string()))?;

            let update = streak::record_activity(
                snapshot.profile.streak_days,
                snapshot.profile.last_active_date,
                activity_date,
            );

            if !update.extended {
                // Same-day re-entry or backfill: nothing to persist.
                return Ok(StreakResult {
                    streak_days: update.streak_days,
                    milestone_bonus: None,
                });
            }

            let mut profile = snapshot.profile.clone();
            profile.streak_days = update.streak_days;
            profile.last_active_date = Some(update.last_active_date);

            if self
                .store
                .commit_profile(snapshot.version, profile, None)
                .await
            {
                tracing::debug!(user_id, streak_days = update.streak_days, "activity recorded");
                return Ok(StreakResult {
                    streak_days: update.streak_days,
                    milestone_bonus: self.config.xp.streak_bonus(update.streak_days),
                });
            }
            tracing::debug!(user_id, attempt, "activity commit conflicted, retrying");
        }

        Err(EngineError::ConcurrentUpdateConflict { attempts })
    }

    /// Applies one review rating for a (user, item) pair. Rating an unseen
    /// item creates its default state first; this never errors.
    pub async fn schedule_review(
        &self,
        user_id: &str,
        item_id: &str,
        outcome: ReviewOutcome,
    ) -> ReviewState {
        let now = self.clock.now();
        let next = self
            .store
            .upsert_review(user_id, item_id, |current| {
                let base = current.cloned().unwrap_or_else(|| ReviewState::new(now));
                scheduler::rate(&base, outcome, now)
            })
            .await;
        tracing::debug!(
            user_id,
            item_id,
            interval_days = next.interval_days,
            repetitions = next.repetitions,
            "review scheduled"
        );
        next
    }

    /// Current review state for an item the user has seen before.
    pub async fn review_state(&self, user_id: &str, item_id: &str) -> EngineResult<ReviewState> {
        self.store
            .review_state(user_id, item_id)
            .await
            .ok_or_else(|| EngineError::UnknownItem {
                user_id: user_id.to_string(),
                item_id: item_id.to_string(),
            })
    }

    /// Every tracked item for the user with its urgency tier as of `as_of`,
    /// ordered by ascending due time (item id breaks ties, so re-querying
    /// with the same `as_of` reproduces the sequence).
    pub async fn due_items(&self, user_id: &str, as_of: DateTime<Utc>) -> Vec<DueItem> {
        let mut items: Vec<DueItem> = self
            .store
            .review_states_for(user_id)
            .await
            .into_iter()
            .map(|(item_id, state)| DueItem {
                urgency: scheduler::classify_urgency(
                    state.next_review_at,
                    as_of,
                    &self.config.urgency,
                ),
                next_review_at: state.next_review_at,
                item_id,
            })
            .collect();
        items.sort_by(|a, b| {
            a.next_review_at
                .cmp(&b.next_review_at)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        items
    }

    /// Level/XP projection for profile and dashboard display.
    pub async fn get_progress(&self, user_id: &str) -> EngineResult<LevelProgress> {
        let snapshot = self
            .store
            .snapshot(user_id)
            .await
            .ok_or_else(|| EngineError::UnknownUser(user_id.to_string()))?;
        Ok(progress_for_xp(snapshot.profile.cumulative_xp))
    }

    /// Append-only audit trail of every award, in acceptance order.
    pub async fn ledger(&self, user_id: &str) -> EngineResult<Vec<XpLedgerEntry>> {
        self.store
            .ledger(user_id)
            .await
            .ok_or_else(|| EngineError::UnknownUser(user_id.to_string()))
    }

    pub async fn profile(&self, user_id: &str) -> EngineResult<LearnerProfile> {
        self.store
            .snapshot(user_id)
            .await
            .map(|snapshot| snapshot.profile)
            .ok_or_else(|| EngineError::UnknownUser(user_id.to_string()))
    }
}

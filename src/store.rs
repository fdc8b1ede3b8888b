//! In-memory persistence for engine state.
//!
//! Carries the minimal state the engine needs: one versioned
//! [`LearnerProfile`] plus its append-only ledger per user, and one
//! [`ReviewState`] per (user, item). Profile commits are compare-and-swap on
//! the record version, and a commit applies the profile update and the ledger
//! append together or not at all; a database adapter would implement the same
//! contract with a `WHERE version = ?` update.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::ledger::XpLedgerEntry;
use crate::scheduler::ReviewState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub user_id: String,
    pub cumulative_xp: u64,
    pub level: u32,
    pub streak_days: u32,
    pub last_active_date: Option<NaiveDate>,
}

impl LearnerProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            cumulative_xp: 0,
            level: 1,
            streak_days: 0,
            last_active_date: None,
        }
    }
}

/// A profile read paired with the version it was read at; commits carry the
/// version back so concurrent writers cannot silently overwrite each other.
#[derive(Debug, Clone)]
pub struct ProfileSnapshot {
    pub profile: LearnerProfile,
    pub version: u64,
}

#[derive(Debug)]
struct UserRecord {
    profile: LearnerProfile,
    version: u64,
    ledger: Vec<XpLedgerEntry>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    reviews: RwLock<HashMap<(String, String), ReviewState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the profile if absent; returns the stored profile either way.
    pub async fn create_profile(&self, user_id: &str) -> LearnerProfile {
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_insert_with(|| UserRecord {
                profile: LearnerProfile::new(user_id),
                version: 0,
                ledger: Vec::new(),
            })
            .profile
            .clone()
    }

    pub async fn snapshot(&self, user_id: &str) -> Option<ProfileSnapshot> {
        let users = self.users.read().await;
        users.get(user_id).map(|record| ProfileSnapshot {
            profile: record.profile.clone(),
            version: record.version,
        })
    }

    /// Commits a profile if its record is still at `expected_version`,
    /// appending `entry` in the same critical section. Returns false on a
    /// version mismatch (concurrent commit won) without applying anything.
    pub async fn commit_profile(
        &self,
        expected_version: u64,
        profile: LearnerProfile,
        entry: Option<XpLedgerEntry>,
    ) -> bool {
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(&profile.user_id) else {
            return false;
        };
        if record.version != expected_version {
            return false;
        }
        record.profile = profile;
        record.version += 1;
        if let Some(entry) = entry {
            record.ledger.push(entry);
        }
        true
    }

    pub async fn ledger(&self, user_id: &str) -> Option<Vec<XpLedgerEntry>> {
        let users = self.users.read().await;
        users.get(user_id).map(|record| record.ledger.clone())
    }

    pub async fn review_state(&self, user_id: &str, item_id: &str) -> Option<ReviewState> {
        let reviews = self.reviews.read().await;
        reviews
            .get(&(user_id.to_string(), item_id.to_string()))
            .cloned()
    }

    /// Atomic read-modify-write for one (user, item) review state; `update`
    /// sees the current state (None for an unseen item) and returns the
    /// replacement.
    pub async fn upsert_review<F>(&self, user_id: &str, item_id: &str, update: F) -> ReviewState
    where
        F: FnOnce(Option<&ReviewState>) -> ReviewState,
    {
        let mut reviews = self.reviews.write().await;
        let key = (user_id.to_string(), item_id.to_string());
        let next = update(reviews.get(&key));
        reviews.insert(key, next.clone());
        next
    }

    /// All tracked review states for a user, in arbitrary order.
    pub async fn review_states_for(&self, user_id: &str) -> Vec<(String, ReviewState)> {
        let reviews = self.reviews.read().await;
        reviews
            .iter()
            .filter(|((uid, _), _)| uid == user_id)
            .map(|((_, item_id), state)| (item_id.clone(), state.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_profile_is_idempotent() {
        let store = MemoryStore::new();
        let first = store.create_profile("u1").await;
        assert_eq!(first.level, 1);
        assert_eq!(first.cumulative_xp, 0);

        // Second create must not reset an existing record.
        let snap = store.snapshot("u1").await.unwrap();
        let mut profile = snap.profile.clone();
        profile.cumulative_xp = 40;
        assert!(store.commit_profile(snap.version, profile, None).await);

        let again = store.create_profile("u1").await;
        assert_eq!(again.cumulative_xp, 40);
    }

    #[tokio::test]
    async fn stale_commit_is_rejected() {
        let store = MemoryStore::new();
        store.create_profile("u1").await;
        let snap = store.snapshot("u1").await.unwrap();

        let mut winner = snap.profile.clone();
        winner.cumulative_xp = 50;
        assert!(store.commit_profile(snap.version, winner, None).await);

        let mut loser = snap.profile.clone();
        loser.cumulative_xp = 70;
        assert!(!store.commit_profile(snap.version, loser, None).await);

        let current = store.snapshot("u1").await.unwrap();
        assert_eq!(current.profile.cumulative_xp, 50);
        assert_eq!(current.version, 1);
    }

    #[tokio::test]
    async fn commit_for_unknown_user_fails() {
        let store = MemoryStore::new();
        assert!(
            !store
                .commit_profile(0, LearnerProfile::new("ghost"), None)
                .await
        );
    }
}

//! Append-only XP audit log types.
//!
//! The ledger is the source of truth for "how much XP has a user earned and
//! why": the per-user sum of entry amounts always equals the profile's
//! cumulative XP. Entries are written once and never mutated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
    Exam,
    Flashcard,
    Challenge,
    Mission,
    Achievement,
    Streak,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpLedgerEntry {
    pub id: String,
    pub user_id: String,
    pub amount: u64,
    pub source: XpSource,
    /// Opaque reference into the caller's domain (exam id, mission id, ...).
    pub source_id: String,
    pub description: String,
    pub level_before: u32,
    pub level_after: u32,
    pub timestamp: DateTime<Utc>,
}

impl XpLedgerEntry {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

pub fn total_amount(entries: &[XpLedgerEntry]) -> u64 {
    entries.iter().map(|entry| entry.amount).sum()
}

//! Consecutive-day streak tracking.
//!
//! Comparison is done on calendar-day boundaries, never on raw timestamp
//! subtraction: "one day apart" must tolerate any time-of-day, so callers
//! collapse their event timestamps to a `NaiveDate` first.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakUpdate {
    pub streak_days: u32,
    pub last_active_date: NaiveDate,
    /// True when this call extended or restarted the streak (a new active
    /// day); false for same-day re-entry and backfill no-ops.
    pub extended: bool,
}

/// State machine on `(last_active_date, streak_days)`:
/// no prior activity starts at 1, the same day is idempotent, the next day
/// increments, a gap restarts at 1, and a past date is a no-op that never
/// rewinds `last_active_date` or decreases the streak.
pub fn record_activity(
    streak_days: u32,
    last_active_date: Option<NaiveDate>,
    activity_date: NaiveDate,
) -> StreakUpdate {
    let Some(last) = last_active_date else {
        return StreakUpdate {
            streak_days: 1,
            last_active_date: activity_date,
            extended: true,
        };
    };

    if activity_date <= last {
        return StreakUpdate {
            streak_days,
            last_active_date: last,
            extended: false,
        };
    }

    let gap_days = (activity_date - last).num_days();
    StreakUpdate {
        streak_days: if gap_days == 1 { streak_days + 1 } else { 1 },
        last_active_date: activity_date,
        extended: true,
    }
}

//! Spaced-repetition review scheduling (SM-2 derived).
//!
//! One forgotten branch plus three confidence tiers on remembered recall:
//! a single "remembered" signal still distinguishes shaky recall from
//! confident recall, producing different interval growth rates. The ease
//! factor is bounded so intervals neither run away nor degenerate into
//! same-day repetition.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::UrgencyThresholds;

pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_EASE_FACTOR: f64 = 2.5;

/// Upper bound on the scheduling horizon (100 years). Compounding
/// high-confidence growth clamps here; without the cap the due timestamp
/// eventually leaves chrono's representable range.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Extra interval growth applied on confident recall.
const HIGH_CONFIDENCE_GROWTH: f64 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Confidence {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Self::Low,
            1 => Self::Medium,
            _ => Self::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub remembered: bool,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub lapses: u32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub next_review_at: DateTime<Utc>,
}

impl ReviewState {
    /// Initial state for an item the user has never reviewed: due
    /// immediately, neutral ease.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            ease_factor: MAX_EASE_FACTOR,
            interval_days: 1,
            repetitions: 0,
            lapses: 0,
            last_reviewed_at: None,
            next_review_at: now,
        }
    }
}

/// Applies one rating to a review state. `next_review_at` is always
/// recomputed from the previous state plus the outcome, never set directly.
pub fn rate(state: &ReviewState, outcome: ReviewOutcome, now: DateTime<Utc>) -> ReviewState {
    let mut next = state.clone();

    if !outcome.remembered {
        next.ease_factor = (state.ease_factor - 0.2).max(MIN_EASE_FACTOR);
        next.repetitions = 0;
        next.interval_days = 1;
        next.lapses = state.lapses + 1;
    } else {
        next.repetitions = state.repetitions + 1;
        match outcome.confidence {
            Confidence::Low => {
                // Remembered but shaky: shrink the interval.
                next.ease_factor = (state.ease_factor - 0.15).max(MIN_EASE_FACTOR);
                next.interval_days = round_interval(f64::from(state.interval_days) * 0.5);
            }
            Confidence::Medium => {
                next.ease_factor = (state.ease_factor - 0.05).max(MIN_EASE_FACTOR);
                next.interval_days = match next.repetitions {
                    1 => 1,
                    2 => 6,
                    _ => round_interval(f64::from(state.interval_days) * next.ease_factor),
                };
            }
            Confidence::High => {
                next.ease_factor = (state.ease_factor + 0.15).min(MAX_EASE_FACTOR);
                next.interval_days = if next.repetitions == 1 {
                    1
                } else {
                    round_interval(
                        f64::from(state.interval_days)
                            * next.ease_factor
                            * HIGH_CONFIDENCE_GROWTH,
                    )
                };
            }
        }
    }

    next.last_reviewed_at = Some(now);
    next.next_review_at = now + Duration::days(i64::from(next.interval_days));
    next
}

fn round_interval(days: f64) -> u32 {
    days.round().clamp(1.0, f64::from(MAX_INTERVAL_DAYS)) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Overdue,
    Critical,
    High,
    Medium,
    Low,
}

/// Signed time until the item is due; negative once overdue.
pub fn time_to_due(next_review_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    next_review_at - now
}

/// Presentation-layer bucket for review queues. Thresholds are policy, not
/// engine contract; the contract is the signed delta from [`time_to_due`].
pub fn classify_urgency(
    next_review_at: DateTime<Utc>,
    now: DateTime<Utc>,
    thresholds: &UrgencyThresholds,
) -> Urgency {
    let delta = time_to_due(next_review_at, now);
    if delta < Duration::zero() {
        Urgency::Overdue
    } else if delta <= thresholds.critical_within() {
        Urgency::Critical
    } else if delta <= thresholds.high_within() {
        Urgency::High
    } else if delta <= thresholds.medium_within() {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED_TIMESTAMP: i64 = 1_700_000_000;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(FIXED_TIMESTAMP, 0).unwrap()
    }

    fn remembered(confidence: Confidence) -> ReviewOutcome {
        ReviewOutcome {
            remembered: true,
            confidence,
        }
    }

    fn forgotten() -> ReviewOutcome {
        ReviewOutcome {
            remembered: false,
            confidence: Confidence::Low,
        }
    }

    #[test]
    fn new_state_is_due_immediately() {
        let state = ReviewState::new(now());
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.interval_days, 1);
        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.next_review_at, now());
    }

    #[test]
    fn forgotten_resets_repetitions_and_interval() {
        let state = ReviewState {
            ease_factor: 2.1,
            interval_days: 30,
            repetitions: 5,
            lapses: 1,
            last_reviewed_at: Some(now()),
            next_review_at: now(),
        };
        let next = rate(&state, forgotten(), now());
        assert_eq!(next.repetitions, 0);
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.lapses, 2);
        assert!((next.ease_factor - 1.9).abs() < 1e-9);
        assert_eq!(next.next_review_at, now() + Duration::days(1));
    }

    #[test]
    fn ease_factor_never_drops_below_floor() {
        let mut state = ReviewState::new(now());
        for _ in 0..30 {
            state = rate(&state, forgotten(), now());
        }
        assert_eq!(state.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn low_confidence_shrinks_interval() {
        let state = ReviewState {
            ease_factor: 2.5,
            interval_days: 10,
            repetitions: 3,
            lapses: 0,
            last_reviewed_at: Some(now()),
            next_review_at: now(),
        };
        let next = rate(&state, remembered(Confidence::Low), now());
        assert_eq!(next.interval_days, 5);
        assert_eq!(next.repetitions, 4);
    }

    #[test]
    fn low_confidence_interval_floors_at_one_day() {
        let mut state = ReviewState::new(now());
        state = rate(&state, remembered(Confidence::Low), now());
        assert_eq!(state.interval_days, 1);
    }

    #[test]
    fn medium_confidence_follows_sm2_ladder() {
        let mut state = ReviewState::new(now());
        state = rate(&state, remembered(Confidence::Medium), now());
        assert_eq!(state.interval_days, 1);
        state = rate(&state, remembered(Confidence::Medium), now());
        assert_eq!(state.interval_days, 6);
        state = rate(&state, remembered(Confidence::Medium), now());
        // round(6 * 2.35) = 14
        assert_eq!(state.interval_days, 14);
    }

    #[test]
    fn high_confidence_accelerates_growth() {
        let state = ReviewState {
            ease_factor: 2.5,
            interval_days: 6,
            repetitions: 2,
            lapses: 0,
            last_reviewed_at: Some(now()),
            next_review_at: now(),
        };
        let next = rate(&state, remembered(Confidence::High), now());
        assert_eq!(next.repetitions, 3);
        assert_eq!(next.ease_factor, MAX_EASE_FACTOR);
        // round(6 * 2.5 * 1.3) = 20
        assert_eq!(next.interval_days, 20);
    }

    #[test]
    fn interval_growth_clamps_at_horizon() {
        // Re-rating the same item at high confidence over and over compounds
        // the interval by ease * 1.3 per rating; it must clamp instead of
        // overflowing the due timestamp.
        let mut state = ReviewState::new(now());
        let mut at = now();
        for _ in 0..40 {
            state = rate(&state, remembered(Confidence::High), at);
            assert!(state.interval_days <= MAX_INTERVAL_DAYS);
            at = state.next_review_at;
        }
        assert_eq!(state.interval_days, MAX_INTERVAL_DAYS);
        assert_eq!(
            state.next_review_at,
            state.last_reviewed_at.unwrap() + Duration::days(i64::from(MAX_INTERVAL_DAYS))
        );
    }

    #[test]
    fn urgency_tiers() {
        let thresholds = UrgencyThresholds::default();
        let classify = |offset: Duration| classify_urgency(now() + offset, now(), &thresholds);

        assert_eq!(classify(Duration::hours(-1)), Urgency::Overdue);
        assert_eq!(classify(Duration::minutes(30)), Urgency::Critical);
        assert_eq!(classify(Duration::hours(3)), Urgency::High);
        assert_eq!(classify(Duration::hours(12)), Urgency::Medium);
        assert_eq!(classify(Duration::days(3)), Urgency::Low);
    }
}

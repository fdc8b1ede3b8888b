//! Mastery & progression engine for a gamified exam-preparation platform.
//!
//! Two concerns live here: spaced-repetition scheduling of learned items
//! (ease factor, interval, repetitions, lapses, urgency tiers) and the
//! conversion of raw learning events into XP awards, level transitions and
//! daily streaks, kept consistent under concurrent per-user updates. HTTP
//! handlers, storage adapters and UI are collaborators that call in through
//! [`engine::ProgressionEngine`].

pub mod achievements;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod level;
pub mod logging;
pub mod scheduler;
pub mod store;
pub mod streak;

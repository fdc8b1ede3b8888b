//! Level calculator: cumulative XP to level and progress-within-level.
//!
//! A level costs quadratically more XP than the one before it, so early
//! levels land fast and later ones feel earned. `level_for_xp` and
//! `xp_to_reach_level` are exact inverses: `level_for_xp(xp_to_reach_level(l))
//! == l` for every level.

use serde::{Deserialize, Serialize};

/// XP cost of the first level step; level L starts at `(L-1)^2 * 100`.
pub const XP_LEVEL_UNIT: u64 = 100;

pub fn xp_to_reach_level(level: u32) -> u64 {
    let steps = u64::from(level.saturating_sub(1));
    steps * steps * XP_LEVEL_UNIT
}

pub fn level_for_xp(xp: u64) -> u32 {
    let units = xp / XP_LEVEL_UNIT;
    // f64 sqrt can land one off near perfect squares; fix up in integers so
    // the inverse relation with xp_to_reach_level holds exactly.
    let mut root = (units as f64).sqrt() as u64;
    while (root + 1) * (root + 1) <= units {
        root += 1;
    }
    while root * root > units {
        root -= 1;
    }
    root as u32 + 1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level: u32,
    pub current_xp: u64,
    pub xp_to_next_level: u64,
    pub progress_fraction: f64,
}

/// Read-only projection for profile/dashboard display.
pub fn progress_for_xp(xp: u64) -> LevelProgress {
    let level = level_for_xp(xp);
    let floor = xp_to_reach_level(level);
    let ceiling = xp_to_reach_level(level + 1);
    let span = (ceiling - floor) as f64;
    let fraction = ((xp - floor) as f64 / span).clamp(0.0, 1.0);

    LevelProgress {
        level,
        current_xp: xp,
        xp_to_next_level: ceiling.saturating_sub(xp),
        progress_fraction: fraction,
    }
}

//! Leaderboard rate computation and rank tiers.
//!
//! Rates are unit-scaled by magnitude so short sessions read in units/sec
//! and long ones in units/hr. Ranking drives purely cosmetic tier styling:
//! gold, silver, bronze for the top three, fading emphasis beyond.

use serde::{Deserialize, Serialize};

use buildshift_core::types::LeaderboardEntry;

/// Sanity bound on session durations: one year in seconds.
///
/// Durations at or beyond this (or non-positive) collapse to 0, which in
/// turn yields a zero rate.
pub const MAX_DURATION_SECS: f64 = 86_400.0 * 365.0;

/// Display unit for a computed rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    /// Sessions under a minute
    PerSecond,
    /// Sessions under an hour
    PerMinute,
    /// Everything longer
    PerHour,
}

impl std::fmt::Display for RateUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerSecond => write!(f, "units/sec"),
            Self::PerMinute => write!(f, "units/min"),
            Self::PerHour => write!(f, "units/hr"),
        }
    }
}

/// A magnitude-scaled rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub value: f64,
    pub unit: RateUnit,
}

impl Rate {
    /// Compute the rate for a count over a duration in seconds.
    ///
    /// Zero or negative durations yield a zero per-second rate rather than
    /// an infinity.
    pub fn compute(count: f64, duration_secs: f64) -> Self {
        if duration_secs <= 0.0 {
            return Self {
                value: 0.0,
                unit: RateUnit::PerSecond,
            };
        }
        if duration_secs < 60.0 {
            return Self {
                value: count / duration_secs,
                unit: RateUnit::PerSecond,
            };
        }
        if duration_secs < 3600.0 {
            return Self {
                value: count / (duration_secs / 60.0),
                unit: RateUnit::PerMinute,
            };
        }
        Self {
            value: count / (duration_secs / 3600.0),
            unit: RateUnit::PerHour,
        }
    }
}

impl std::fmt::Display for Rate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit)
    }
}

/// Clamp a raw duration to the sanity bound.
///
/// Mirrors the leaderboard parsing rule: only `(0, 1 year)` is trusted.
pub fn clamp_duration(raw_secs: f64) -> f64 {
    if raw_secs > 0.0 && raw_secs < MAX_DURATION_SECS {
        raw_secs
    } else {
        0.0
    }
}

/// Cosmetic tier for a 0-based display rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTier {
    Gold,
    Silver,
    Bronze,
    Standard,
}

impl RankTier {
    /// Tier for a 0-based rank index.
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            0 => Self::Gold,
            1 => Self::Silver,
            2 => Self::Bronze,
            _ => Self::Standard,
        }
    }

    /// Emphasis factor for a 0-based rank: the top three render at full
    /// strength, entries beyond fade down to a floor of 0.3.
    pub fn emphasis(rank: usize) -> f64 {
        if rank < 3 {
            1.0
        } else {
            (1.0 - (rank as f64 - 3.0) * 0.15).max(0.3)
        }
    }
}

/// A leaderboard entry with its derived rate, ready for ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub entry: LeaderboardEntry,
    pub rate: Rate,
}

/// How the leaderboard orders entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderboardSort {
    /// Descending by derived rate (the default)
    #[default]
    ByRate,
    /// Descending by raw count
    ByCount,
}

impl LeaderboardSort {
    /// Toggle between the two modes.
    pub fn toggled(self) -> Self {
        match self {
            Self::ByRate => Self::ByCount,
            Self::ByCount => Self::ByRate,
        }
    }

    /// Display label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ByRate => "rate",
            Self::ByCount => "count",
        }
    }
}

/// Attach rates and sort descending under the given mode.
///
/// The sort is stable, so backend order breaks ties.
pub fn rank_entries(entries: Vec<LeaderboardEntry>, sort: LeaderboardSort) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = entries
        .into_iter()
        .map(|entry| {
            let rate = Rate::compute(entry.count, entry.duration_secs);
            RankedEntry { entry, rate }
        })
        .collect();

    match sort {
        LeaderboardSort::ByRate => {
            ranked.sort_by(|a, b| b.rate.value.total_cmp(&a.rate.value));
        }
        LeaderboardSort::ByCount => {
            ranked.sort_by(|a, b| b.entry.count.total_cmp(&a.entry.count));
        }
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: &str, count: f64, duration_secs: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            id: None,
            user: user.to_string(),
            count,
            duration_secs,
            start: None,
            end: None,
            notes: String::new(),
        }
    }

    #[test]
    fn test_rate_bucketing() {
        // 45s -> units/sec, 90s -> units/min, 4000s -> units/hr, 0 -> rate 0
        let r = Rate::compute(90.0, 45.0);
        assert_eq!(r.unit, RateUnit::PerSecond);
        assert_eq!(r.value, 2.0);

        let r = Rate::compute(30.0, 90.0);
        assert_eq!(r.unit, RateUnit::PerMinute);
        assert_eq!(r.value, 20.0);

        let r = Rate::compute(100.0, 4000.0);
        assert_eq!(r.unit, RateUnit::PerHour);
        assert_eq!(r.value, 90.0);

        let r = Rate::compute(100.0, 0.0);
        assert_eq!(r.unit, RateUnit::PerSecond);
        assert_eq!(r.value, 0.0);
    }

    #[test]
    fn test_rate_boundaries() {
        // Exactly 60s scales by minutes, exactly 3600s by hours
        assert_eq!(Rate::compute(60.0, 60.0).unit, RateUnit::PerMinute);
        assert_eq!(Rate::compute(60.0, 3600.0).unit, RateUnit::PerHour);
        assert_eq!(Rate::compute(60.0, 59.9).unit, RateUnit::PerSecond);
    }

    #[test]
    fn test_negative_duration_is_zero_rate() {
        let r = Rate::compute(10.0, -5.0);
        assert_eq!(r.value, 0.0);
        assert_eq!(r.unit, RateUnit::PerSecond);
    }

    #[test]
    fn test_clamp_duration() {
        assert_eq!(clamp_duration(500.0), 500.0);
        assert_eq!(clamp_duration(0.0), 0.0);
        assert_eq!(clamp_duration(-10.0), 0.0);
        assert_eq!(clamp_duration(MAX_DURATION_SECS), 0.0);
        assert_eq!(clamp_duration(MAX_DURATION_SECS - 1.0), MAX_DURATION_SECS - 1.0);
    }

    #[test]
    fn test_rank_tiers() {
        assert_eq!(RankTier::for_rank(0), RankTier::Gold);
        assert_eq!(RankTier::for_rank(1), RankTier::Silver);
        assert_eq!(RankTier::for_rank(2), RankTier::Bronze);
        assert_eq!(RankTier::for_rank(7), RankTier::Standard);
    }

    #[test]
    fn test_emphasis_fade() {
        assert_eq!(RankTier::emphasis(0), 1.0);
        assert_eq!(RankTier::emphasis(2), 1.0);
        assert_eq!(RankTier::emphasis(3), 1.0);
        assert!((RankTier::emphasis(4) - 0.85).abs() < 1e-9);
        assert!((RankTier::emphasis(5) - 0.70).abs() < 1e-9);
        // Floor at 0.3 for deep ranks
        assert_eq!(RankTier::emphasis(50), 0.3);
    }

    #[test]
    fn test_rank_entries_by_rate() {
        let entries = vec![
            entry("slow", 10.0, 100.0),  // 6 units/min
            entry("fast", 90.0, 45.0),   // 2 units/sec
            entry("stale", 100.0, 0.0),  // rate 0
        ];
        let ranked = rank_entries(entries, LeaderboardSort::ByRate);
        assert_eq!(ranked[0].entry.user, "slow");
        assert_eq!(ranked[1].entry.user, "fast");
        assert_eq!(ranked[2].entry.user, "stale");
    }

    #[test]
    fn test_rank_entries_by_count() {
        let entries = vec![
            entry("a", 10.0, 100.0),
            entry("b", 90.0, 45.0),
            entry("c", 100.0, 0.0),
        ];
        let ranked = rank_entries(entries, LeaderboardSort::ByCount);
        assert_eq!(ranked[0].entry.user, "c");
        assert_eq!(ranked[1].entry.user, "b");
        assert_eq!(ranked[2].entry.user, "a");
    }

    #[test]
    fn test_sort_toggle() {
        assert_eq!(LeaderboardSort::ByRate.toggled(), LeaderboardSort::ByCount);
        assert_eq!(LeaderboardSort::ByCount.toggled(), LeaderboardSort::ByRate);
    }
}

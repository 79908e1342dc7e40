//! Candidate scoring for (allocation unit, room) pairs.
//!
//! Scores are strictly additive: each [`ScoreComponent`] contributes a
//! non-negative integer and the candidate's score is their sum, so the
//! order components are evaluated in never matters. Hard rules do not
//! score negatively; a room that violates an applicable hard rule is
//! marked ineligible before any component runs.
//!
//! # Usage
//!
//! ```
//! use u_roomalloc::scoring::{ScoringEngine, ScoringWeights};
//!
//! let engine = ScoringEngine::standard();
//! assert_eq!(engine.component_names().len(), 5);
//! let weights = ScoringWeights::default();
//! assert!(weights.history_cap >= weights.history_per_occurrence);
//! ```
//!
//! # Ranking
//! Eligible candidates rank by descending score, ties broken by the lowest
//! room id, so ranking is deterministic for identical inputs.

mod components;
mod context;
mod engine;
mod unit;

pub use components::{
    CapacityFit, HardRuleCompliance, HistoricalAffinity, HybridRoomTypeMatch, SoftPreference,
};
pub use context::ScoringContext;
pub use engine::ScoringEngine;
pub use unit::{AllocationUnit, UnitKey};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::models::{Room, RoomId};

/// Integer score. Components never contribute negative points.
pub type Score = u64;

/// Tunable component weights.
///
/// The additive contract and the history cap semantics are fixed; the
/// numbers are configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Flat bonus when capacity covers enrollment.
    pub capacity: u32,
    /// Bonus per satisfied hard rule or professor restriction.
    pub hard_rule: u32,
    /// Bonus per matched soft preference.
    pub soft_preference: u32,
    /// Points per historical occurrence.
    pub history_per_occurrence: u32,
    /// Upper bound on total historical points.
    pub history_cap: u32,
    /// Bonus when a hybrid discipline's day gets its historical room type.
    pub hybrid_match: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            capacity: 10,
            hard_rule: 50,
            soft_preference: 5,
            history_per_occurrence: 2,
            history_cap: 20,
            hybrid_match: 15,
        }
    }
}

impl ScoringWeights {
    /// `min(occurrences * per_occurrence, cap)`.
    ///
    /// The cap bounds points, not the occurrence count.
    pub fn history_bonus(&self, occurrences: u32) -> Score {
        let raw = Score::from(occurrences).saturating_mul(Score::from(self.history_per_occurrence));
        raw.min(Score::from(self.history_cap))
    }
}

/// A scoring component.
///
/// # Contract
/// Implementations must be pure functions of their inputs and return
/// non-negative points.
pub trait ScoreComponent: Send + Sync + Debug {
    /// Component name, used as the breakdown key.
    fn name(&self) -> &'static str;

    /// Points for placing `unit` in `room`.
    fn score(&self, unit: &AllocationUnit, room: &Room, context: &ScoringContext<'_>) -> Score;

    /// Component description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Per-component contributions of one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub components: BTreeMap<String, Score>,
}

impl ScoreBreakdown {
    pub fn add(&mut self, name: &str, points: Score) {
        *self.components.entry(name.to_string()).or_insert(0) += points;
    }

    pub fn get(&self, name: &str) -> Score {
        self.components.get(name).copied().unwrap_or(0)
    }

    pub fn total(&self) -> Score {
        self.components.values().sum()
    }
}

/// A scored room for one allocation unit. Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub room: RoomId,
    pub score: Score,
    pub breakdown: ScoreBreakdown,
    /// False if any applicable hard rule is violated.
    pub eligible: bool,
    /// Violated hard rules, for audit.
    pub violations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_bonus_caps_points_not_count() {
        let w = ScoringWeights {
            history_per_occurrence: 3,
            history_cap: 10,
            ..Default::default()
        };
        assert_eq!(w.history_bonus(0), 0);
        assert_eq!(w.history_bonus(1), 3);
        assert_eq!(w.history_bonus(3), 9);
        // C*W = 12 ≥ K → K
        assert_eq!(w.history_bonus(4), 10);
        assert_eq!(w.history_bonus(1000), 10);
    }

    #[test]
    fn test_history_bonus_matches_min_formula() {
        for w_occ in [0u32, 1, 2, 5, 7] {
            for cap in [0u32, 1, 10, 25] {
                let w = ScoringWeights {
                    history_per_occurrence: w_occ,
                    history_cap: cap,
                    ..Default::default()
                };
                for c in 0u32..20 {
                    let expected = (u64::from(c) * u64::from(w_occ)).min(u64::from(cap));
                    assert_eq!(w.history_bonus(c), expected);
                }
            }
        }
    }

    #[test]
    fn test_history_bonus_saturates() {
        let w = ScoringWeights {
            history_per_occurrence: u32::MAX,
            history_cap: u32::MAX,
            ..Default::default()
        };
        assert_eq!(w.history_bonus(u32::MAX), u64::from(u32::MAX));
    }

    #[test]
    fn test_breakdown_total() {
        let mut b = ScoreBreakdown::default();
        b.add("capacity", 10);
        b.add("history", 4);
        b.add("history", 2);
        assert_eq!(b.get("history"), 6);
        assert_eq!(b.get("missing"), 0);
        assert_eq!(b.total(), 16);
    }
}

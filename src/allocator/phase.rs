//! Allocation phase state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether demands may be split across rooms by weekday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
    /// Every soft unit is a whole demand.
    #[default]
    Full,
    /// Hybrid disciplines are placed per weekday, and whole demands that
    /// find no room are retried per weekday.
    Partial,
}

/// A phase of an allocation run.
///
/// ```text
/// HybridDetection → HardRuleAllocation → SoftScoring → AtomicAllocation → Done
///                                                            │ (partial)
///                                                            └→ PartialAllocation → Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    HybridDetection,
    HardRuleAllocation,
    SoftScoring,
    AtomicAllocation,
    PartialAllocation,
    Done,
}

impl Phase {
    /// The phase after this one.
    pub fn next(self, mode: AllocationMode) -> Phase {
        match (self, mode) {
            (Phase::HybridDetection, _) => Phase::HardRuleAllocation,
            (Phase::HardRuleAllocation, _) => Phase::SoftScoring,
            (Phase::SoftScoring, _) => Phase::AtomicAllocation,
            (Phase::AtomicAllocation, AllocationMode::Partial) => Phase::PartialAllocation,
            (Phase::AtomicAllocation, AllocationMode::Full) => Phase::Done,
            (Phase::PartialAllocation, _) | (Phase::Done, _) => Phase::Done,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Done
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::HybridDetection => "hybrid_detection",
            Phase::HardRuleAllocation => "hard_rule_allocation",
            Phase::SoftScoring => "soft_scoring",
            Phase::AtomicAllocation => "atomic_allocation",
            Phase::PartialAllocation => "partial_allocation",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(mode: AllocationMode) -> Vec<Phase> {
        let mut phase = Phase::HybridDetection;
        let mut seen = vec![phase];
        while !phase.is_terminal() {
            phase = phase.next(mode);
            seen.push(phase);
        }
        seen
    }

    #[test]
    fn test_full_mode_skips_partial_phase() {
        assert_eq!(
            walk(AllocationMode::Full),
            vec![
                Phase::HybridDetection,
                Phase::HardRuleAllocation,
                Phase::SoftScoring,
                Phase::AtomicAllocation,
                Phase::Done,
            ]
        );
    }

    #[test]
    fn test_partial_mode_adds_partial_phase() {
        let phases = walk(AllocationMode::Partial);
        assert_eq!(phases.len(), 6);
        assert_eq!(phases[4], Phase::PartialAllocation);
        assert_eq!(Phase::Done.next(AllocationMode::Partial), Phase::Done);
    }
}

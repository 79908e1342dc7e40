//! Allocation report and summary metrics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Allocation Rate | Demands fully placed (single room or split) / demands |
//! | Allocated Slots | Allocation rows produced by the run |
//! | Room Utilization | Occupied slots / weekly grid cells, per room |
//! | Avg Utilization | Mean room utilization |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::phase::{AllocationMode, Phase};
use crate::conflict::ConflictIndex;
use crate::error::HardRuleConflict;
use crate::models::{Allocation, DayId, DemandId, RoomId, SemesterId};
use crate::scoring::{Candidate, UnitKey};

/// Why a demand or one of its days got no room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// No room satisfies the applicable hard rules.
    NoEligibleRoom,
    /// The schedule code could not be parsed.
    ParseError(String),
    /// Every eligible room was already occupied.
    AllCandidatesConflicted { tried: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoEligibleRoom => f.write_str("no eligible room"),
            SkipReason::ParseError(msg) => write!(f, "parse error: {msg}"),
            SkipReason::AllCandidatesConflicted { tried } => {
                write!(f, "all {tried} eligible room(s) conflicted")
            }
        }
    }
}

/// Final state of one demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DemandOutcome {
    /// Every block placed in one room.
    Allocated { room: RoomId },
    /// Every block placed; weekdays in different rooms.
    Split { rooms: BTreeMap<DayId, RoomId> },
    /// Some weekdays placed, the rest skipped.
    PartiallyAllocated {
        rooms: BTreeMap<DayId, RoomId>,
        skipped: BTreeMap<DayId, SkipReason>,
    },
    /// Nothing placed.
    Skipped { reason: SkipReason },
    /// Mandatory constraints collide with another demand.
    HardConflict { conflict: HardRuleConflict },
}

impl DemandOutcome {
    /// Whether every parsed block of the demand has a room.
    pub fn is_complete(&self) -> bool {
        matches!(self, DemandOutcome::Allocated { .. } | DemandOutcome::Split { .. })
    }
}

/// Scoring audit of one allocation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    pub key: UnitKey,
    /// Ranked candidates with breakdowns.
    pub candidates: Vec<Candidate>,
    /// Room committed for the unit.
    pub chosen: Option<RoomId>,
    /// Eligible rooms passed over because they were occupied.
    pub conflicted: Vec<RoomId>,
}

/// Per-demand entry of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandReport {
    pub demand: DemandId,
    pub course_code: String,
    /// The discipline was classified hybrid.
    pub hybrid: bool,
    pub outcome: DemandOutcome,
    pub units: Vec<UnitReport>,
}

/// What happened during one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub units_seen: usize,
    pub units_allocated: usize,
    pub units_skipped: usize,
}

impl PhaseRecord {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            units_seen: 0,
            units_allocated: 0,
            units_skipped: 0,
        }
    }
}

/// Run-level indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_demands: usize,
    pub allocated: usize,
    pub split: usize,
    pub partially_allocated: usize,
    pub skipped: usize,
    pub hard_conflicts: usize,
    pub allocated_slots: usize,
    /// Fraction of demands fully placed (0.0..1.0).
    pub allocation_rate: f64,
    /// Occupied fraction of each room's weekly cells, after the run.
    pub utilization_by_room: BTreeMap<RoomId, f64>,
    pub avg_utilization: f64,
}

impl ReportSummary {
    /// Computes the summary from demand outcomes and the index state.
    ///
    /// # Arguments
    /// * `demands` - Per-demand report entries.
    /// * `rows` - Allocation rows produced by the run.
    /// * `index` - Conflict index after the run.
    /// * `rooms` - Rooms to report utilization for.
    /// * `cells_per_week` - Weekly (day, block) cells of the grid.
    pub fn calculate(
        demands: &[DemandReport],
        rows: &[Allocation],
        index: &ConflictIndex,
        rooms: impl IntoIterator<Item = RoomId>,
        cells_per_week: usize,
    ) -> Self {
        let mut summary = Self {
            total_demands: demands.len(),
            allocated: 0,
            split: 0,
            partially_allocated: 0,
            skipped: 0,
            hard_conflicts: 0,
            allocated_slots: rows.len(),
            allocation_rate: 1.0,
            utilization_by_room: BTreeMap::new(),
            avg_utilization: 0.0,
        };

        for d in demands {
            match d.outcome {
                DemandOutcome::Allocated { .. } => summary.allocated += 1,
                DemandOutcome::Split { .. } => summary.split += 1,
                DemandOutcome::PartiallyAllocated { .. } => summary.partially_allocated += 1,
                DemandOutcome::Skipped { .. } => summary.skipped += 1,
                DemandOutcome::HardConflict { .. } => summary.hard_conflicts += 1,
            }
        }
        if !demands.is_empty() {
            summary.allocation_rate =
                (summary.allocated + summary.split) as f64 / demands.len() as f64;
        }

        let occupied = index.occupied_by_room();
        for room in rooms {
            let used = occupied.get(&room).copied().unwrap_or(0);
            let rate = if cells_per_week == 0 {
                0.0
            } else {
                used as f64 / cells_per_week as f64
            };
            summary.utilization_by_room.insert(room, rate);
        }
        if !summary.utilization_by_room.is_empty() {
            let sum: f64 = summary.utilization_by_room.values().sum();
            summary.avg_utilization = sum / summary.utilization_by_room.len() as f64;
        }

        summary
    }
}

/// Result of an allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub semester: SemesterId,
    pub mode: AllocationMode,
    pub dry_run: bool,
    /// One entry per demand, by demand id.
    pub demands: Vec<DemandReport>,
    /// Rows produced, in commit order.
    pub allocations: Vec<Allocation>,
    pub conflicts: Vec<HardRuleConflict>,
    /// One record per phase transition.
    pub phases: Vec<PhaseRecord>,
    pub summary: ReportSummary,
}

impl AllocationReport {
    /// Report entry of a demand.
    pub fn demand(&self, id: DemandId) -> Option<&DemandReport> {
        self.demands.iter().find(|d| d.demand == id)
    }

    pub fn outcome(&self, id: DemandId) -> Option<&DemandOutcome> {
        self.demand(id).map(|d| &d.outcome)
    }

    /// Rows allocated to a demand.
    pub fn rows_for(&self, id: DemandId) -> Vec<&Allocation> {
        self.allocations.iter().filter(|a| a.demand == id).collect()
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseRecord> {
        self.phases.iter().find(|p| p.phase == phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlockCode;

    fn entry(id: u32, outcome: DemandOutcome) -> DemandReport {
        DemandReport {
            demand: DemandId(id),
            course_code: format!("C{id}"),
            hybrid: false,
            outcome,
            units: Vec::new(),
        }
    }

    #[test]
    fn test_summary_counts_and_utilization() {
        let demands = vec![
            entry(1, DemandOutcome::Allocated { room: RoomId(1) }),
            entry(2, DemandOutcome::Split {
                rooms: BTreeMap::from([(DayId(2), RoomId(1)), (DayId(4), RoomId(2))]),
            }),
            entry(3, DemandOutcome::Skipped {
                reason: SkipReason::NoEligibleRoom,
            }),
            entry(4, DemandOutcome::Skipped {
                reason: SkipReason::ParseError("empty schedule code".into()),
            }),
        ];
        let rows: Vec<Allocation> = (1..=4)
            .map(|i| Allocation::new(DemandId(1), RoomId(1), DayId(2), BlockCode::new(format!("M{i}"))))
            .collect();
        let mut index = ConflictIndex::new("2024.1");
        index.insert_committed(&rows);

        let s = ReportSummary::calculate(&demands, &rows, &index, [RoomId(1), RoomId(2)], 16);
        assert_eq!(s.total_demands, 4);
        assert_eq!(s.allocated, 1);
        assert_eq!(s.split, 1);
        assert_eq!(s.skipped, 2);
        assert_eq!(s.allocated_slots, 4);
        assert!((s.allocation_rate - 0.5).abs() < 1e-10);
        assert!((s.utilization_by_room[&RoomId(1)] - 0.25).abs() < 1e-10);
        assert_eq!(s.utilization_by_room[&RoomId(2)], 0.0);
        assert!((s.avg_utilization - 0.125).abs() < 1e-10);
    }

    #[test]
    fn test_empty_run_summary() {
        let index = ConflictIndex::new("2024.1");
        let s = ReportSummary::calculate(&[], &[], &index, Vec::new(), 96);
        assert_eq!(s.total_demands, 0);
        assert_eq!(s.allocation_rate, 1.0);
        assert_eq!(s.avg_utilization, 0.0);
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::NoEligibleRoom.to_string(), "no eligible room");
        assert_eq!(
            SkipReason::ParseError("empty schedule code".into()).to_string(),
            "parse error: empty schedule code"
        );
        assert_eq!(
            SkipReason::AllCandidatesConflicted { tried: 3 }.to_string(),
            "all 3 eligible room(s) conflicted"
        );
    }

    #[test]
    fn test_outcome_completeness() {
        assert!(DemandOutcome::Allocated { room: RoomId(1) }.is_complete());
        assert!(!DemandOutcome::Skipped {
            reason: SkipReason::NoEligibleRoom
        }
        .is_complete());
    }
}

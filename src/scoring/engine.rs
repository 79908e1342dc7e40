//! Scoring engine: sums components and ranks candidate rooms.

use rayon::prelude::*;
use std::sync::Arc;

use super::components::{
    CapacityFit, HardRuleCompliance, HistoricalAffinity, HybridRoomTypeMatch, SoftPreference,
};
use super::{AllocationUnit, Candidate, ScoreBreakdown, ScoreComponent, ScoringContext};
use crate::models::Room;

/// Composable additive scorer.
///
/// # Example
/// ```
/// use u_roomalloc::scoring::{CapacityFit, HistoricalAffinity, ScoringEngine};
///
/// let engine = ScoringEngine::new()
///     .with_component(CapacityFit)
///     .with_component(HistoricalAffinity);
/// assert_eq!(engine.component_names(), vec!["capacity", "history"]);
/// ```
#[derive(Clone, Default)]
pub struct ScoringEngine {
    components: Vec<Arc<dyn ScoreComponent>>,
}

impl ScoringEngine {
    /// Creates an engine with no components.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Engine with every built-in component.
    pub fn standard() -> Self {
        Self::new()
            .with_component(CapacityFit)
            .with_component(HardRuleCompliance)
            .with_component(SoftPreference)
            .with_component(HistoricalAffinity)
            .with_component(HybridRoomTypeMatch)
    }

    /// Adds a component.
    pub fn with_component<C: ScoreComponent + 'static>(mut self, component: C) -> Self {
        self.components.push(Arc::new(component));
        self
    }

    pub fn component_names(&self) -> Vec<&'static str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    /// Scores one room for one unit.
    ///
    /// Ineligible rooms still get a breakdown so audits can see what they
    /// would have scored.
    pub fn evaluate(&self, unit: &AllocationUnit, room: &Room, ctx: &ScoringContext<'_>) -> Candidate {
        let violations = ctx.violations(unit, room);
        let mut breakdown = ScoreBreakdown::default();
        for c in &self.components {
            breakdown.add(c.name(), c.score(unit, room, ctx));
        }
        Candidate {
            room: room.id,
            score: breakdown.total(),
            breakdown,
            eligible: violations.is_empty(),
            violations,
        }
    }

    /// Scores every room and ranks the result.
    ///
    /// Eligible candidates come first, by descending score then ascending
    /// room id; ineligible candidates follow by ascending room id.
    pub fn rank(&self, unit: &AllocationUnit, rooms: &[Room], ctx: &ScoringContext<'_>) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> =
            rooms.iter().map(|r| self.evaluate(unit, r, ctx)).collect();
        sort_candidates(&mut candidates);
        candidates
    }

    /// Ranks candidates for many units. Read-only, so units may be scored
    /// in parallel; output order matches `units` either way.
    pub fn rank_all(
        &self,
        units: &[AllocationUnit],
        rooms: &[Room],
        ctx: &ScoringContext<'_>,
        parallel: bool,
    ) -> Vec<Vec<Candidate>> {
        if parallel {
            units
                .par_iter()
                .map(|u| self.rank(u, rooms, ctx))
                .collect()
        } else {
            units.iter().map(|u| self.rank(u, rooms, ctx)).collect()
        }
    }
}

/// Deterministic candidate order.
pub(crate) fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.eligible
            .cmp(&a.eligible)
            .then_with(|| {
                if a.eligible {
                    b.score.cmp(&a.score)
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .then_with(|| a.room.cmp(&b.room))
    });
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("components", &self.component_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hybrid::HybridDetector;
    use crate::models::{
        Demand, HistoricalFrequency, HistoryRecord, RoomId, RoomType, Rule, TimeGrid,
    };
    use crate::schedule_code::{group_by_day, parse_schedule};
    use crate::scoring::ScoringWeights;

    fn unit(course: &str, code: &str, enrollment: u32) -> AllocationUnit {
        let grid = TimeGrid::standard();
        let d = Demand::new(1, course, code).with_enrollment(enrollment);
        let groups = group_by_day(parse_schedule(code, &grid).unwrap().iter(), &grid);
        AllocationUnit::whole(&d, groups)
    }

    #[test]
    fn test_rank_by_score_then_room_id() {
        let w = ScoringWeights::default();
        let t = RoomType::new("classroom");
        let ctx = ScoringContext::new(&w, &t);
        let rooms = vec![
            Room::new(3, "classroom").with_capacity(50),
            Room::new(1, "classroom").with_capacity(10),
            Room::new(2, "classroom").with_capacity(50),
        ];
        let ranked = ScoringEngine::standard().rank(&unit("C1", "2M1", 30), &rooms, &ctx);
        let order: Vec<RoomId> = ranked.iter().map(|c| c.room).collect();
        // 2 and 3 tie on capacity bonus → lower id first; 1 is too small
        assert_eq!(order, vec![RoomId(2), RoomId(3), RoomId(1)]);
        assert_eq!(ranked[0].score, 10);
        assert_eq!(ranked[2].score, 0);
    }

    #[test]
    fn test_hard_rule_violation_is_ineligible_regardless_of_score() {
        let w = ScoringWeights::default();
        let t = RoomType::new("classroom");
        let rules = vec![Rule::fixed_room("C1", 5), Rule::preferred_feature("C1", "projector")];
        let freq = HistoricalFrequency::from_records(&[HistoryRecord::new("2023.1", "C1", 1, 2, 50)]);
        let ctx = ScoringContext::new(&w, &t).with_rules(&rules).with_history(&freq);
        let rooms = vec![
            Room::new(1, "classroom").with_capacity(100).with_feature("projector"),
            Room::new(5, "classroom").with_capacity(10),
        ];

        let ranked = ScoringEngine::standard().rank(&unit("C1", "2M1", 30), &rooms, &ctx);
        assert_eq!(ranked[0].room, RoomId(5));
        assert!(ranked[0].eligible);
        assert!(!ranked[1].eligible);
        assert_eq!(ranked[1].violations, vec!["fixed room R5".to_string()]);
        // capacity + soft preference + capped history, kept for audit
        assert_eq!(ranked[1].score, 10 + 5 + 20);
    }

    #[test]
    fn test_score_is_sum_of_breakdown_and_order_independent() {
        let w = ScoringWeights::default();
        let t = RoomType::new("classroom");
        let rules = vec![Rule::preferred_feature("C1", "projector")];
        let freq = HistoricalFrequency::from_records(&[HistoryRecord::new("2023.1", "C1", 1, 2, 3)]);
        let ctx = ScoringContext::new(&w, &t).with_rules(&rules).with_history(&freq);
        let room = Room::new(1, "classroom").with_capacity(40).with_feature("projector");
        let u = unit("C1", "2M1", 30);

        let forward = ScoringEngine::standard().evaluate(&u, &room, &ctx);
        let reversed = ScoringEngine::new()
            .with_component(HybridRoomTypeMatch)
            .with_component(HistoricalAffinity)
            .with_component(SoftPreference)
            .with_component(HardRuleCompliance)
            .with_component(CapacityFit)
            .evaluate(&u, &room, &ctx);

        assert_eq!(forward.score, 10 + 5 + 6);
        assert_eq!(forward.score, forward.breakdown.total());
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_hybrid_day_units_prefer_historical_rooms() {
        // Room A (lab) on day 2, Room B (classroom) on day 4
        let w = ScoringWeights::default();
        let t = RoomType::new("classroom");
        let rooms = vec![
            Room::new(10, "lab").with_capacity(40),
            Room::new(20, "classroom").with_capacity(40),
            Room::new(30, "classroom").with_capacity(40),
        ];
        let history = vec![
            HistoryRecord::new("2023.2", "PROG", 10, 2, 2),
            HistoryRecord::new("2023.2", "PROG", 20, 4, 2),
        ];
        let freq = HistoricalFrequency::from_records(&history);
        let hybrids = HybridDetector::new("classroom").detect(&history, &rooms, None);
        let ctx = ScoringContext::new(&w, &t)
            .with_history(&freq)
            .with_hybrids(&hybrids);

        let days = unit("PROG", "24M12", 30).split_by_day();
        let engine = ScoringEngine::standard();
        let day2 = engine.rank(&days[0], &rooms, &ctx);
        let day4 = engine.rank(&days[1], &rooms, &ctx);
        assert_eq!(day2[0].room, RoomId(10));
        assert_eq!(day4[0].room, RoomId(20));
        assert!(day4[0].score > day4[1].score);
    }

    #[test]
    fn test_parallel_and_sequential_ranking_agree() {
        let w = ScoringWeights::default();
        let t = RoomType::new("classroom");
        let freq = HistoricalFrequency::from_records(&[
            HistoryRecord::new("2023.1", "C1", 2, 2, 4),
            HistoryRecord::new("2023.1", "C2", 3, 3, 1),
        ]);
        let ctx = ScoringContext::new(&w, &t).with_history(&freq);
        let rooms: Vec<Room> = (1..=6)
            .map(|i| Room::new(i, "classroom").with_capacity(i * 10))
            .collect();
        let units: Vec<AllocationUnit> = (0..20)
            .map(|i| unit(if i % 2 == 0 { "C1" } else { "C2" }, "23M12", i * 3))
            .collect();

        let engine = ScoringEngine::standard();
        let seq = engine.rank_all(&units, &rooms, &ctx, false);
        let par = engine.rank_all(&units, &rooms, &ctx, true);
        assert_eq!(seq, par);
    }
}

//! Built-in score components.
//!
//! | Component | Points |
//! |-----------|--------|
//! | `capacity` | flat bonus if capacity ≥ enrollment |
//! | `hard_rules` | bonus per satisfied hard rule / professor restriction |
//! | `soft_preferences` | bonus per matched rule or professor preference |
//! | `history` | `min(occurrences * per_occurrence, cap)` |
//! | `hybrid` | bonus when a hybrid day gets its historical room type (day units only) |

use super::{AllocationUnit, Score, ScoreComponent, ScoringContext};
use crate::models::Room;

/// Capacity adequacy.
#[derive(Debug, Clone, Copy)]
pub struct CapacityFit;

impl ScoreComponent for CapacityFit {
    fn name(&self) -> &'static str {
        "capacity"
    }

    fn score(&self, unit: &AllocationUnit, room: &Room, ctx: &ScoringContext<'_>) -> Score {
        if room.fits(unit.enrollment) {
            Score::from(ctx.weights.capacity)
        } else {
            0
        }
    }

    fn description(&self) -> &'static str {
        "Room seats the whole enrollment"
    }
}

/// Hard-rule compliance.
///
/// Counts applicable hard rules and professor restrictions the room
/// satisfies. Violations are handled by eligibility, not here.
#[derive(Debug, Clone, Copy)]
pub struct HardRuleCompliance;

impl ScoreComponent for HardRuleCompliance {
    fn name(&self) -> &'static str {
        "hard_rules"
    }

    fn score(&self, unit: &AllocationUnit, room: &Room, ctx: &ScoringContext<'_>) -> Score {
        let rules = ctx
            .rules_for(&unit.course_code)
            .iter()
            .filter(|r| r.is_hard() && r.kind.is_satisfied_by(room))
            .count();
        let restrictions: usize = ctx
            .profiles_for(&unit.professors)
            .iter()
            .map(|p| p.restrictions.iter().filter(|x| x.is_satisfied_by(room)).count())
            .sum();
        (rules + restrictions) as Score * Score::from(ctx.weights.hard_rule)
    }

    fn description(&self) -> &'static str {
        "Satisfied mandatory constraints"
    }
}

/// Soft preferences from discipline rules and professor profiles.
#[derive(Debug, Clone, Copy)]
pub struct SoftPreference;

impl ScoreComponent for SoftPreference {
    fn name(&self) -> &'static str {
        "soft_preferences"
    }

    fn score(&self, unit: &AllocationUnit, room: &Room, ctx: &ScoringContext<'_>) -> Score {
        let rule_matches = ctx
            .rules_for(&unit.course_code)
            .iter()
            .filter(|r| !r.is_hard() && r.kind.is_satisfied_by(room))
            .count();
        let professor_matches: usize = ctx
            .profiles_for(&unit.professors)
            .iter()
            .map(|p| {
                let rooms = p.preferred_rooms.iter().filter(|&&id| id == room.id).count();
                let features = p
                    .preferred_features
                    .iter()
                    .filter(|f| room.has_feature(f))
                    .count();
                rooms + features
            })
            .sum();
        (rule_matches + professor_matches) as Score * Score::from(ctx.weights.soft_preference)
    }

    fn description(&self) -> &'static str {
        "Matched room, type, feature and building preferences"
    }
}

/// Historical affinity of the discipline for the room on the unit's days.
#[derive(Debug, Clone, Copy)]
pub struct HistoricalAffinity;

impl ScoreComponent for HistoricalAffinity {
    fn name(&self) -> &'static str {
        "history"
    }

    fn score(&self, unit: &AllocationUnit, room: &Room, ctx: &ScoringContext<'_>) -> Score {
        let occurrences = ctx.history_count(&unit.course_code, room.id, &unit.days());
        ctx.weights.history_bonus(occurrences)
    }

    fn description(&self) -> &'static str {
        "Capped bonus for past use of the room on the same weekdays"
    }
}

/// Hybrid room-type match.
///
/// Applies only to day units of hybrid disciplines. Rewards a specialized
/// room on a historically specialized day and a regular room on a
/// historically regular day; a mismatch scores zero.
#[derive(Debug, Clone, Copy)]
pub struct HybridRoomTypeMatch;

impl ScoreComponent for HybridRoomTypeMatch {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn score(&self, unit: &AllocationUnit, room: &Room, ctx: &ScoringContext<'_>) -> Score {
        let Some(day) = unit.key.day else {
            return 0;
        };
        match ctx.hybrid_preference(&unit.course_code, day) {
            Some(pref) if pref.matches(room, ctx.default_room_type) => {
                Score::from(ctx.weights.hybrid_match)
            }
            _ => 0,
        }
    }

    fn description(&self) -> &'static str {
        "Historical weekday room type of a hybrid discipline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hybrid::HybridDetector;
    use crate::models::{
        Demand, HistoricalFrequency, HistoryRecord, ProfessorProfile, ProfessorRestriction,
        RoomType, Rule, TimeGrid,
    };
    use crate::schedule_code::{group_by_day, parse_schedule};
    use crate::scoring::ScoringWeights;

    fn whole(code: &str, enrollment: u32) -> AllocationUnit {
        let grid = TimeGrid::standard();
        let d = Demand::new(1, "C1", code)
            .with_enrollment(enrollment)
            .with_professor("Ada");
        let groups = group_by_day(parse_schedule(code, &grid).unwrap().iter(), &grid);
        AllocationUnit::whole(&d, groups)
    }

    #[test]
    fn test_capacity_fit() {
        let w = ScoringWeights::default();
        let t = RoomType::new("classroom");
        let ctx = ScoringContext::new(&w, &t);
        let u = whole("2M1", 40);
        assert_eq!(CapacityFit.score(&u, &Room::new(1, "classroom").with_capacity(40), &ctx), 10);
        assert_eq!(CapacityFit.score(&u, &Room::new(1, "classroom").with_capacity(39), &ctx), 0);
    }

    #[test]
    fn test_hard_rule_compliance_counts_rules_and_restrictions() {
        let w = ScoringWeights::default();
        let t = RoomType::new("classroom");
        let rules = vec![
            Rule::fixed_room_type("C1", "lab"),
            Rule::required_feature("C1", "projector"),
            Rule::preferred_feature("C1", "projector"),
        ];
        let profiles = vec![ProfessorProfile::new("Ada")
            .with_restriction(ProfessorRestriction::MaxFloor(0))];
        let ctx = ScoringContext::new(&w, &t)
            .with_rules(&rules)
            .with_professors(&profiles);
        let room = Room::new(1, "lab").with_feature("projector").on_floor(0);
        // 2 hard rules + 1 restriction
        assert_eq!(HardRuleCompliance.score(&whole("2M1", 10), &room, &ctx), 150);
        // 1 soft rule
        assert_eq!(SoftPreference.score(&whole("2M1", 10), &room, &ctx), 5);
    }

    #[test]
    fn test_soft_preferences_from_professor() {
        let w = ScoringWeights::default();
        let t = RoomType::new("classroom");
        let profiles = vec![ProfessorProfile::new("Ada")
            .with_preferred_room(7)
            .with_preferred_feature("whiteboard")
            .with_preferred_feature("projector")];
        let ctx = ScoringContext::new(&w, &t).with_professors(&profiles);
        let room = Room::new(7, "classroom").with_feature("projector");
        assert_eq!(SoftPreference.score(&whole("2M1", 10), &room, &ctx), 10);
    }

    #[test]
    fn test_history_uses_unit_days_and_cap() {
        let w = ScoringWeights {
            history_per_occurrence: 3,
            history_cap: 10,
            ..Default::default()
        };
        let t = RoomType::new("classroom");
        let freq = HistoricalFrequency::from_records(&[
            HistoryRecord::new("2023.1", "C1", 1, 2, 2),
            HistoryRecord::new("2023.1", "C1", 1, 4, 1),
            HistoryRecord::new("2023.1", "C1", 1, 6, 9),
        ]);
        let ctx = ScoringContext::new(&w, &t).with_history(&freq);
        let room = Room::new(1, "classroom");

        // Days 2 and 4: 3 occurrences → 9 points
        assert_eq!(HistoricalAffinity.score(&whole("24M1", 10), &room, &ctx), 9);
        // Day 6 only: 9 occurrences → 27 capped at 10
        assert_eq!(HistoricalAffinity.score(&whole("6M1", 10), &room, &ctx), 10);
        // Day 2 as a day unit
        let day_unit = whole("24M1", 10).split_by_day().remove(0);
        assert_eq!(HistoricalAffinity.score(&day_unit, &room, &ctx), 6);
    }

    #[test]
    fn test_hybrid_only_for_day_units_and_never_negative() {
        let w = ScoringWeights::default();
        let t = RoomType::new("classroom");
        let rooms = vec![Room::new(1, "classroom"), Room::new(2, "lab")];
        let profiles = HybridDetector::new("classroom").detect(
            &[
                HistoryRecord::new("2023.2", "C1", 2, 2, 2),
                HistoryRecord::new("2023.2", "C1", 1, 4, 2),
            ],
            &rooms,
            None,
        );
        let ctx = ScoringContext::new(&w, &t).with_hybrids(&profiles);

        let u = whole("24M1", 10);
        assert_eq!(HybridRoomTypeMatch.score(&u, &rooms[1], &ctx), 0);

        let days = u.split_by_day();
        assert_eq!(HybridRoomTypeMatch.score(&days[0], &rooms[1], &ctx), 15);
        assert_eq!(HybridRoomTypeMatch.score(&days[0], &rooms[0], &ctx), 0);
        assert_eq!(HybridRoomTypeMatch.score(&days[1], &rooms[0], &ctx), 15);
        assert_eq!(HybridRoomTypeMatch.score(&days[1], &rooms[1], &ctx), 0);
    }
}

//! Read-only lookups shared by all scoring components.

use std::collections::HashMap;

use super::{AllocationUnit, ScoringWeights};
use crate::hybrid::{DayRoomPreference, HybridProfiles};
use crate::models::{DayId, HistoricalFrequency, ProfessorProfile, Room, RoomId, RoomType, Rule};

/// Scoring inputs: weights, rules by discipline, professor profiles by
/// name key, historical frequencies and hybrid profiles.
///
/// Built once per run and shared (immutably) across every unit, which is
/// what makes parallel scoring safe.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub weights: &'a ScoringWeights,
    pub default_room_type: &'a RoomType,
    rules: HashMap<&'a str, Vec<&'a Rule>>,
    professors: HashMap<String, &'a ProfessorProfile>,
    history: Option<&'a HistoricalFrequency>,
    hybrids: Option<&'a HybridProfiles>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(weights: &'a ScoringWeights, default_room_type: &'a RoomType) -> Self {
        Self {
            weights,
            default_room_type,
            rules: HashMap::new(),
            professors: HashMap::new(),
            history: None,
            hybrids: None,
        }
    }

    /// Indexes rules by discipline code.
    pub fn with_rules(mut self, rules: &'a [Rule]) -> Self {
        for r in rules {
            self.rules
                .entry(r.discipline_code.as_str())
                .or_default()
                .push(r);
        }
        self
    }

    /// Indexes professor profiles by normalized name.
    pub fn with_professors(mut self, profiles: &'a [ProfessorProfile]) -> Self {
        for p in profiles {
            self.professors.insert(p.key(), p);
        }
        self
    }

    pub fn with_history(mut self, history: &'a HistoricalFrequency) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_hybrids(mut self, hybrids: &'a HybridProfiles) -> Self {
        self.hybrids = Some(hybrids);
        self
    }

    /// All rules targeting a discipline.
    pub fn rules_for(&self, course_code: &str) -> &[&'a Rule] {
        self.rules
            .get(course_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Profiles of the given professors; unknown names are skipped.
    pub fn profiles_for(&self, names: &[String]) -> Vec<&'a ProfessorProfile> {
        names
            .iter()
            .filter_map(|n| self.professors.get(&ProfessorProfile::key_for(n)).copied())
            .collect()
    }

    /// Historical occurrences of a discipline in a room over some days.
    pub fn history_count(&self, course_code: &str, room: RoomId, days: &[DayId]) -> u32 {
        self.history
            .map(|h| h.count_over_days(course_code, room, days))
            .unwrap_or(0)
    }

    /// Hybrid room-type preference of a discipline on a day.
    pub fn hybrid_preference(&self, course_code: &str, day: DayId) -> Option<&'a DayRoomPreference> {
        self.hybrids.and_then(|h| h.preference(course_code, day))
    }

    /// Whether a discipline has a fixed-room or fixed-room-type rule.
    pub fn has_fixing_rule(&self, course_code: &str) -> bool {
        self.rules_for(course_code).iter().any(|r| r.kind.is_fixing())
    }

    /// Hard rules and professor restrictions that `room` violates for `unit`.
    ///
    /// An empty result means the room is eligible.
    pub fn violations(&self, unit: &AllocationUnit, room: &Room) -> Vec<String> {
        let mut out: Vec<String> = self
            .rules_for(&unit.course_code)
            .iter()
            .filter(|r| r.is_hard() && !r.kind.is_satisfied_by(room))
            .map(|r| r.kind.to_string())
            .collect();

        for profile in self.profiles_for(&unit.professors) {
            for restriction in &profile.restrictions {
                if !restriction.is_satisfied_by(room) {
                    out.push(format!("{}: {}", profile.name, restriction));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Demand, ProfessorRestriction, TimeGrid};
    use crate::schedule_code::{group_by_day, parse_schedule};

    fn unit(course: &str, professor: &str) -> AllocationUnit {
        let grid = TimeGrid::standard();
        let d = Demand::new(1, course, "2M1").with_professor(professor);
        let groups = group_by_day(parse_schedule("2M1", &grid).unwrap().iter(), &grid);
        AllocationUnit::whole(&d, groups)
    }

    #[test]
    fn test_violations_from_rules_and_professors() {
        let weights = ScoringWeights::default();
        let default_type = RoomType::new("classroom");
        let rules = vec![Rule::fixed_room_type("C1", "lab"), Rule::preferred_room("C1", 9)];
        let profiles = vec![ProfessorProfile::new("Grace Hopper")
            .with_restriction(ProfessorRestriction::RequiresFeature("accessible".into()))];
        let ctx = ScoringContext::new(&weights, &default_type)
            .with_rules(&rules)
            .with_professors(&profiles);

        let u = unit("C1", "grace  hopper");
        let classroom = Room::new(1, "classroom");
        let lab = Room::new(2, "lab").with_feature("accessible");

        let v = ctx.violations(&u, &classroom);
        assert_eq!(v.len(), 2);
        assert!(ctx.violations(&u, &lab).is_empty());
        assert!(ctx.has_fixing_rule("C1"));
        assert!(!ctx.has_fixing_rule("C2"));
        assert_eq!(ctx.rules_for("C1").len(), 2);
        assert!(ctx.rules_for("nope").is_empty());
    }

    #[test]
    fn test_missing_history_and_hybrids_are_neutral() {
        let weights = ScoringWeights::default();
        let default_type = RoomType::new("classroom");
        let ctx = ScoringContext::new(&weights, &default_type);
        assert_eq!(ctx.history_count("C1", RoomId(1), &[DayId(2)]), 0);
        assert!(ctx.hybrid_preference("C1", DayId(2)).is_none());
    }
}

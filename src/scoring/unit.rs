//! Allocation units: a whole demand, or one of its day groups.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{AtomicSlot, DayId, Demand, DemandId, RoomId};
use crate::schedule_code::BlockGroup;

/// Ordering key of a unit: demand id, then day (whole-demand units first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    pub demand: DemandId,
    /// `None` for a whole-demand unit.
    pub day: Option<DayId>,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.day {
            Some(d) => write!(f, "{}/day{}", self.demand, d),
            None => write!(f, "{}", self.demand),
        }
    }
}

/// What gets placed in a single room: all of a demand's blocks, or the
/// blocks of one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationUnit {
    pub key: UnitKey,
    pub course_code: String,
    pub enrollment: u32,
    pub professors: Vec<String>,
    /// Day groups covered by this unit (exactly one for a day unit).
    pub groups: Vec<BlockGroup>,
}

impl AllocationUnit {
    /// A unit covering every group of the demand.
    pub fn whole(demand: &Demand, groups: Vec<BlockGroup>) -> Self {
        Self {
            key: UnitKey {
                demand: demand.id,
                day: None,
            },
            course_code: demand.course_code.clone(),
            enrollment: demand.enrollment,
            professors: demand.professors.clone(),
            groups,
        }
    }

    /// A unit covering one day group.
    pub fn day(demand: &Demand, group: BlockGroup) -> Self {
        Self {
            key: UnitKey {
                demand: demand.id,
                day: Some(group.day),
            },
            course_code: demand.course_code.clone(),
            enrollment: demand.enrollment,
            professors: demand.professors.clone(),
            groups: vec![group],
        }
    }

    /// Splits a whole-demand unit into one unit per day.
    pub fn split_by_day(&self) -> Vec<AllocationUnit> {
        self.groups
            .iter()
            .map(|g| AllocationUnit {
                key: UnitKey {
                    demand: self.key.demand,
                    day: Some(g.day),
                },
                course_code: self.course_code.clone(),
                enrollment: self.enrollment,
                professors: self.professors.clone(),
                groups: vec![g.clone()],
            })
            .collect()
    }

    pub fn demand(&self) -> DemandId {
        self.key.demand
    }

    /// Whether this unit is a single day group.
    pub fn is_day_unit(&self) -> bool {
        self.key.day.is_some()
    }

    /// Days covered, ascending.
    pub fn days(&self) -> Vec<DayId> {
        self.groups.iter().map(|g| g.day).collect()
    }

    /// Number of atomic blocks.
    pub fn block_count(&self) -> usize {
        self.groups.iter().map(BlockGroup::len).sum()
    }

    /// Atomic slots this unit would occupy in `room`.
    pub fn slots_in(&self, room: RoomId) -> Vec<AtomicSlot> {
        self.groups
            .iter()
            .flat_map(|g| g.pairs())
            .map(|(day, block)| AtomicSlot::new(room, day, block))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockCode, TimeGrid};
    use crate::schedule_code::{group_by_day, parse_schedule};

    fn unit(code: &str) -> AllocationUnit {
        let grid = TimeGrid::standard();
        let demand = Demand::new(3, "C1", code).with_enrollment(30);
        let groups = group_by_day(parse_schedule(code, &grid).unwrap().iter(), &grid);
        AllocationUnit::whole(&demand, groups)
    }

    #[test]
    fn test_whole_unit_slots() {
        let u = unit("24M12");
        assert!(!u.is_day_unit());
        assert_eq!(u.days(), vec![DayId(2), DayId(4)]);
        assert_eq!(u.block_count(), 4);
        let slots = u.slots_in(RoomId(9));
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0], AtomicSlot::new(RoomId(9), DayId(2), BlockCode::new("M1")));
        assert!(slots.iter().all(|s| s.room == RoomId(9)));
    }

    #[test]
    fn test_split_by_day() {
        let parts = unit("24M12 6T1").split_by_day();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(AllocationUnit::is_day_unit));
        assert_eq!(parts[2].key.day, Some(DayId(6)));
        assert_eq!(parts[2].block_count(), 1);
        assert_eq!(parts[0].key.to_string(), "D3/day2");
    }

    #[test]
    fn test_unit_key_ordering() {
        let whole = UnitKey {
            demand: DemandId(1),
            day: None,
        };
        let day = UnitKey {
            demand: DemandId(1),
            day: Some(DayId(2)),
        };
        let next = UnitKey {
            demand: DemandId(2),
            day: None,
        };
        assert!(whole < day);
        assert!(day < next);
    }
}

//! Historical allocation aggregates from prior semesters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{DayId, RoomId, SemesterId};

/// How often a discipline used a room on a weekday in one past semester.
///
/// `count` is the number of atomic blocks allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub semester: SemesterId,
    pub discipline_code: String,
    pub room: RoomId,
    pub day: DayId,
    pub count: u32,
}

impl HistoryRecord {
    pub fn new(
        semester: impl Into<SemesterId>,
        discipline_code: impl Into<String>,
        room: u32,
        day: u8,
        count: u32,
    ) -> Self {
        Self {
            semester: semester.into(),
            discipline_code: discipline_code.into(),
            room: RoomId(room),
            day: DayId(day),
            count,
        }
    }
}

/// (discipline, room, day) -> occurrence count, summed over semesters.
#[derive(Debug, Clone, Default)]
pub struct HistoricalFrequency {
    counts: HashMap<(String, RoomId, DayId), u32>,
}

impl HistoricalFrequency {
    /// Aggregates records across semesters. Counts saturate at `u32::MAX`.
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        let mut counts: HashMap<(String, RoomId, DayId), u32> = HashMap::new();
        for r in records {
            let e = counts
                .entry((r.discipline_code.clone(), r.room, r.day))
                .or_insert(0);
            *e = e.saturating_add(r.count);
        }
        Self { counts }
    }

    /// Occurrences of a discipline in a room on one day.
    pub fn count(&self, discipline_code: &str, room: RoomId, day: DayId) -> u32 {
        self.counts
            .get(&(discipline_code.to_string(), room, day))
            .copied()
            .unwrap_or(0)
    }

    /// Occurrences summed over several days.
    pub fn count_over_days(&self, discipline_code: &str, room: RoomId, days: &[DayId]) -> u32 {
        days.iter()
            .map(|&d| self.count(discipline_code, room, d))
            .fold(0, u32::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_aggregation() {
        let records = vec![
            HistoryRecord::new("2023.1", "C1", 10, 2, 2),
            HistoryRecord::new("2023.2", "C1", 10, 2, 2),
            HistoryRecord::new("2023.2", "C1", 10, 4, 2),
            HistoryRecord::new("2023.2", "C2", 10, 2, 4),
        ];
        let f = HistoricalFrequency::from_records(&records);
        assert_eq!(f.count("C1", RoomId(10), DayId(2)), 4);
        assert_eq!(f.count("C1", RoomId(10), DayId(4)), 2);
        assert_eq!(f.count("C1", RoomId(11), DayId(2)), 0);
        assert_eq!(f.count_over_days("C1", RoomId(10), &[DayId(2), DayId(4)]), 6);
        assert_eq!(f.count("C2", RoomId(10), DayId(2)), 4);
    }

    #[test]
    fn test_frequency_saturates_instead_of_overflowing() {
        let records = vec![
            HistoryRecord::new("2023.1", "C1", 1, 2, u32::MAX),
            HistoryRecord::new("2023.2", "C1", 1, 2, 1),
            HistoryRecord::new("2023.2", "C1", 1, 4, 7),
        ];
        let f = HistoricalFrequency::from_records(&records);
        assert_eq!(f.count("C1", RoomId(1), DayId(2)), u32::MAX);
        assert_eq!(f.count_over_days("C1", RoomId(1), &[DayId(2), DayId(4)]), u32::MAX);
        assert_eq!(f.count("C1", RoomId(1), DayId(4)), 7);
    }

    #[test]
    fn test_empty_frequency() {
        let f = HistoricalFrequency::from_records(&[]);
        assert!(f.is_empty());
        assert_eq!(f.count("C1", RoomId(1), DayId(2)), 0);
    }
}

//! Hybrid discipline detection.
//!
//! A discipline is hybrid when its most recent completed semester used
//! at least two distinct rooms and at least one of them was not of the
//! default (regular) room type: typically a lab on some weekdays and a
//! classroom on others.
//!
//! For each hybrid discipline the detector derives a weekday → room-type
//! preference from all of its history, weighting each record by its
//! block count. The result is a read-only, precomputed map handed to the
//! scoring engine; it only ever adds bonus points and never affects
//! eligibility.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{DayId, HistoryRecord, Room, RoomId, RoomType, SemesterId};

/// Room-type preference of a hybrid discipline on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayRoomPreference {
    /// Historically taught in a specialized room of this type.
    Specialized(RoomType),
    /// Historically taught in a regular room.
    Regular,
}

impl DayRoomPreference {
    /// Whether `room` matches this preference.
    pub fn matches(&self, room: &Room, default_room_type: &RoomType) -> bool {
        match self {
            DayRoomPreference::Specialized(t) => room.room_type == *t,
            DayRoomPreference::Regular => room.room_type == *default_room_type,
        }
    }
}

/// Derived profile of one hybrid discipline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HybridProfile {
    pub discipline_code: String,
    /// Semester whose allocations triggered the classification.
    pub reference_semester: SemesterId,
    /// Distinct rooms used in the reference semester.
    pub rooms: BTreeSet<RoomId>,
    /// Preferred room type per weekday.
    pub day_preferences: BTreeMap<DayId, DayRoomPreference>,
}

impl HybridProfile {
    pub fn preference(&self, day: DayId) -> Option<&DayRoomPreference> {
        self.day_preferences.get(&day)
    }
}

/// Hybrid profiles keyed by discipline code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HybridProfiles(BTreeMap<String, HybridProfile>);

impl HybridProfiles {
    pub fn get(&self, discipline_code: &str) -> Option<&HybridProfile> {
        self.0.get(discipline_code)
    }

    pub fn is_hybrid(&self, discipline_code: &str) -> bool {
        self.0.contains_key(discipline_code)
    }

    /// Preference of a discipline on a day, if it is hybrid and the day
    /// has history.
    pub fn preference(&self, discipline_code: &str, day: DayId) -> Option<&DayRoomPreference> {
        self.get(discipline_code).and_then(|p| p.preference(day))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HybridProfile> {
        self.0.values()
    }
}

impl FromIterator<HybridProfile> for HybridProfiles {
    fn from_iter<T: IntoIterator<Item = HybridProfile>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|p| (p.discipline_code.clone(), p))
                .collect(),
        )
    }
}

/// Classifies disciplines from historical allocations.
#[derive(Debug, Clone)]
pub struct HybridDetector {
    default_room_type: RoomType,
    min_distinct_rooms: usize,
}

impl HybridDetector {
    pub fn new(default_room_type: impl Into<RoomType>) -> Self {
        Self {
            default_room_type: default_room_type.into(),
            min_distinct_rooms: 2,
        }
    }

    /// Sets the minimum number of distinct rooms for a hybrid classification.
    pub fn with_min_distinct_rooms(mut self, n: usize) -> Self {
        self.min_distinct_rooms = n.max(2);
        self
    }

    /// Detects hybrid disciplines.
    ///
    /// `current` is excluded from consideration: only completed semesters
    /// count. Records that reference rooms missing from `rooms` are
    /// ignored. A discipline with no history is never hybrid.
    pub fn detect(
        &self,
        history: &[HistoryRecord],
        rooms: &[Room],
        current: Option<&SemesterId>,
    ) -> HybridProfiles {
        let room_index: HashMap<RoomId, &Room> = rooms.iter().map(|r| (r.id, r)).collect();

        let mut by_discipline: BTreeMap<&str, Vec<&HistoryRecord>> = BTreeMap::new();
        for r in history {
            if current == Some(&r.semester) || !room_index.contains_key(&r.room) {
                continue;
            }
            by_discipline
                .entry(r.discipline_code.as_str())
                .or_default()
                .push(r);
        }

        by_discipline
            .into_iter()
            .filter_map(|(code, records)| self.classify(code, &records, &room_index))
            .collect()
    }

    fn classify(
        &self,
        code: &str,
        records: &[&HistoryRecord],
        rooms: &HashMap<RoomId, &Room>,
    ) -> Option<HybridProfile> {
        let latest = records.iter().map(|r| &r.semester).max()?;

        let used: BTreeSet<RoomId> = records
            .iter()
            .filter(|r| &r.semester == latest && r.count > 0)
            .map(|r| r.room)
            .collect();
        if used.len() < self.min_distinct_rooms {
            return None;
        }
        let any_specialized = used
            .iter()
            .filter_map(|id| rooms.get(id))
            .any(|room| room.room_type != self.default_room_type);
        if !any_specialized {
            return None;
        }

        // day -> room type -> weighted usage
        let mut usage: BTreeMap<DayId, BTreeMap<&RoomType, u32>> = BTreeMap::new();
        for r in records {
            if let Some(room) = rooms.get(&r.room) {
                let e = usage.entry(r.day).or_default().entry(&room.room_type).or_insert(0);
                *e = e.saturating_add(r.count);
            }
        }

        let day_preferences = usage
            .into_iter()
            .filter_map(|(day, tally)| {
                // Highest usage wins; BTreeMap order makes ties resolve to
                // the lexicographically smallest type.
                let (winner, count) = tally
                    .into_iter()
                    .fold(None::<(&RoomType, u32)>, |best, (t, c)| match best {
                        Some((_, bc)) if bc >= c => best,
                        _ => Some((t, c)),
                    })?;
                if count == 0 {
                    return None;
                }
                let pref = if *winner == self.default_room_type {
                    DayRoomPreference::Regular
                } else {
                    DayRoomPreference::Specialized(winner.clone())
                };
                Some((day, pref))
            })
            .collect();

        Some(HybridProfile {
            discipline_code: code.to_string(),
            reference_semester: latest.clone(),
            rooms: used,
            day_preferences,
        })
    }
}

impl Default for HybridDetector {
    fn default() -> Self {
        Self::new("classroom")
    }
}

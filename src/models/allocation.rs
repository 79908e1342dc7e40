//! Atomic slots and allocation rows.
//!
//! An [`AtomicSlot`] is one (room, day, block) cell; it is the unit of
//! conflict. An [`Allocation`] records that a demand holds one slot.
//! A demand occupying four blocks in one room produces four rows.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::{BlockCode, DayId, DemandId, RoomId};

/// Semester identifier (e.g. "2024.1").
///
/// Ordered segment by segment on `.`: numeric segments compare as numbers,
/// so "2023.10" sorts after "2023.9". Non-numeric segments compare as text
/// and sort after numeric ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemesterId(pub String);

impl SemesterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Ord for SemesterId {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut a = self.0.split('.');
        let mut b = other.0.split('.');
        loop {
            match (a.next(), b.next()) {
                (None, None) => return self.0.cmp(&other.0),
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(x), Some(y)) => {
                    let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                        (Ok(m), Ok(n)) => m.cmp(&n),
                        (Ok(_), Err(_)) => Ordering::Less,
                        (Err(_), Ok(_)) => Ordering::Greater,
                        (Err(_), Err(_)) => x.cmp(y),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
            }
        }
    }
}

impl PartialOrd for SemesterId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<String> for SemesterId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SemesterId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for SemesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (room, day, block) cell of a semester's grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AtomicSlot {
    pub room: RoomId,
    pub day: DayId,
    pub block: BlockCode,
}

impl AtomicSlot {
    pub fn new(room: RoomId, day: DayId, block: BlockCode) -> Self {
        Self { room, day, block }
    }
}

impl fmt::Display for AtomicSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}{}", self.room, self.day, self.block)
    }
}

/// A demand holding one atomic slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Allocation {
    pub demand: DemandId,
    pub room: RoomId,
    pub day: DayId,
    pub block: BlockCode,
}

impl Allocation {
    pub fn new(demand: DemandId, room: RoomId, day: DayId, block: BlockCode) -> Self {
        Self {
            demand,
            room,
            day,
            block,
        }
    }

    /// The slot this row occupies.
    pub fn slot(&self) -> AtomicSlot {
        AtomicSlot::new(self.room, self.day, self.block.clone())
    }
}

/// An externally owned ad-hoc booking of one slot (event, exam, maintenance).
///
/// Reservations block slots exactly like committed allocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub room: RoomId,
    pub day: DayId,
    pub block: BlockCode,
}

impl Reservation {
    pub fn new(id: impl Into<String>, room: u32, day: u8, block: impl AsRef<str>) -> Self {
        Self {
            id: id.into(),
            room: RoomId(room),
            day: DayId(day),
            block: BlockCode::new(block),
        }
    }

    pub fn slot(&self) -> AtomicSlot {
        AtomicSlot::new(self.room, self.day, self.block.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semester_order() {
        let sem = |s: &str| SemesterId::from(s);
        assert!(sem("2023.2") < sem("2024.1"));
        assert!(sem("2024.1") < sem("2024.2"));
        assert!(sem("2023.9") < sem("2023.10"));
        assert!(sem("2023.10") < sem("2024.1"));
        assert!(sem("2024") < sem("2024.1"));
        assert!(sem("2024.1") < sem("2024.summer"));
        assert!(sem("2024.01") != sem("2024.1"));
        assert_ne!(sem("2024.01").cmp(&sem("2024.1")), Ordering::Equal);
        let latest = ["2022.2", "2023.10", "2023.9"].into_iter().map(sem).max();
        assert_eq!(latest, Some(sem("2023.10")));
    }

    #[test]
    fn test_allocation_slot() {
        let a = Allocation::new(DemandId(1), RoomId(9), DayId(2), BlockCode::new("M1"));
        let s = a.slot();
        assert_eq!(s.room, RoomId(9));
        assert_eq!(s.day, DayId(2));
        assert_eq!(s.block.as_str(), "M1");
        assert_eq!(s.to_string(), "R9@2M1");
    }
}

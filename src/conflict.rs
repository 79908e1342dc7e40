//! Conflict index: the live record of occupied slots for one semester.
//!
//! The index folds three sources into one occupancy map:
//! allocations committed before the run, ad-hoc reservations, and
//! allocations committed by the current run. Every occupancy question a
//! run asks is answered from memory; the repository is read once when
//! the index is loaded.
//!
//! # Protocol
//! 1. [`ConflictIndex::query_occupancy`] answers a batch of candidate
//!    slots at once. The answer is a snapshot and may be used for ranking.
//! 2. Before a unit is committed, [`ConflictIndex::mark_occupied`]
//!    re-validates its exact slots against the live state and claims all
//!    of them or none.
//! 3. The claim is visible to every later check in the same run.
//!
//! The index is an owned value passed explicitly through the call chain.
//! Independent semester runs each own their own index.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{RepositoryError, StaleConflict};
use crate::models::{Allocation, AtomicSlot, DemandId, Reservation, RoomId, SemesterId};
use crate::repository::SemesterRepository;

/// Who holds an occupied slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    /// Allocated by the current run.
    Run(DemandId),
    /// Allocated before the run started.
    Committed(DemandId),
    /// Held by an ad-hoc reservation.
    Reservation(String),
}

impl Occupant {
    /// The demand holding the slot, if it is a demand.
    pub fn demand(&self) -> Option<DemandId> {
        match self {
            Occupant::Run(d) | Occupant::Committed(d) => Some(*d),
            Occupant::Reservation(_) => None,
        }
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupant::Run(d) => write!(f, "{d} (this run)"),
            Occupant::Committed(d) => write!(f, "{d} (committed)"),
            Occupant::Reservation(id) => write!(f, "reservation {id}"),
        }
    }
}

/// Occupied slots of one semester.
#[derive(Debug, Clone)]
pub struct ConflictIndex {
    semester: SemesterId,
    occupied: HashMap<AtomicSlot, Occupant>,
}

impl ConflictIndex {
    /// Creates an empty index.
    pub fn new(semester: impl Into<SemesterId>) -> Self {
        Self {
            semester: semester.into(),
            occupied: HashMap::new(),
        }
    }

    /// Loads committed allocations and reservations in one batch read each.
    pub fn load(
        semester: &SemesterId,
        repo: &dyn SemesterRepository,
    ) -> Result<Self, RepositoryError> {
        let mut index = Self::new(semester.clone());
        index.insert_committed(&repo.committed_allocations(semester)?);
        index.insert_reservations(&repo.reservations(semester)?);
        Ok(index)
    }

    /// Adds allocations committed before the run.
    pub fn insert_committed(&mut self, rows: &[Allocation]) {
        for row in rows {
            self.occupied
                .entry(row.slot())
                .or_insert(Occupant::Committed(row.demand));
        }
    }

    /// Adds ad-hoc reservations.
    pub fn insert_reservations(&mut self, reservations: &[Reservation]) {
        for r in reservations {
            self.occupied
                .entry(r.slot())
                .or_insert_with(|| Occupant::Reservation(r.id.clone()));
        }
    }

    pub fn semester(&self) -> &SemesterId {
        &self.semester
    }

    /// Answers occupancy for a batch of slots in one call.
    pub fn query_occupancy<'a, I>(&self, slots: I) -> HashMap<AtomicSlot, bool>
    where
        I: IntoIterator<Item = &'a AtomicSlot>,
    {
        slots
            .into_iter()
            .map(|s| (s.clone(), self.occupied.contains_key(s)))
            .collect()
    }

    pub fn is_occupied(&self, slot: &AtomicSlot) -> bool {
        self.occupied.contains_key(slot)
    }

    /// Current holder of a slot.
    pub fn occupant(&self, slot: &AtomicSlot) -> Option<&Occupant> {
        self.occupied.get(slot)
    }

    /// First slot of `slots` (in the given order) that is already held.
    pub fn first_conflict<'a>(
        &self,
        slots: &'a [AtomicSlot],
    ) -> Option<(&'a AtomicSlot, &Occupant)> {
        slots
            .iter()
            .find_map(|s| self.occupied.get(s).map(|o| (s, o)))
    }

    /// Whether every slot is free.
    pub fn all_free(&self, slots: &[AtomicSlot]) -> bool {
        self.first_conflict(slots).is_none()
    }

    /// Claims every slot for `demand`, or none of them.
    ///
    /// # Errors
    /// Returns [`StaleConflict`] naming the first held slot; the index is
    /// left unchanged.
    pub fn mark_occupied(
        &mut self,
        slots: &[AtomicSlot],
        demand: DemandId,
    ) -> Result<(), StaleConflict> {
        if let Some((slot, occupant)) = self.first_conflict(slots) {
            return Err(StaleConflict {
                slot: slot.clone(),
                occupant: occupant.clone(),
            });
        }
        for s in slots {
            self.occupied.insert(s.clone(), Occupant::Run(demand));
        }
        Ok(())
    }

    /// Releases slots claimed by `demand` in this run. Slots held by
    /// anyone else are left alone.
    pub fn release(&mut self, slots: &[AtomicSlot], demand: DemandId) {
        for s in slots {
            if self.occupied.get(s) == Some(&Occupant::Run(demand)) {
                self.occupied.remove(s);
            }
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    /// Occupied slot count per room.
    pub fn occupied_by_room(&self) -> HashMap<RoomId, usize> {
        let mut counts = HashMap::new();
        for slot in self.occupied.keys() {
            *counts.entry(slot.room).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockCode, DayId};
    use crate::repository::InMemoryRepository;

    fn slot(room: u32, day: u8, block: &str) -> AtomicSlot {
        AtomicSlot::new(RoomId(room), DayId(day), BlockCode::new(block))
    }

    #[test]
    fn test_load_folds_reservations_and_committed() {
        let repo = InMemoryRepository::new()
            .with_allocations(
                "2024.1",
                vec![Allocation::new(DemandId(1), RoomId(1), DayId(2), BlockCode::new("M1"))],
            )
            .with_reservations("2024.1", vec![Reservation::new("fair", 2, 3, "T1")]);

        let index = ConflictIndex::load(&SemesterId::from("2024.1"), &repo).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(repo.read_count(), 2);
        assert_eq!(index.occupant(&slot(1, 2, "M1")), Some(&Occupant::Committed(DemandId(1))));
        assert_eq!(
            index.occupant(&slot(2, 3, "T1")),
            Some(&Occupant::Reservation("fair".into()))
        );
    }

    #[test]
    fn test_query_occupancy_batch() {
        let mut index = ConflictIndex::new("2024.1");
        index.insert_reservations(&[Reservation::new("r", 1, 2, "M1")]);

        let probes = vec![slot(1, 2, "M1"), slot(1, 2, "M2"), slot(2, 2, "M1")];
        let answer = index.query_occupancy(&probes);
        assert_eq!(answer.len(), 3);
        assert!(answer[&slot(1, 2, "M1")]);
        assert!(!answer[&slot(1, 2, "M2")]);
        assert!(!answer[&slot(2, 2, "M1")]);
    }

    #[test]
    fn test_mark_occupied_is_visible_immediately() {
        let mut index = ConflictIndex::new("2024.1");
        let unit = vec![slot(1, 2, "M1"), slot(1, 2, "M2")];
        assert!(index.all_free(&unit));

        index.mark_occupied(&unit, DemandId(7)).unwrap();
        assert!(index.is_occupied(&slot(1, 2, "M2")));
        assert!(!index.all_free(&[slot(1, 2, "M2"), slot(1, 2, "M3")]));
    }

    #[test]
    fn test_mark_occupied_all_or_nothing() {
        let mut index = ConflictIndex::new("2024.1");
        index.mark_occupied(&[slot(1, 2, "M2")], DemandId(1)).unwrap();

        let err = index
            .mark_occupied(&[slot(1, 2, "M1"), slot(1, 2, "M2")], DemandId(2))
            .unwrap_err();
        assert_eq!(err.slot, slot(1, 2, "M2"));
        assert_eq!(err.occupant, Occupant::Run(DemandId(1)));
        // M1 was not claimed by the failed call
        assert!(!index.is_occupied(&slot(1, 2, "M1")));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_release_only_own_slots() {
        let mut index = ConflictIndex::new("2024.1");
        index.insert_reservations(&[Reservation::new("r", 1, 2, "M3")]);
        index
            .mark_occupied(&[slot(1, 2, "M1"), slot(1, 2, "M2")], DemandId(4))
            .unwrap();

        index.release(&[slot(1, 2, "M1"), slot(1, 2, "M3")], DemandId(4));
        assert!(!index.is_occupied(&slot(1, 2, "M1")));
        assert!(index.is_occupied(&slot(1, 2, "M2")));
        assert!(index.is_occupied(&slot(1, 2, "M3")));
    }

    #[test]
    fn test_occupied_by_room() {
        let mut index = ConflictIndex::new("2024.1");
        index
            .mark_occupied(&[slot(1, 2, "M1"), slot(1, 2, "M2"), slot(3, 4, "T1")], DemandId(1))
            .unwrap();
        let counts = index.occupied_by_room();
        assert_eq!(counts[&RoomId(1)], 2);
        assert_eq!(counts[&RoomId(3)], 1);
    }
}

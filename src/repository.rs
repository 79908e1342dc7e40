//! External collaborators of the allocation engine.
//!
//! The engine never talks to a database directly. Everything it reads per
//! semester (committed allocations, ad-hoc reservations, history) and the
//! one thing it writes (allocation rows) goes through
//! [`SemesterRepository`], so persistence technology stays outside the
//! core and tests can swap in [`InMemoryRepository`].
//!
//! # Round Trips
//! A run reads allocations and reservations once each, reads history
//! once, and writes one batch per committed allocation unit.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::RepositoryError;
use crate::models::{Allocation, AtomicSlot, HistoryRecord, Reservation, SemesterId};

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage seam for per-semester allocation data.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so independent semester runs can
/// share one repository.
pub trait SemesterRepository: Send + Sync {
    /// All allocations already committed for the semester.
    fn committed_allocations(&self, semester: &SemesterId) -> RepositoryResult<Vec<Allocation>>;

    /// Ad-hoc reservations for the semester.
    fn reservations(&self, semester: &SemesterId) -> RepositoryResult<Vec<Reservation>>;

    /// Historical records, optionally excluding one semester.
    fn history(&self, exclude: Option<&SemesterId>) -> RepositoryResult<Vec<HistoryRecord>>;

    /// Persists the rows of one allocation unit in a single write.
    ///
    /// The write is all-or-nothing.
    fn persist_allocations(&self, semester: &SemesterId, rows: &[Allocation])
        -> RepositoryResult<()>;
}

/// In-memory repository for tests, tooling and dry runs.
///
/// Enforces slot uniqueness per semester on write, the way a unique index
/// on (semester, room, day, block) would.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    allocations: RwLock<HashMap<SemesterId, Vec<Allocation>>>,
    reservations: RwLock<HashMap<SemesterId, Vec<Reservation>>>,
    history: RwLock<Vec<HistoryRecord>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds committed allocations for a semester.
    pub fn with_allocations(self, semester: impl Into<SemesterId>, rows: Vec<Allocation>) -> Self {
        self.allocations
            .write()
            .entry(semester.into())
            .or_default()
            .extend(rows);
        self
    }

    /// Seeds reservations for a semester.
    pub fn with_reservations(
        self,
        semester: impl Into<SemesterId>,
        reservations: Vec<Reservation>,
    ) -> Self {
        self.reservations
            .write()
            .entry(semester.into())
            .or_default()
            .extend(reservations);
        self
    }

    /// Seeds history records.
    pub fn with_history(self, records: Vec<HistoryRecord>) -> Self {
        self.history.write().extend(records);
        self
    }

    /// Allocations stored for a semester (snapshot).
    pub fn stored(&self, semester: &SemesterId) -> Vec<Allocation> {
        self.allocations
            .read()
            .get(semester)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of read calls served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of successful batch writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl SemesterRepository for InMemoryRepository {
    fn committed_allocations(&self, semester: &SemesterId) -> RepositoryResult<Vec<Allocation>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.stored(semester))
    }

    fn reservations(&self, semester: &SemesterId) -> RepositoryResult<Vec<Reservation>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .reservations
            .read()
            .get(semester)
            .cloned()
            .unwrap_or_default())
    }

    fn history(&self, exclude: Option<&SemesterId>) -> RepositoryResult<Vec<HistoryRecord>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .history
            .read()
            .iter()
            .filter(|r| exclude != Some(&r.semester))
            .cloned()
            .collect())
    }

    fn persist_allocations(
        &self,
        semester: &SemesterId,
        rows: &[Allocation],
    ) -> RepositoryResult<()> {
        let mut guard = self.allocations.write();
        let stored = guard.entry(semester.clone()).or_default();

        let taken: HashSet<AtomicSlot> = stored.iter().map(Allocation::slot).collect();
        let mut batch = HashSet::with_capacity(rows.len());
        for row in rows {
            let slot = row.slot();
            if taken.contains(&slot) || !batch.insert(slot.clone()) {
                return Err(RepositoryError::WriteRejected(format!(
                    "slot {slot} already allocated in semester {semester}"
                )));
            }
        }

        stored.extend_from_slice(rows);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockCode, DayId, DemandId, RoomId};

    fn row(demand: u32, room: u32, day: u8, block: &str) -> Allocation {
        Allocation::new(DemandId(demand), RoomId(room), DayId(day), BlockCode::new(block))
    }

    #[test]
    fn test_persist_and_read_back() {
        let repo = InMemoryRepository::new();
        let sem = SemesterId::from("2024.1");
        repo.persist_allocations(&sem, &[row(1, 1, 2, "M1"), row(1, 1, 2, "M2")])
            .unwrap();

        assert_eq!(repo.committed_allocations(&sem).unwrap().len(), 2);
        assert_eq!(repo.write_count(), 1);
        assert!(repo
            .committed_allocations(&SemesterId::from("2024.2"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_persist_rejects_taken_slot_atomically() {
        let repo = InMemoryRepository::new().with_allocations("2024.1", vec![row(1, 1, 2, "M1")]);
        let sem = SemesterId::from("2024.1");

        let err = repo
            .persist_allocations(&sem, &[row(2, 1, 2, "M2"), row(2, 1, 2, "M1")])
            .unwrap_err();
        assert!(matches!(err, RepositoryError::WriteRejected(_)));
        // Nothing from the rejected batch was stored
        assert_eq!(repo.stored(&sem).len(), 1);
        assert_eq!(repo.write_count(), 0);
    }

    #[test]
    fn test_history_exclusion() {
        let repo = InMemoryRepository::new().with_history(vec![
            HistoryRecord::new("2023.2", "C1", 1, 2, 2),
            HistoryRecord::new("2024.1", "C1", 1, 2, 2),
        ]);
        assert_eq!(repo.history(None).unwrap().len(), 2);
        let current = SemesterId::from("2024.1");
        let filtered = repo.history(Some(&current)).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].semester, SemesterId::from("2023.2"));
        assert_eq!(repo.read_count(), 2);
    }

    #[test]
    fn test_reservations_by_semester() {
        let repo = InMemoryRepository::new()
            .with_reservations("2024.1", vec![Reservation::new("exam-1", 3, 4, "T1")]);
        let got = repo.reservations(&SemesterId::from("2024.1")).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].slot().room, RoomId(3));
    }
}

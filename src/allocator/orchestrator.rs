//! Phased allocation of demands to rooms.
//!
//! # Algorithm
//!
//! 1. Validate the catalog; parse every schedule code (parse failures are
//!    recorded per demand).
//! 2. **HybridDetection**: read history once, classify hybrid disciplines.
//! 3. **HardRuleAllocation**: demands with a fixed-room or fixed-room-type
//!    rule go to their compliant room. Demands pinned to one room are
//!    checked pairwise first; colliding pairs are reported, not committed.
//! 4. **SoftScoring**: rank candidates for every remaining unit and take
//!    one batch occupancy snapshot.
//! 5. **AtomicAllocation**: units in descending best-score order; each
//!    tries its eligible candidates, re-validated against the live index,
//!    and commits the first free one.
//! 6. **PartialAllocation** (partial mode): whole units that found no
//!    room are retried one weekday at a time.
//!
//! # Complexity
//! O(u * r * s) scoring and O(u * r) commits in the worst case, where
//! u = units, r = rooms, s = slots per unit.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, info, instrument, warn};

use super::phase::{AllocationMode, Phase};
use super::report::{
    AllocationReport, DemandOutcome, DemandReport, PhaseRecord, ReportSummary, SkipReason,
    UnitReport,
};
use crate::config::AllocatorConfig;
use crate::conflict::{ConflictIndex, Occupant};
use crate::error::{AllocationError, HardRuleConflict};
use crate::hybrid::{HybridDetector, HybridProfiles};
use crate::models::{
    Allocation, AtomicSlot, Building, DayId, Demand, DemandId, HistoricalFrequency,
    ProfessorProfile, Room, RoomId, Rule, SemesterId, TimeGrid,
};
use crate::repository::SemesterRepository;
use crate::schedule_code::{group_by_day, parse_schedule, BlockGroup};
use crate::scoring::{AllocationUnit, Candidate, ScoringContext, ScoringEngine};
use crate::validation::validate_catalog;

/// Reference data for an allocation run.
#[derive(Debug, Clone)]
pub struct AllocationInput {
    pub grid: TimeGrid,
    pub rooms: Vec<Room>,
    pub buildings: Vec<Building>,
    pub rules: Vec<Rule>,
    pub professors: Vec<ProfessorProfile>,
    pub demands: Vec<Demand>,
}

impl AllocationInput {
    /// Creates an input with the given grid and no other data.
    pub fn new(grid: TimeGrid) -> Self {
        Self {
            grid,
            rooms: Vec::new(),
            buildings: Vec::new(),
            rules: Vec::new(),
            professors: Vec::new(),
            demands: Vec::new(),
        }
    }

    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    pub fn with_rooms(mut self, rooms: impl IntoIterator<Item = Room>) -> Self {
        self.rooms.extend(rooms);
        self
    }

    pub fn with_building(mut self, building: Building) -> Self {
        self.buildings.push(building);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_professor(mut self, profile: ProfessorProfile) -> Self {
        self.professors.push(profile);
        self
    }

    pub fn with_demand(mut self, demand: Demand) -> Self {
        self.demands.push(demand);
        self
    }

    pub fn with_demands(mut self, demands: impl IntoIterator<Item = Demand>) -> Self {
        self.demands.extend(demands);
        self
    }
}

/// Semester room allocator.
///
/// # Example
///
/// ```
/// use u_roomalloc::allocator::{AllocationInput, AllocationMode, Allocator, DemandOutcome};
/// use u_roomalloc::models::{Demand, DemandId, Room, RoomId, SemesterId, TimeGrid};
/// use u_roomalloc::repository::InMemoryRepository;
///
/// let input = AllocationInput::new(TimeGrid::standard())
///     .with_room(Room::new(1, "classroom").with_capacity(40))
///     .with_demand(Demand::new(1, "MATH101", "24M12").with_enrollment(30));
/// let repo = InMemoryRepository::new();
///
/// let report = Allocator::new(input)
///     .run(&SemesterId::from("2024.1"), AllocationMode::Full, false, &repo)
///     .unwrap();
/// assert_eq!(report.allocations.len(), 4);
/// assert_eq!(
///     report.outcome(DemandId(1)),
///     Some(&DemandOutcome::Allocated { room: RoomId(1) })
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Allocator {
    input: AllocationInput,
    config: AllocatorConfig,
    engine: ScoringEngine,
}

impl Allocator {
    /// Creates an allocator with default configuration and the standard
    /// scoring engine.
    pub fn new(input: AllocationInput) -> Self {
        Self {
            input,
            config: AllocatorConfig::default(),
            engine: ScoringEngine::standard(),
        }
    }

    pub fn with_config(mut self, config: AllocatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the scoring engine.
    pub fn with_engine(mut self, engine: ScoringEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn input(&self) -> &AllocationInput {
        &self.input
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Loads the semester's conflict index from `repo` and runs.
    ///
    /// # Errors
    /// See [`Allocator::run_allocation`].
    pub fn run(
        &self,
        semester: &SemesterId,
        mode: AllocationMode,
        dry_run: bool,
        repo: &dyn SemesterRepository,
    ) -> Result<AllocationReport, AllocationError> {
        validate_catalog(&self.input).map_err(AllocationError::Catalog)?;
        let mut index = ConflictIndex::load(semester, repo)?;
        self.execute(semester, mode, dry_run, repo, &mut index)
    }

    /// Runs allocation against a caller-owned conflict index.
    ///
    /// A dry run works on a copy of `index` and writes nothing, so the
    /// caller's index and the repository are left untouched. Otherwise
    /// every committed unit is persisted in one batch and stays marked in
    /// `index`.
    ///
    /// # Errors
    /// * [`AllocationError::Catalog`] if the reference data is inconsistent
    /// * [`AllocationError::SemesterMismatch`] if `index` belongs to another semester
    /// * [`AllocationError::Repository`] if a read or write fails; the slots
    ///   of the failed write are released first
    pub fn run_allocation(
        &self,
        semester: &SemesterId,
        mode: AllocationMode,
        dry_run: bool,
        repo: &dyn SemesterRepository,
        index: &mut ConflictIndex,
    ) -> Result<AllocationReport, AllocationError> {
        validate_catalog(&self.input).map_err(AllocationError::Catalog)?;
        if index.semester() != semester {
            return Err(AllocationError::SemesterMismatch {
                index: index.semester().clone(),
                requested: semester.clone(),
            });
        }
        self.execute(semester, mode, dry_run, repo, index)
    }

    #[instrument(level = "info", skip_all, fields(semester = %semester, ?mode, dry_run = dry_run))]
    fn execute(
        &self,
        semester: &SemesterId,
        mode: AllocationMode,
        dry_run: bool,
        repo: &dyn SemesterRepository,
        index: &mut ConflictIndex,
    ) -> Result<AllocationReport, AllocationError> {
        let mut scratch;
        let index = if dry_run {
            scratch = index.clone();
            &mut scratch
        } else {
            index
        };

        let mut run = RunState::new(self, semester, mode, dry_run, repo, index);
        run.parse_demands(&self.input.demands);

        // HybridDetection
        let exclude = self
            .config
            .history
            .exclude_current_semester
            .then_some(semester);
        let history = repo.history(exclude)?;
        // Classification only looks at completed semesters, whatever the
        // history query included.
        let hybrids = HybridDetector::new(self.config.hybrid.room_type())
            .with_min_distinct_rooms(self.config.hybrid.min_distinct_rooms)
            .detect(&history, &self.input.rooms, Some(semester));
        let frequency = HistoricalFrequency::from_records(&history);
        let mut record = PhaseRecord::new(Phase::HybridDetection);
        record.units_seen = run.groups.len();
        info!(
            phase = %Phase::HybridDetection,
            history = history.len(),
            hybrids = hybrids.len(),
            "hybrid detection done"
        );
        run.phases.push(record);

        let default_type = self.config.hybrid.room_type();
        let ctx = ScoringContext::new(&self.config.weights, &default_type)
            .with_rules(&self.input.rules)
            .with_professors(&self.input.professors)
            .with_history(&frequency)
            .with_hybrids(&hybrids);

        let mut phase = Phase::HybridDetection.next(mode);
        while !phase.is_terminal() {
            let record = match phase {
                Phase::HardRuleAllocation => run.hard_rule_allocation(&ctx)?,
                Phase::SoftScoring => run.soft_scoring(&ctx, &hybrids),
                Phase::AtomicAllocation => run.atomic_allocation()?,
                Phase::PartialAllocation => run.partial_allocation(&ctx)?,
                Phase::HybridDetection | Phase::Done => break,
            };
            info!(
                phase = %phase,
                seen = record.units_seen,
                allocated = record.units_allocated,
                skipped = record.units_skipped,
                "phase done"
            );
            run.phases.push(record);
            phase = phase.next(mode);
        }

        let report = run.finish(&hybrids);
        info!(
            allocated = report.summary.allocated,
            split = report.summary.split,
            skipped = report.summary.skipped,
            conflicts = report.conflicts.len(),
            rows = report.allocations.len(),
            "allocation run finished"
        );
        Ok(report)
    }
}

/// A ranked unit awaiting commit.
struct Scored {
    unit: AllocationUnit,
    candidates: Vec<Candidate>,
    /// Per candidate: first slot already occupied in the batch snapshot.
    snapshot_taken: Vec<Option<AtomicSlot>>,
}

impl Scored {
    fn best_score(&self) -> u64 {
        self.candidates
            .iter()
            .find(|c| c.eligible)
            .map(|c| c.score)
            .unwrap_or(0)
    }
}

enum Placement {
    Placed,
    NoEligible,
    /// Every eligible room was taken; holds the first contested slot of
    /// each room tried, in rank order.
    Conflicted(Vec<(AtomicSlot, Occupant)>),
}

/// Mutable state of one run. Owns nothing the caller sees until `finish`.
struct RunState<'r> {
    allocator: &'r Allocator,
    semester: &'r SemesterId,
    mode: AllocationMode,
    dry_run: bool,
    repo: &'r dyn SemesterRepository,
    index: &'r mut ConflictIndex,
    demands: BTreeMap<DemandId, &'r Demand>,
    groups: BTreeMap<DemandId, Vec<BlockGroup>>,
    /// Outcomes decided before placement (parse errors, hard conflicts).
    decided: BTreeMap<DemandId, DemandOutcome>,
    hard: BTreeSet<DemandId>,
    placed: BTreeMap<DemandId, BTreeMap<DayId, RoomId>>,
    whole_skips: BTreeMap<DemandId, SkipReason>,
    day_skips: BTreeMap<DemandId, BTreeMap<DayId, SkipReason>>,
    units: BTreeMap<DemandId, Vec<UnitReport>>,
    rows: Vec<Allocation>,
    conflicts: Vec<HardRuleConflict>,
    phases: Vec<PhaseRecord>,
    queue: Vec<Scored>,
    retry: Vec<AllocationUnit>,
}

impl<'r> RunState<'r> {
    fn new(
        allocator: &'r Allocator,
        semester: &'r SemesterId,
        mode: AllocationMode,
        dry_run: bool,
        repo: &'r dyn SemesterRepository,
        index: &'r mut ConflictIndex,
    ) -> Self {
        Self {
            allocator,
            semester,
            mode,
            dry_run,
            repo,
            index,
            demands: BTreeMap::new(),
            groups: BTreeMap::new(),
            decided: BTreeMap::new(),
            hard: BTreeSet::new(),
            placed: BTreeMap::new(),
            whole_skips: BTreeMap::new(),
            day_skips: BTreeMap::new(),
            units: BTreeMap::new(),
            rows: Vec::new(),
            conflicts: Vec::new(),
            phases: Vec::new(),
            queue: Vec::new(),
            retry: Vec::new(),
        }
    }

    fn parse_demands(&mut self, demands: &'r [Demand]) {
        let allocator = self.allocator;
        let grid = &allocator.input.grid;
        for d in demands {
            self.demands.insert(d.id, d);
            match parse_schedule(&d.schedule_code, grid) {
                Ok(parsed) => {
                    self.groups.insert(d.id, group_by_day(parsed.iter(), grid));
                }
                Err(e) => {
                    warn!(demand = %d.id, code = %d.schedule_code, error = %e, "unparseable schedule code");
                    self.decided.insert(
                        d.id,
                        DemandOutcome::Skipped {
                            reason: SkipReason::ParseError(e.to_string()),
                        },
                    );
                }
            }
        }
    }

    fn whole_unit(&self, id: DemandId) -> Option<AllocationUnit> {
        let demand = self.demands.get(&id)?;
        let groups = self.groups.get(&id)?;
        Some(AllocationUnit::whole(demand, groups.clone()))
    }

    #[instrument(level = "info", skip_all)]
    fn hard_rule_allocation(
        &mut self,
        ctx: &ScoringContext<'_>,
    ) -> Result<PhaseRecord, AllocationError> {
        let mut record = PhaseRecord::new(Phase::HardRuleAllocation);
        let allocator = self.allocator;
        let engine = &allocator.engine;
        let rooms = &allocator.input.rooms;

        let ids: Vec<DemandId> = self
            .groups
            .keys()
            .copied()
            .filter(|id| ctx.has_fixing_rule(&self.demands[id].course_code))
            .collect();
        self.hard.extend(ids.iter().copied());

        let mut ranked: Vec<(AllocationUnit, Vec<Candidate>)> = ids
            .iter()
            .filter_map(|&id| self.whole_unit(id))
            .map(|unit| {
                let candidates = engine.rank(&unit, rooms, ctx);
                (unit, candidates)
            })
            .collect();
        record.units_seen = ranked.len();

        // Demands pinned to a single room collide if they share any slot.
        let mut holders: BTreeMap<AtomicSlot, DemandId> = BTreeMap::new();
        let mut pairs: HashSet<(DemandId, DemandId)> = HashSet::new();
        for (unit, candidates) in &ranked {
            let Some(room) = sole_eligible(candidates) else {
                continue;
            };
            for slot in unit.slots_in(room) {
                match holders.get(&slot) {
                    Some(&other) => {
                        let conflict = HardRuleConflict::new(other, unit.demand(), slot);
                        self.record_conflict(conflict, &mut pairs);
                    }
                    None => {
                        holders.insert(slot, unit.demand());
                    }
                }
            }
        }

        // Pinned demands first, then the rest, each by demand id.
        ranked.sort_by_key(|(unit, candidates)| (sole_eligible(candidates).is_none(), unit.key));

        for (unit, candidates) in ranked {
            let id = unit.demand();
            if self.decided.contains_key(&id) {
                record.units_skipped += 1;
                self.units.entry(id).or_default().push(UnitReport {
                    key: unit.key,
                    candidates,
                    chosen: None,
                    conflicted: Vec::new(),
                });
                continue;
            }

            match self.place(&unit, &candidates, None)? {
                Placement::Placed => record.units_allocated += 1,
                Placement::NoEligible => {
                    record.units_skipped += 1;
                    self.whole_skips.insert(id, SkipReason::NoEligibleRoom);
                }
                Placement::Conflicted(contested) => {
                    record.units_skipped += 1;
                    let held_by_hard = |o: &Occupant| match o {
                        Occupant::Run(d) => self.hard.contains(d),
                        _ => false,
                    };
                    if contested.iter().all(|(_, o)| held_by_hard(o)) {
                        if let Some((slot, Occupant::Run(holder))) = contested.first() {
                            let conflict = HardRuleConflict::new(*holder, id, slot.clone());
                            self.record_conflict(conflict, &mut pairs);
                        }
                    } else {
                        self.whole_skips.insert(
                            id,
                            SkipReason::AllCandidatesConflicted {
                                tried: contested.len(),
                            },
                        );
                    }
                }
            }
            self.push_unit_report(unit, candidates);
        }
        Ok(record)
    }

    fn record_conflict(
        &mut self,
        conflict: HardRuleConflict,
        pairs: &mut HashSet<(DemandId, DemandId)>,
    ) {
        if !pairs.insert((conflict.first, conflict.second)) {
            return;
        }
        warn!(%conflict, "hard rule conflict");
        for id in [conflict.first, conflict.second] {
            // A demand already placed by this run keeps its room.
            if !self.placed.contains_key(&id) {
                self.decided
                    .entry(id)
                    .or_insert_with(|| DemandOutcome::HardConflict {
                        conflict: conflict.clone(),
                    });
            }
        }
        self.conflicts.push(conflict);
    }

    #[instrument(level = "info", skip_all)]
    fn soft_scoring(&mut self, ctx: &ScoringContext<'_>, hybrids: &HybridProfiles) -> PhaseRecord {
        let mut record = PhaseRecord::new(Phase::SoftScoring);
        let mut units = Vec::new();
        let ids: Vec<DemandId> = self
            .groups
            .keys()
            .copied()
            .filter(|id| !self.hard.contains(id) && !self.decided.contains_key(id))
            .collect();
        for id in ids {
            let Some(unit) = self.whole_unit(id) else {
                continue;
            };
            let split = self.mode == AllocationMode::Partial
                && unit.groups.len() > 1
                && hybrids.is_hybrid(&unit.course_code);
            if split {
                debug!(demand = %id, "hybrid discipline scored per day");
                units.extend(unit.split_by_day());
            } else {
                units.push(unit);
            }
        }
        record.units_seen = units.len();
        self.queue = self.score(units, ctx);
        record
    }

    /// Ranks units, takes one occupancy snapshot for all eligible
    /// candidates, and orders units by descending best score.
    fn score(&self, units: Vec<AllocationUnit>, ctx: &ScoringContext<'_>) -> Vec<Scored> {
        let engine = &self.allocator.engine;
        let rooms = &self.allocator.input.rooms;
        let ranked = engine.rank_all(&units, rooms, ctx, self.allocator.config.parallel_scoring);

        let probe: Vec<AtomicSlot> = units
            .iter()
            .zip(&ranked)
            .flat_map(|(unit, candidates)| {
                candidates
                    .iter()
                    .filter(|c| c.eligible)
                    .flat_map(move |c| unit.slots_in(c.room))
            })
            .collect();
        let snapshot = self.index.query_occupancy(&probe);

        let mut scored: Vec<Scored> = units
            .into_iter()
            .zip(ranked)
            .map(|(unit, candidates)| {
                let snapshot_taken = candidates
                    .iter()
                    .map(|c| {
                        if !c.eligible {
                            return None;
                        }
                        unit.slots_in(c.room)
                            .into_iter()
                            .find(|s| snapshot.get(s).copied().unwrap_or(false))
                    })
                    .collect();
                Scored {
                    unit,
                    candidates,
                    snapshot_taken,
                }
            })
            .collect();
        scored.sort_by_key(|s| (Reverse(s.best_score()), s.unit.key));
        scored
    }

    #[instrument(level = "info", skip_all)]
    fn atomic_allocation(&mut self) -> Result<PhaseRecord, AllocationError> {
        let mut record = PhaseRecord::new(Phase::AtomicAllocation);
        let queue = std::mem::take(&mut self.queue);
        record.units_seen = queue.len();
        for scored in queue {
            let splittable = self.mode == AllocationMode::Partial
                && !scored.unit.is_day_unit()
                && scored.unit.groups.len() > 1;
            if self.place_scored(scored, splittable)? {
                record.units_allocated += 1;
            } else {
                record.units_skipped += 1;
            }
        }
        Ok(record)
    }

    #[instrument(level = "info", skip_all)]
    fn partial_allocation(
        &mut self,
        ctx: &ScoringContext<'_>,
    ) -> Result<PhaseRecord, AllocationError> {
        let mut record = PhaseRecord::new(Phase::PartialAllocation);
        let units = std::mem::take(&mut self.retry);
        record.units_seen = units.len();
        for scored in self.score(units, ctx) {
            if self.place_scored(scored, false)? {
                record.units_allocated += 1;
            } else {
                record.units_skipped += 1;
            }
        }
        Ok(record)
    }

    /// Places one ranked unit. A failed unit is queued for per-day retry
    /// when `splittable`, otherwise its skip reason is recorded.
    fn place_scored(&mut self, scored: Scored, splittable: bool) -> Result<bool, AllocationError> {
        let Scored {
            unit,
            candidates,
            snapshot_taken,
        } = scored;
        let placement = self.place(&unit, &candidates, Some(&snapshot_taken))?;
        let placed = matches!(placement, Placement::Placed);
        let reason = match placement {
            Placement::Placed => None,
            Placement::NoEligible => Some(SkipReason::NoEligibleRoom),
            Placement::Conflicted(contested) => Some(SkipReason::AllCandidatesConflicted {
                tried: contested.len(),
            }),
        };

        if let Some(reason) = reason {
            if splittable {
                debug!(unit = %unit.key, %reason, "retrying per day");
                self.retry.extend(unit.split_by_day());
            } else if let Some(day) = unit.key.day {
                self.day_skips
                    .entry(unit.demand())
                    .or_default()
                    .insert(day, reason);
            } else {
                self.whole_skips.insert(unit.demand(), reason);
            }
        }
        self.push_unit_report(unit, candidates);
        Ok(placed)
    }

    /// Tries eligible candidates in rank order and commits the first one
    /// whose slots are free in the live index.
    fn place(
        &mut self,
        unit: &AllocationUnit,
        candidates: &[Candidate],
        snapshot_taken: Option<&[Option<AtomicSlot>]>,
    ) -> Result<Placement, AllocationError> {
        let mut contested = Vec::new();
        let mut any_eligible = false;

        for (i, candidate) in candidates.iter().enumerate() {
            if !candidate.eligible {
                continue;
            }
            any_eligible = true;

            // Occupied in the snapshot means occupied now: the index only
            // grows between snapshot and commit.
            let taken = snapshot_taken
                .and_then(|t| t.get(i))
                .and_then(Option::as_ref)
                .and_then(|slot| Some((slot.clone(), self.index.occupant(slot)?.clone())));
            if let Some(held) = taken {
                contested.push(held);
                continue;
            }

            // Free in the snapshot is re-checked against the live index.
            let slots = unit.slots_in(candidate.room);
            if let Some((slot, occupant)) = self.index.first_conflict(&slots) {
                debug!(unit = %unit.key, room = %candidate.room, %slot, %occupant, "candidate taken since snapshot");
                contested.push((slot.clone(), occupant.clone()));
                continue;
            }

            if self.commit(unit, candidate.room, &slots)? {
                return Ok(Placement::Placed);
            }
            if let Some((slot, occupant)) = self.index.first_conflict(&slots) {
                contested.push((slot.clone(), occupant.clone()));
            }
        }

        if any_eligible {
            Ok(Placement::Conflicted(contested))
        } else {
            Ok(Placement::NoEligible)
        }
    }

    /// Claims `slots` in the live index, then persists them as one batch.
    ///
    /// Returns `Ok(false)` if the claim hit an occupied slot. A failed
    /// write releases the claim before the error propagates.
    fn commit(
        &mut self,
        unit: &AllocationUnit,
        room: RoomId,
        slots: &[AtomicSlot],
    ) -> Result<bool, AllocationError> {
        let demand = unit.demand();
        if let Err(stale) = self.index.mark_occupied(slots, demand) {
            warn!(unit = %unit.key, error = %stale, "stale conflict on commit");
            return Ok(false);
        }

        let rows: Vec<Allocation> = slots
            .iter()
            .map(|s| Allocation::new(demand, s.room, s.day, s.block.clone()))
            .collect();
        if !self.dry_run {
            if let Err(e) = self.repo.persist_allocations(self.semester, &rows) {
                self.index.release(slots, demand);
                warn!(unit = %unit.key, error = %e, "persist failed, claim released");
                return Err(e.into());
            }
        }

        debug!(unit = %unit.key, %room, slots = rows.len(), "unit allocated");
        let days = self.placed.entry(demand).or_default();
        for g in &unit.groups {
            days.insert(g.day, room);
        }
        self.rows.extend(rows);
        Ok(true)
    }

    fn push_unit_report(&mut self, unit: AllocationUnit, candidates: Vec<Candidate>) {
        let chosen = match unit.key.day {
            Some(day) => self.placed.get(&unit.demand()).and_then(|d| d.get(&day)).copied(),
            None => unit
                .groups
                .first()
                .and_then(|g| self.placed.get(&unit.demand())?.get(&g.day).copied()),
        };
        let conflicted = candidates
            .iter()
            .filter(|c| c.eligible)
            .map(|c| c.room)
            .take_while(|&r| Some(r) != chosen)
            .collect();
        self.units.entry(unit.demand()).or_default().push(UnitReport {
            key: unit.key,
            candidates,
            chosen,
            conflicted,
        });
    }

    fn outcome(&self, id: DemandId) -> DemandOutcome {
        if let Some(outcome) = self.decided.get(&id) {
            return outcome.clone();
        }
        let days: Vec<DayId> = self
            .groups
            .get(&id)
            .map(|g| g.iter().map(|g| g.day).collect())
            .unwrap_or_default();
        let placed = self.placed.get(&id).cloned().unwrap_or_default();
        let fallback = || {
            self.whole_skips
                .get(&id)
                .cloned()
                .unwrap_or(SkipReason::NoEligibleRoom)
        };

        if !days.is_empty() && days.iter().all(|d| placed.contains_key(d)) {
            let distinct: BTreeSet<RoomId> = placed.values().copied().collect();
            return match distinct.iter().next() {
                Some(&room) if distinct.len() == 1 => DemandOutcome::Allocated { room },
                _ => DemandOutcome::Split { rooms: placed },
            };
        }

        let day_skips = self.day_skips.get(&id);
        if placed.is_empty() {
            let reason = day_skips
                .and_then(|s| s.values().next().cloned())
                .unwrap_or_else(fallback);
            return DemandOutcome::Skipped { reason };
        }

        let skipped = days
            .iter()
            .filter(|d| !placed.contains_key(*d))
            .map(|d| {
                let reason = day_skips
                    .and_then(|s| s.get(d).cloned())
                    .unwrap_or_else(fallback);
                (*d, reason)
            })
            .collect();
        DemandOutcome::PartiallyAllocated {
            rooms: placed,
            skipped,
        }
    }

    fn finish(mut self, hybrids: &HybridProfiles) -> AllocationReport {
        let mut demands: Vec<DemandReport> = self
            .demands
            .values()
            .map(|d| DemandReport {
                demand: d.id,
                course_code: d.course_code.clone(),
                hybrid: hybrids.is_hybrid(&d.course_code),
                outcome: self.outcome(d.id),
                units: Vec::new(),
            })
            .collect();
        for r in &mut demands {
            r.units = self.units.remove(&r.demand).unwrap_or_default();
        }

        let input = &self.allocator.input;
        let summary = ReportSummary::calculate(
            &demands,
            &self.rows,
            &*self.index,
            input.rooms.iter().map(|r| r.id),
            input.grid.cells_per_week(),
        );

        AllocationReport {
            semester: self.semester.clone(),
            mode: self.mode,
            dry_run: self.dry_run,
            demands,
            allocations: self.rows,
            conflicts: self.conflicts,
            phases: self.phases,
            summary,
        }
    }
}

/// The only eligible room of a ranked list, if exactly one.
fn sole_eligible(candidates: &[Candidate]) -> Option<RoomId> {
    let mut eligible = candidates.iter().filter(|c| c.eligible);
    match (eligible.next(), eligible.next()) {
        (Some(c), None) => Some(c.room),
        _ => None,
    }
}

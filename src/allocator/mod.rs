//! Allocation orchestrator.
//!
//! Drives a fixed-order phase pipeline over one semester and produces an
//! [`AllocationReport`]. Everything the run depends on is passed in
//! explicitly: reference data as [`AllocationInput`], storage as a
//! [`crate::repository::SemesterRepository`], and occupancy as a
//! [`crate::conflict::ConflictIndex`] owned by the caller.
//!
//! # Concurrency
//!
//! Commits within a run are strictly sequential, since each one changes
//! what the next unit may use. Scoring is read-only and may run on the
//! rayon pool. Independent semesters share nothing mutable and can run
//! on separate threads, each with its own index.
//!
//! # Failure Policy
//!
//! Per-demand failures (unparseable schedule code, no eligible room,
//! every candidate occupied, hard-rule conflict) are recorded in the
//! report and never abort the run. Catalog inconsistencies and
//! repository failures abort it with [`crate::error::AllocationError`].

mod orchestrator;
mod phase;
mod report;

pub use orchestrator::{AllocationInput, Allocator};
pub use phase::{AllocationMode, Phase};
pub use report::{
    AllocationReport, DemandOutcome, DemandReport, PhaseRecord, ReportSummary, SkipReason,
    UnitReport,
};

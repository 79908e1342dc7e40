//! Error types.
//!
//! Per-demand failures ([`ScheduleCodeError`], [`HardRuleConflict`]) are
//! recorded in the allocation report and never abort a run. Only
//! [`AllocationError`] aborts a run: catalog inconsistencies, a conflict
//! index loaded for another semester, and repository failures.

use serde::{Deserialize, Serialize};

use crate::conflict::Occupant;
use crate::models::{AtomicSlot, BlockCode, DemandId, SemesterId};
use crate::validation::ValidationError;

/// A schedule code that cannot be parsed against the time grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ScheduleCodeError {
    #[error("empty schedule code")]
    Empty,

    #[error("malformed token '{token}': {reason}")]
    MalformedToken { token: String, reason: String },

    #[error("day {day} in token '{token}' is not a teaching day")]
    UnknownDay { token: String, day: u8 },

    #[error("block {block} in token '{token}' is not in the time grid")]
    UnknownBlock { token: String, block: BlockCode },
}

impl ScheduleCodeError {
    pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

/// Two demands whose mandatory constraints claim the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("hard rule conflict: {first} and {second} both require {slot}")]
pub struct HardRuleConflict {
    pub first: DemandId,
    pub second: DemandId,
    pub slot: AtomicSlot,
}

impl HardRuleConflict {
    /// Builds a conflict with the lower demand id first.
    pub fn new(a: DemandId, b: DemandId, slot: AtomicSlot) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first,
            second,
            slot,
        }
    }

    pub fn involves(&self, demand: DemandId) -> bool {
        self.first == demand || self.second == demand
    }
}

/// A commit attempted against a slot the live index already holds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("slot {slot} already held by {occupant}")]
pub struct StaleConflict {
    pub slot: AtomicSlot,
    pub occupant: Occupant,
}

/// Errors raised by external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Write rejected: {0}")]
    WriteRejected(String),
}

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that abort a whole allocation run.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("catalog inconsistency ({} problem(s)): {}", .0.len(), summarize(.0))]
    Catalog(Vec<ValidationError>),

    #[error("conflict index belongs to semester {index}, run requested {requested}")]
    SemesterMismatch {
        index: SemesterId,
        requested: SemesterId,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

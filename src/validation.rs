//! Catalog validation for allocation runs.
//!
//! Checks structural integrity of the reference data before any phase
//! runs. Detects:
//! - Duplicate room and demand IDs
//! - Rules referencing unknown rooms or buildings
//! - Professor profiles referencing unknown rooms
//! - An empty time grid or duplicate block codes
//!
//! Every finding is fatal for the run. Per-demand problems such as a
//! malformed schedule code are not catalog errors; they are reported per
//! demand by the allocator.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::allocator::AllocationInput;
use crate::models::RuleKind;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A rule or profile references a room that doesn't exist.
    InvalidRoomReference,
    /// A rule references a building that doesn't exist.
    InvalidBuildingReference,
    /// The time grid has no days or no blocks.
    EmptyGrid,
    /// Two time blocks share a code.
    DuplicateBlockCode,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the reference data of an allocation run.
///
/// Checks:
/// 1. The grid has at least one day and one block
/// 2. No duplicate block codes
/// 3. No duplicate room IDs
/// 4. No duplicate demand IDs
/// 5. Room references in rules point to existing rooms
/// 6. Building references in rules point to existing buildings
/// 7. Preferred rooms in professor profiles point to existing rooms
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(input: &AllocationInput) -> ValidationResult {
    let mut errors = Vec::new();

    if input.grid.days().is_empty() || input.grid.blocks().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyGrid,
            format!(
                "Time grid has {} day(s) and {} block(s)",
                input.grid.days().len(),
                input.grid.blocks().len()
            ),
        ));
    }

    for code in input.grid.duplicate_block_codes() {
        errors.push(ValidationError::new(
            ValidationErrorKind::DuplicateBlockCode,
            format!("Duplicate block code: {code}"),
        ));
    }

    let mut room_ids = HashSet::new();
    for r in &input.rooms {
        if !room_ids.insert(r.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
    }

    let mut demand_ids = HashSet::new();
    for d in &input.demands {
        if !demand_ids.insert(d.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate demand ID: {}", d.id),
            ));
        }
    }

    let building_ids: HashSet<_> = input.buildings.iter().map(|b| b.id).collect();
    for rule in &input.rules {
        match &rule.kind {
            RuleKind::FixedRoom(id) | RuleKind::PreferredRoom(id) if !room_ids.contains(id) => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRoomReference,
                    format!(
                        "Rule for '{}' references unknown room {}",
                        rule.discipline_code, id
                    ),
                ));
            }
            RuleKind::PreferredBuilding(b) if !building_ids.contains(b) => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidBuildingReference,
                    format!(
                        "Rule for '{}' references unknown building {}",
                        rule.discipline_code, b.0
                    ),
                ));
            }
            _ => {}
        }
    }

    for profile in &input.professors {
        for id in &profile.preferred_rooms {
            if !room_ids.contains(id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRoomReference,
                    format!(
                        "Professor '{}' prefers unknown room {}",
                        profile.name, id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

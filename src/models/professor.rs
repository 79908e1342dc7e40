//! Professor profiles: hard restrictions and soft preferences.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Room, RoomId};

/// A mandatory restriction on the rooms a professor can teach in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfessorRestriction {
    /// The room must have a characteristic (e.g. "accessible" for reduced mobility).
    RequiresFeature(String),
    /// The room must be at or below this floor.
    MaxFloor(i16),
}

impl ProfessorRestriction {
    pub fn is_satisfied_by(&self, room: &Room) -> bool {
        match self {
            ProfessorRestriction::RequiresFeature(f) => room.has_feature(f),
            ProfessorRestriction::MaxFloor(max) => room.floor <= *max,
        }
    }
}

impl fmt::Display for ProfessorRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfessorRestriction::RequiresFeature(x) => write!(f, "requires feature {x}"),
            ProfessorRestriction::MaxFloor(n) => write!(f, "max floor {n}"),
        }
    }
}

/// Restrictions and preferences for one professor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfessorProfile {
    /// Professor name as it appears on demands.
    pub name: String,
    pub restrictions: Vec<ProfessorRestriction>,
    pub preferred_rooms: Vec<RoomId>,
    pub preferred_features: Vec<String>,
}

impl ProfessorProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_restriction(mut self, restriction: ProfessorRestriction) -> Self {
        self.restrictions.push(restriction);
        self
    }

    pub fn with_preferred_room(mut self, room: u32) -> Self {
        self.preferred_rooms.push(RoomId(room));
        self
    }

    pub fn with_preferred_feature(mut self, feature: impl Into<String>) -> Self {
        self.preferred_features.push(feature.into());
        self
    }

    /// Lookup key for this profile.
    pub fn key(&self) -> String {
        Self::key_for(&self.name)
    }

    /// Normalized lookup key for a professor name (trimmed, case-folded,
    /// inner whitespace collapsed).
    pub fn key_for(name: &str) -> String {
        name.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalization() {
        assert_eq!(ProfessorProfile::key_for("  Ada   LOVELACE "), "ada lovelace");
        assert_eq!(ProfessorProfile::new("Ada Lovelace").key(), "ada lovelace");
    }

    #[test]
    fn test_restrictions() {
        let ground = Room::new(1, "classroom").on_floor(0).with_feature("accessible");
        let upper = Room::new(2, "classroom").on_floor(3);

        let mobility = ProfessorRestriction::RequiresFeature("accessible".into());
        assert!(mobility.is_satisfied_by(&ground));
        assert!(!mobility.is_satisfied_by(&upper));

        let floor = ProfessorRestriction::MaxFloor(1);
        assert!(floor.is_satisfied_by(&ground));
        assert!(!floor.is_satisfied_by(&upper));
    }
}

//! Allocation rules.
//!
//! Rules target a discipline (course code) and constrain or bias which
//! rooms its demands may use. Hard rules decide eligibility; soft rules
//! only add score.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{BuildingId, Room, RoomId, RoomType};

/// What a rule requires or prefers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    /// Hard: the demand must use exactly this room.
    FixedRoom(RoomId),
    /// Hard: the demand must use a room of this type.
    FixedRoomType(RoomType),
    /// Hard: the room must have this characteristic.
    RequiredFeature(String),
    /// Soft: this room is preferred.
    PreferredRoom(RoomId),
    /// Soft: rooms of this type are preferred.
    PreferredRoomType(RoomType),
    /// Soft: rooms with this characteristic are preferred.
    PreferredFeature(String),
    /// Soft: rooms in this building are preferred.
    PreferredBuilding(BuildingId),
}

impl RuleKind {
    /// Whether violating this rule makes a room ineligible.
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            RuleKind::FixedRoom(_) | RuleKind::FixedRoomType(_) | RuleKind::RequiredFeature(_)
        )
    }

    /// Whether this rule pins the demand to a room or room type.
    pub fn is_fixing(&self) -> bool {
        matches!(self, RuleKind::FixedRoom(_) | RuleKind::FixedRoomType(_))
    }

    /// Whether `room` satisfies (hard) or matches (soft) this rule.
    pub fn is_satisfied_by(&self, room: &Room) -> bool {
        match self {
            RuleKind::FixedRoom(id) | RuleKind::PreferredRoom(id) => room.id == *id,
            RuleKind::FixedRoomType(t) | RuleKind::PreferredRoomType(t) => room.room_type == *t,
            RuleKind::RequiredFeature(f) | RuleKind::PreferredFeature(f) => room.has_feature(f),
            RuleKind::PreferredBuilding(b) => room.building == *b,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::FixedRoom(id) => write!(f, "fixed room {id}"),
            RuleKind::FixedRoomType(t) => write!(f, "fixed room type {t}"),
            RuleKind::RequiredFeature(x) => write!(f, "required feature {x}"),
            RuleKind::PreferredRoom(id) => write!(f, "preferred room {id}"),
            RuleKind::PreferredRoomType(t) => write!(f, "preferred room type {t}"),
            RuleKind::PreferredFeature(x) => write!(f, "preferred feature {x}"),
            RuleKind::PreferredBuilding(b) => write!(f, "preferred building {}", b.0),
        }
    }
}

/// A rule bound to a discipline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Course code the rule applies to.
    pub discipline_code: String,
    pub kind: RuleKind,
}

impl Rule {
    pub fn new(discipline_code: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            discipline_code: discipline_code.into(),
            kind,
        }
    }

    /// Creates a fixed-room rule.
    pub fn fixed_room(discipline_code: impl Into<String>, room: u32) -> Self {
        Self::new(discipline_code, RuleKind::FixedRoom(RoomId(room)))
    }

    /// Creates a fixed-room-type rule.
    pub fn fixed_room_type(discipline_code: impl Into<String>, room_type: impl Into<RoomType>) -> Self {
        Self::new(discipline_code, RuleKind::FixedRoomType(room_type.into()))
    }

    /// Creates a required-feature rule.
    pub fn required_feature(discipline_code: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::new(discipline_code, RuleKind::RequiredFeature(feature.into()))
    }

    /// Creates a preferred-feature rule.
    pub fn preferred_feature(discipline_code: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::new(discipline_code, RuleKind::PreferredFeature(feature.into()))
    }

    /// Creates a preferred-room rule.
    pub fn preferred_room(discipline_code: impl Into<String>, room: u32) -> Self {
        Self::new(discipline_code, RuleKind::PreferredRoom(RoomId(room)))
    }

    pub fn is_hard(&self) -> bool {
        self.kind.is_hard()
    }
}

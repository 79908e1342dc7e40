//! Room and building models.
//!
//! Rooms are the resources that demands are allocated to. They reference
//! their building by id; buildings are looked up through the catalog
//! rather than embedded, so rooms stay plain values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Room identifier. Ordering is used as the final ranking tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Building identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

/// Room classification (e.g. `classroom`, `computer_lab`, `chemistry_lab`).
///
/// The configured default type (usually `classroom`) marks a regular room;
/// every other type counts as specialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomType(pub String);

impl RoomType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A building on a campus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub campus: String,
}

impl Building {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: BuildingId(id),
            name: name.into(),
            campus: String::new(),
        }
    }

    pub fn with_campus(mut self, campus: impl Into<String>) -> Self {
        self.campus = campus.into();
        self
    }
}

/// A physical room that can host demands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: RoomId,
    /// Human-readable name (e.g. "A-101").
    pub name: String,
    /// Owning building.
    pub building: BuildingId,
    /// Room classification.
    pub room_type: RoomType,
    /// Seats available.
    pub capacity: u32,
    /// Floor number (0 = ground floor).
    pub floor: i16,
    /// Characteristics (e.g. "projector", "accessible", "air_conditioning").
    pub features: BTreeSet<String>,
}

impl Room {
    /// Creates a room of the given type with no features.
    pub fn new(id: u32, room_type: impl Into<RoomType>) -> Self {
        Self {
            id: RoomId(id),
            name: String::new(),
            building: BuildingId(0),
            room_type: room_type.into(),
            capacity: 0,
            floor: 0,
            features: BTreeSet::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn in_building(mut self, building: u32) -> Self {
        self.building = BuildingId(building);
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn on_floor(mut self, floor: i16) -> Self {
        self.floor = floor;
        self
    }

    /// Adds a characteristic.
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    /// Whether the room has a characteristic.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    /// Whether the room seats at least `enrollment` students.
    #[inline]
    pub fn fits(&self, enrollment: u32) -> bool {
        self.capacity >= enrollment
    }
}

impl From<String> for RoomType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_builder() {
        let r = Room::new(101, "computer_lab")
            .with_name("B-101")
            .in_building(3)
            .with_capacity(40)
            .on_floor(1)
            .with_feature("projector")
            .with_feature("accessible");

        assert_eq!(r.id, RoomId(101));
        assert_eq!(r.name, "B-101");
        assert_eq!(r.building, BuildingId(3));
        assert_eq!(r.room_type, RoomType::new("computer_lab"));
        assert!(r.has_feature("projector"));
        assert!(!r.has_feature("whiteboard"));
        assert_eq!(r.floor, 1);
    }

    #[test]
    fn test_room_fits() {
        let r = Room::new(1, "classroom").with_capacity(30);
        assert!(r.fits(30));
        assert!(r.fits(0));
        assert!(!r.fits(31));
    }

    #[test]
    fn test_room_id_ordering() {
        assert!(RoomId(2) < RoomId(10));
        assert_eq!(RoomId(7).to_string(), "R7");
    }
}

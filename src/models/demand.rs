//! Demand (course offering) model.
//!
//! A demand is one course offering that needs a room for every block of
//! its weekly schedule. Demands are read-only input to the allocator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Demand identifier. Ordering is used as the unit tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DemandId(pub u32);

impl fmt::Display for DemandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Academic level of the offering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseLevel {
    #[default]
    Undergraduate,
    Graduate,
    Technical,
}

/// A course offering needing a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demand {
    /// Unique demand identifier.
    pub id: DemandId,
    /// Discipline (course) code; rules and history are keyed by it.
    pub course_code: String,
    /// Course name.
    pub name: String,
    /// Professors teaching the offering.
    pub professors: Vec<String>,
    /// Enrolled students.
    pub enrollment: u32,
    /// Raw schedule code (e.g. "24M12").
    pub schedule_code: String,
    pub level: CourseLevel,
}

impl Demand {
    /// Creates a demand with the given id, course code and schedule code.
    pub fn new(id: u32, course_code: impl Into<String>, schedule_code: impl Into<String>) -> Self {
        Self {
            id: DemandId(id),
            course_code: course_code.into(),
            name: String::new(),
            professors: Vec::new(),
            enrollment: 0,
            schedule_code: schedule_code.into(),
            level: CourseLevel::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a professor.
    pub fn with_professor(mut self, name: impl Into<String>) -> Self {
        self.professors.push(name.into());
        self
    }

    pub fn with_enrollment(mut self, enrollment: u32) -> Self {
        self.enrollment = enrollment;
        self
    }

    pub fn with_level(mut self, level: CourseLevel) -> Self {
        self.level = level;
        self
    }
}

//! Room allocation domain models.
//!
//! Reference data (time grid, rooms, buildings, rules, professor
//! profiles, history) is read-only for a run. Allocations are the only
//! values a run creates. Relations between entities are expressed by id
//! (`RoomId`, `BuildingId`, `DemandId`), never by embedded objects.
//!
//! # Domain Mappings
//!
//! | u-roomalloc | Generic scheduling | Campus terms |
//! |-------------|--------------------|--------------|
//! | Demand | Task | Course offering / class |
//! | Room | Resource | Classroom / lab |
//! | AtomicSlot | Resource × time cell | Room at day + period |
//! | Allocation | Assignment | Room booking row |
//! | Rule | Constraint | Department room policy |

mod allocation;
mod demand;
mod history;
mod professor;
mod room;
mod rule;
mod time_grid;

pub use allocation::{Allocation, AtomicSlot, Reservation, SemesterId};
pub use demand::{CourseLevel, Demand, DemandId};
pub use history::{HistoricalFrequency, HistoryRecord};
pub use professor::{ProfessorProfile, ProfessorRestriction};
pub use room::{Building, BuildingId, Room, RoomId, RoomType};
pub use rule::{Rule, RuleKind};
pub use time_grid::{BlockCode, ClockTime, DayId, Shift, TimeBlock, TimeGrid, WeekDay};

//! Semester room allocation for the U-Engine ecosystem.
//!
//! Assigns course offerings ("demands") to rooms across a weekly time
//! grid without double-booking any (room, day, block) slot, honoring
//! mandatory rules, preferences and historical usage.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeGrid`, `Demand`, `Room`, `Rule`,
//!   `ProfessorProfile`, `AtomicSlot`, `Allocation`, `HistoryRecord`
//! - **`schedule_code`**: Schedule code parsing (`"24M12"` → day/block pairs)
//!   and day grouping
//! - **`conflict`**: Live occupancy index with batch queries and
//!   all-or-nothing claims
//! - **`hybrid`**: Detection of disciplines that switch room type by weekday
//! - **`scoring`**: Additive candidate scoring and deterministic ranking
//! - **`allocator`**: Phase pipeline producing allocations and a report
//! - **`repository`**: Storage seam and an in-memory implementation
//! - **`validation`**: Catalog integrity checks (fatal for a run)
//! - **`config`**: TOML configuration (weights, history, hybrid, parallelism)
//! - **`error`**: Error types
//!
//! # Example
//!
//! ```
//! use u_roomalloc::allocator::{AllocationInput, AllocationMode, Allocator};
//! use u_roomalloc::models::{Demand, Room, Rule, SemesterId, TimeGrid};
//! use u_roomalloc::repository::InMemoryRepository;
//!
//! let input = AllocationInput::new(TimeGrid::standard())
//!     .with_room(Room::new(1, "classroom").with_capacity(60))
//!     .with_room(Room::new(2, "lab").with_capacity(30))
//!     .with_demand(Demand::new(1, "CALC1", "24M12").with_enrollment(50))
//!     .with_demand(Demand::new(2, "PROG1", "35T34").with_enrollment(25))
//!     .with_rule(Rule::fixed_room_type("PROG1", "lab"));
//!
//! let repo = InMemoryRepository::new();
//! let report = Allocator::new(input)
//!     .run(&SemesterId::from("2024.1"), AllocationMode::Full, false, &repo)
//!     .unwrap();
//! assert_eq!(report.summary.allocated, 2);
//! assert_eq!(report.allocations.len(), 8);
//! ```

pub mod allocator;
pub mod config;
pub mod conflict;
pub mod error;
pub mod hybrid;
pub mod models;
pub mod repository;
pub mod schedule_code;
pub mod scoring;
pub mod validation;

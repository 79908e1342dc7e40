//! Weekly time grid model.
//!
//! The grid is fixed reference data: an ordered list of teaching weekdays
//! and an ordered list of atomic time blocks. A block is the smallest
//! schedulable unit; a (day, block) pair is one cell of the weekly grid.
//!
//! # Block Codes
//! A block code is a shift letter followed by a period digit:
//!
//! | Shift | Letter | Periods |
//! |-------|--------|---------|
//! | Morning | `M` | 1-6 |
//! | Afternoon | `T` | 1-6 |
//! | Evening | `N` | 1-4 |
//!
//! Grid order (M before T before N, ascending period) is the canonical
//! block order used everywhere blocks are listed.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Weekday identifier, as written in schedule codes (2 = Monday ... 7 = Saturday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayId(pub u8);

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Atomic block code (e.g. `M1`, `T4`, `N2`). Always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockCode(String);

impl BlockCode {
    /// Creates a block code, normalizing to upper-case.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// Builds the code for a shift and period number.
    pub fn from_parts(shift: Shift, period: u8) -> Self {
        Self(format!("{}{}", shift.letter(), period))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for BlockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Teaching shift a block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
}

impl Shift {
    /// Schedule-code letter for this shift.
    pub fn letter(self) -> char {
        match self {
            Shift::Morning => 'M',
            Shift::Afternoon => 'T',
            Shift::Evening => 'N',
        }
    }

    /// Parses a shift letter (case-insensitive).
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'M' => Some(Shift::Morning),
            'T' => Some(Shift::Afternoon),
            'N' => Some(Shift::Evening),
            _ => None,
        }
    }
}

/// Wall-clock time of day, in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClockTime(pub u16);

impl ClockTime {
    pub fn hm(hour: u16, minute: u16) -> Self {
        Self(hour * 60 + minute)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// A teaching weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekDay {
    pub id: DayId,
    pub name: String,
}

impl WeekDay {
    pub fn new(id: u8, name: impl Into<String>) -> Self {
        Self {
            id: DayId(id),
            name: name.into(),
        }
    }
}

/// An atomic time block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub code: BlockCode,
    pub shift: Shift,
    /// Start time (inclusive).
    pub start: ClockTime,
    /// End time (exclusive).
    pub end: ClockTime,
}

impl TimeBlock {
    pub fn new(shift: Shift, period: u8, start: ClockTime, end: ClockTime) -> Self {
        Self {
            code: BlockCode::from_parts(shift, period),
            shift,
            start,
            end,
        }
    }

    /// Block length in minutes.
    #[inline]
    pub fn duration_min(&self) -> u16 {
        self.end.0.saturating_sub(self.start.0)
    }
}

/// The weekly time grid catalog.
///
/// Read-only after construction. Block lookups go through a code index
/// so parsing and sorting never scan the block list.
#[derive(Debug, Clone)]
pub struct TimeGrid {
    days: Vec<WeekDay>,
    blocks: Vec<TimeBlock>,
    block_index: HashMap<BlockCode, usize>,
}

impl TimeGrid {
    /// Creates a grid from ordered days and blocks.
    ///
    /// If a block code appears twice the first occurrence wins for lookups;
    /// [`crate::validation::validate_catalog`] reports the duplicate.
    pub fn new(days: Vec<WeekDay>, blocks: Vec<TimeBlock>) -> Self {
        let mut block_index = HashMap::with_capacity(blocks.len());
        for (i, b) in blocks.iter().enumerate() {
            block_index.entry(b.code.clone()).or_insert(i);
        }
        Self {
            days,
            blocks,
            block_index,
        }
    }

    /// The standard Monday-Saturday grid with 16 blocks (M1-M6, T1-T6, N1-N4).
    pub fn standard() -> Self {
        let days = vec![
            WeekDay::new(2, "Monday"),
            WeekDay::new(3, "Tuesday"),
            WeekDay::new(4, "Wednesday"),
            WeekDay::new(5, "Thursday"),
            WeekDay::new(6, "Friday"),
            WeekDay::new(7, "Saturday"),
        ];

        let morning = [
            ((7, 0), (7, 50)),
            ((7, 50), (8, 40)),
            ((8, 55), (9, 45)),
            ((9, 45), (10, 35)),
            ((10, 50), (11, 40)),
            ((11, 40), (12, 30)),
        ];
        let afternoon = [
            ((13, 0), (13, 50)),
            ((13, 50), (14, 40)),
            ((14, 55), (15, 45)),
            ((15, 45), (16, 35)),
            ((16, 50), (17, 40)),
            ((17, 40), (18, 30)),
        ];
        let evening = [
            ((18, 45), (19, 35)),
            ((19, 35), (20, 25)),
            ((20, 35), (21, 25)),
            ((21, 25), (22, 15)),
        ];

        let mut blocks = Vec::with_capacity(16);
        for (shift, periods) in [
            (Shift::Morning, &morning[..]),
            (Shift::Afternoon, &afternoon[..]),
            (Shift::Evening, &evening[..]),
        ] {
            for (i, &((sh, sm), (eh, em))) in periods.iter().enumerate() {
                blocks.push(TimeBlock::new(
                    shift,
                    (i + 1) as u8,
                    ClockTime::hm(sh, sm),
                    ClockTime::hm(eh, em),
                ));
            }
        }

        Self::new(days, blocks)
    }

    pub fn days(&self) -> &[WeekDay] {
        &self.days
    }

    pub fn blocks(&self) -> &[TimeBlock] {
        &self.blocks
    }

    /// Finds a weekday by id.
    pub fn day(&self, id: DayId) -> Option<&WeekDay> {
        self.days.iter().find(|d| d.id == id)
    }

    pub fn has_day(&self, id: DayId) -> bool {
        self.day(id).is_some()
    }

    /// Finds a block by code.
    pub fn block(&self, code: &BlockCode) -> Option<&TimeBlock> {
        self.block_index.get(code).map(|&i| &self.blocks[i])
    }

    pub fn has_block(&self, code: &BlockCode) -> bool {
        self.block_index.contains_key(code)
    }

    /// Canonical position of a block in grid order.
    pub fn block_position(&self, code: &BlockCode) -> Option<usize> {
        self.block_index.get(code).copied()
    }

    /// Number of (day, block) cells in one week.
    pub fn cells_per_week(&self) -> usize {
        self.days.len() * self.blocks.len()
    }

    /// Block codes that appear more than once in the catalog.
    pub fn duplicate_block_codes(&self) -> Vec<BlockCode> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for b in &self.blocks {
            if !seen.insert(&b.code) && !dups.contains(&b.code) {
                dups.push(b.code.clone());
            }
        }
        dups
    }
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_grid_shape() {
        let grid = TimeGrid::standard();
        assert_eq!(grid.days().len(), 6);
        assert_eq!(grid.blocks().len(), 16);
        assert_eq!(grid.cells_per_week(), 96);
        assert!(grid.duplicate_block_codes().is_empty());
    }

    #[test]
    fn test_block_lookup_and_order() {
        let grid = TimeGrid::standard();
        let m1 = BlockCode::new("m1");
        assert_eq!(m1.as_str(), "M1");
        assert_eq!(grid.block_position(&m1), Some(0));
        assert_eq!(grid.block_position(&"T1".into()), Some(6));
        assert_eq!(grid.block_position(&"N4".into()), Some(15));
        assert!(!grid.has_block(&"N5".into()));
        assert!(!grid.has_block(&"M7".into()));

        let t3 = grid.block(&"T3".into()).unwrap();
        assert_eq!(t3.shift, Shift::Afternoon);
        assert_eq!(t3.start.to_string(), "14:55");
        assert_eq!(t3.duration_min(), 50);
    }

    #[test]
    fn test_days() {
        let grid = TimeGrid::standard();
        assert!(grid.has_day(DayId(2)));
        assert!(grid.has_day(DayId(7)));
        assert!(!grid.has_day(DayId(1)));
        assert!(!grid.has_day(DayId(8)));
        assert_eq!(grid.day(DayId(4)).unwrap().name, "Wednesday");
    }

    #[test]
    fn test_duplicate_block_codes() {
        let blocks = vec![
            TimeBlock::new(Shift::Morning, 1, ClockTime::hm(7, 0), ClockTime::hm(7, 50)),
            TimeBlock::new(Shift::Morning, 1, ClockTime::hm(8, 0), ClockTime::hm(8, 50)),
        ];
        let grid = TimeGrid::new(vec![WeekDay::new(2, "Monday")], blocks);
        assert_eq!(grid.duplicate_block_codes(), vec![BlockCode::new("M1")]);
        // First occurrence wins
        assert_eq!(grid.block(&"M1".into()).unwrap().start, ClockTime::hm(7, 0));
    }

    #[test]
    fn test_shift_letters() {
        assert_eq!(Shift::from_letter('t'), Some(Shift::Afternoon));
        assert_eq!(Shift::from_letter('X'), None);
        assert_eq!(Shift::Evening.letter(), 'N');
    }
}

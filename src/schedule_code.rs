//! Schedule code parsing.
//!
//! A schedule code lists a demand's weekly blocks in compact tokens:
//! `<day digits><shift letter><period digits>`. `24M12` means Monday (2)
//! and Wednesday (4), morning periods 1 and 2, i.e. the pairs
//! (2,M1), (2,M2), (4,M1), (4,M2). Several tokens are separated by
//! whitespace (`35T34 6N12`). Parenthesized qualifiers such as date
//! ranges are ignored.
//!
//! Parsing validates every token against the [`TimeGrid`] up front; the
//! expansion into (day, block) pairs is lazy and can be iterated any
//! number of times.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::ScheduleCodeError;
use crate::models::{BlockCode, ClockTime, DayId, Shift, TimeGrid};

/// One validated token: every listed day × every listed block.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScheduleToken {
    days: Vec<DayId>,
    blocks: Vec<BlockCode>,
}

/// A validated schedule code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSchedule {
    tokens: Vec<ScheduleToken>,
}

impl ParsedSchedule {
    /// Lazily yields (day, block) pairs in token order.
    ///
    /// Duplicate pairs across tokens are yielded once per occurrence;
    /// use [`ParsedSchedule::slots`] for the de-duplicated set.
    pub fn iter(&self) -> impl Iterator<Item = (DayId, BlockCode)> + '_ {
        self.tokens.iter().flat_map(|t| {
            t.days
                .iter()
                .flat_map(move |&day| t.blocks.iter().map(move |b| (day, b.clone())))
        })
    }

    /// The de-duplicated set of (day, block) pairs.
    pub fn slots(&self) -> BTreeSet<(DayId, BlockCode)> {
        self.iter().collect()
    }

    /// Distinct days, ascending.
    pub fn days(&self) -> Vec<DayId> {
        let days: BTreeSet<DayId> = self.tokens.iter().flat_map(|t| t.days.iter().copied()).collect();
        days.into_iter().collect()
    }

    /// Number of distinct (day, block) pairs.
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParsedSchedule {
    type Item = (DayId, BlockCode);
    type IntoIter = Box<dyn Iterator<Item = (DayId, BlockCode)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// A demand's blocks on one weekday, in grid order.
///
/// Unit of allocation when a demand may be split across rooms: all blocks
/// of a group always land in the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockGroup {
    pub day: DayId,
    pub blocks: Vec<BlockCode>,
}

impl BlockGroup {
    /// (day, block) pairs of this group.
    pub fn pairs(&self) -> impl Iterator<Item = (DayId, BlockCode)> + '_ {
        self.blocks.iter().map(move |b| (self.day, b.clone()))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Parses a schedule code against the grid.
///
/// # Errors
/// Returns [`ScheduleCodeError`] if the code is empty, a token is
/// malformed, or a day or block is not in the grid.
///
/// # Example
/// ```
/// use u_roomalloc::models::{DayId, TimeGrid};
/// use u_roomalloc::schedule_code::parse_schedule;
///
/// let grid = TimeGrid::standard();
/// let parsed = parse_schedule("24M12", &grid).unwrap();
/// let pairs: Vec<_> = parsed.iter().map(|(d, b)| (d.0, b.to_string())).collect();
/// assert_eq!(pairs[0], (2, "M1".to_string()));
/// assert_eq!(parsed.len(), 4);
/// ```
pub fn parse_schedule(code: &str, grid: &TimeGrid) -> Result<ParsedSchedule, ScheduleCodeError> {
    let cleaned = strip_qualifiers(code);
    let mut tokens = Vec::new();
    for raw in cleaned.split_whitespace() {
        tokens.push(parse_token(raw, grid)?);
    }
    if tokens.is_empty() {
        return Err(ScheduleCodeError::Empty);
    }
    Ok(ParsedSchedule { tokens })
}

/// Removes parenthesized segments (nested parentheses included).
fn strip_qualifiers(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut depth = 0usize;
    for c in code.chars() {
        match c {
            '(' => {
                depth += 1;
                out.push(' ');
            }
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn parse_token(token: &str, grid: &TimeGrid) -> Result<ScheduleToken, ScheduleCodeError> {
    let mut chars = token.chars().peekable();

    let mut days = Vec::new();
    while let Some(c) = chars.peek().copied() {
        let Some(digit) = c.to_digit(10) else { break };
        chars.next();
        let day = DayId(digit as u8);
        if !grid.has_day(day) {
            return Err(ScheduleCodeError::UnknownDay {
                token: token.to_string(),
                day: day.0,
            });
        }
        if !days.contains(&day) {
            days.push(day);
        }
    }
    if days.is_empty() {
        return Err(ScheduleCodeError::malformed(token, "missing day digits"));
    }

    let shift = match chars.next() {
        Some(c) => Shift::from_letter(c)
            .ok_or_else(|| ScheduleCodeError::malformed(token, format!("unknown shift '{c}'")))?,
        None => return Err(ScheduleCodeError::malformed(token, "missing shift letter")),
    };

    let mut blocks = Vec::new();
    for c in chars {
        let period = c
            .to_digit(10)
            .ok_or_else(|| ScheduleCodeError::malformed(token, format!("unexpected '{c}'")))?;
        let block = BlockCode::from_parts(shift, period as u8);
        if !grid.has_block(&block) {
            return Err(ScheduleCodeError::UnknownBlock {
                token: token.to_string(),
                block,
            });
        }
        if !blocks.contains(&block) {
            blocks.push(block);
        }
    }
    if blocks.is_empty() {
        return Err(ScheduleCodeError::malformed(token, "missing period digits"));
    }

    Ok(ScheduleToken { days, blocks })
}

/// Partitions (day, block) pairs into day-ordered block groups.
///
/// Days ascend; blocks within a day follow grid order. Duplicates collapse.
pub fn group_by_day<I>(pairs: I, grid: &TimeGrid) -> Vec<BlockGroup>
where
    I: IntoIterator<Item = (DayId, BlockCode)>,
{
    let mut groups: Vec<BlockGroup> = Vec::new();
    let mut sorted: Vec<(DayId, BlockCode)> = pairs.into_iter().collect();
    sorted.sort_by(|(da, ba), (db, bb)| {
        da.cmp(db)
            .then_with(|| block_order(grid, ba).cmp(&block_order(grid, bb)))
            .then_with(|| ba.cmp(bb))
    });
    sorted.dedup();

    for (day, block) in sorted {
        match groups.last_mut() {
            Some(g) if g.day == day => g.blocks.push(block),
            _ => groups.push(BlockGroup {
                day,
                blocks: vec![block],
            }),
        }
    }
    groups
}

fn block_order(grid: &TimeGrid, block: &BlockCode) -> usize {
    grid.block_position(block).unwrap_or(usize::MAX)
}

/// Formats the span of a block set as `HH:MM-HH:MM` (earliest start to
/// latest end). Returns `None` if no block is in the grid.
pub fn format_time_range<'a, I>(blocks: I, grid: &TimeGrid) -> Option<String>
where
    I: IntoIterator<Item = &'a BlockCode>,
{
    let mut span: Option<(ClockTime, ClockTime)> = None;
    for code in blocks {
        if let Some(b) = grid.block(code) {
            span = Some(match span {
                None => (b.start, b.end),
                Some((s, e)) => (s.min(b.start), e.max(b.end)),
            });
        }
    }
    span.map(|(s, e)| format!("{s}-{e}"))
}

//! Half-open interval overlap detection shared by day blocks and template
//! expansion.
//!
//! Two intervals `[s1, e1)` and `[s2, e2)` overlap iff `s1 < e2 && s2 < e1`.
//! Intervals that only touch at a boundary (09:00–10:00 and 10:00–11:00) do
//! not overlap. Everything here is read-only; writes happen in the callers
//! once these checks pass.

use crate::errors::{AppError, AppResult, BlockConflict, OverlapSource};
use crate::models::block::{Block, NewBlock};
use crate::models::template::TemplateEntry;
use crate::models::time_of_day::TimeOfDay;
use chrono::{DateTime, Utc};

/// Anything with a start and an end on a common axis.
pub trait Span {
    type Point: Ord + Copy;

    fn start(&self) -> Self::Point;
    fn end(&self) -> Self::Point;
}

impl Span for Block {
    type Point = DateTime<Utc>;

    fn start(&self) -> DateTime<Utc> {
        self.start_time
    }
    fn end(&self) -> DateTime<Utc> {
        self.end_time
    }
}

impl Span for NewBlock {
    type Point = DateTime<Utc>;

    fn start(&self) -> DateTime<Utc> {
        self.start_time
    }
    fn end(&self) -> DateTime<Utc> {
        self.end_time
    }
}

impl Span for TemplateEntry {
    type Point = TimeOfDay;

    fn start(&self) -> TimeOfDay {
        self.start_time
    }
    fn end(&self) -> TimeOfDay {
        self.end_time
    }
}

impl<P: Ord + Copy> Span for (P, P) {
    type Point = P;

    fn start(&self) -> P {
        self.0
    }
    fn end(&self) -> P {
        self.1
    }
}

pub fn overlaps<A, B>(a: &A, b: &B) -> bool
where
    A: Span,
    B: Span<Point = A::Point>,
{
    a.start() < b.end() && b.start() < a.end()
}

/// First block of `existing` that overlaps `candidate`, skipping `exclude_id`
/// (the block being updated in place).
pub fn find_conflict<'a, C>(
    candidate: &C,
    existing: &'a [Block],
    exclude_id: Option<i64>,
) -> Option<&'a Block>
where
    C: Span<Point = DateTime<Utc>>,
{
    existing
        .iter()
        .filter(|b| Some(b.id) != exclude_id)
        .find(|b| overlaps(candidate, *b))
}

pub fn assert_no_conflict<C>(candidate: &C, existing: &[Block], exclude_id: Option<i64>) -> AppResult<()>
where
    C: Span<Point = DateTime<Utc>>,
{
    match find_conflict(candidate, existing, exclude_id) {
        Some(block) => Err(overlap_error(candidate, block)),
        None => Ok(()),
    }
}

pub fn overlap_error<C>(candidate: &C, block: &Block) -> AppError
where
    C: Span<Point = DateTime<Utc>>,
{
    AppError::BlockOverlap {
        start_time: candidate.start(),
        end_time: candidate.end(),
        collides_with: OverlapSource::Existing(BlockConflict {
            block_id: block.id,
            start_time: block.start_time,
            end_time: block.end_time,
        }),
    }
}

/// First pair of indices `(i, j)` whose intervals overlap each other.
///
/// `items` must be sorted by start. A sweep keeps the interval with the
/// furthest end seen so far; any later start before that end is a collision.
pub fn find_internal_conflict<S: Span>(items: &[S]) -> Option<(usize, usize)> {
    let mut furthest: Option<usize> = None;

    for (j, item) in items.iter().enumerate() {
        if let Some(i) = furthest {
            if item.start() < items[i].end() {
                return Some((i, j));
            }
            if item.end() > items[i].end() {
                furthest = Some(j);
            }
        } else {
            furthest = Some(j);
        }
    }

    None
}

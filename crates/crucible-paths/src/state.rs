//! The augmented search state and the straight-run move rules.
//!
//! A plain grid position is not enough to decide which moves are legal:
//! whether the path may turn (or must stop turning) depends on how long it
//! has held its current heading. Every search node is therefore a
//! [`SearchState`] of position, heading and run length, and two states on
//! the same cell with different headings or runs are distinct nodes.

use crucible_core::{Cost, CostGrid, Heading, Point};

use crate::query::QueryError;
use crate::traits::StatePather;

/// A node of the augmented search graph.
///
/// `run` counts the consecutive cells entered while holding `heading`.
/// It is at least 1 for every state reached by a move; run 0 only appears
/// on the synthetic seed states at the start cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchState {
    pub pos: Point,
    pub heading: Heading,
    pub run: u32,
}

impl SearchState {
    /// Create a new state.
    #[inline]
    pub const fn new(pos: Point, heading: Heading, run: u32) -> Self {
        Self { pos, heading, run }
    }

    /// The state after one step towards `h`.
    ///
    /// Holding the heading extends the run; any other heading starts a
    /// fresh run of 1.
    #[inline]
    pub fn advance(self, h: Heading) -> Self {
        debug_assert_ne!(h, self.heading.opposite(), "advance: reversal");
        let run = if h == self.heading { self.run + 1 } else { 1 };
        Self {
            pos: self.pos.step(h),
            heading: h,
            run,
        }
    }

    /// Whether this is a seed state (no move made yet).
    #[inline]
    pub const fn is_seed(self) -> bool {
        self.run == 0
    }
}

/// Straight-run rules: at least `min_run` cells before a turn, at most
/// `max_run` cells in one heading, no reversal.
#[derive(Debug, Clone, Copy)]
pub struct RunRules<'g> {
    grid: &'g CostGrid,
    end: Point,
    min_run: u32,
    max_run: u32,
}

impl<'g> RunRules<'g> {
    /// Rules for paths over `grid` that end on `end`.
    ///
    /// Callers are expected to have validated `1 <= min_run <= max_run`.
    pub fn new(grid: &'g CostGrid, end: Point, min_run: u32, max_run: u32) -> Self {
        debug_assert!(1 <= min_run && min_run <= max_run);
        Self {
            grid,
            end,
            min_run,
            max_run,
        }
    }

    /// Seed states for a search from `start`: one per heading, all at run 0,
    /// so the first move may go anywhere.
    pub fn seeds(start: Point) -> [SearchState; 4] {
        Heading::ALL.map(|h| SearchState::new(start, h, 0))
    }

    #[inline]
    fn push(&self, next: SearchState, buf: &mut Vec<(SearchState, Cost)>) {
        if self.grid.contains(next.pos) {
            buf.push((next, self.grid.cost_at(next.pos)));
        }
    }
}

impl StatePather for RunRules<'_> {
    fn successors(&self, s: SearchState, buf: &mut Vec<(SearchState, Cost)>) {
        // Mid forced run: straight on is the only move.
        if s.run > 0 && s.run < self.min_run {
            self.push(s.advance(s.heading), buf);
            return;
        }
        if s.run < self.max_run {
            self.push(s.advance(s.heading), buf);
        }
        for h in s.heading.perpendicular() {
            self.push(s.advance(h), buf);
        }
    }

    #[inline]
    fn is_terminal(&self, s: SearchState) -> bool {
        s.pos == self.end && s.run >= self.min_run
    }
}

/// Bijective encoding of the states of one grid into `0..len()`.
///
/// The layout is `((cell * 4) + heading) * runs + run`, with `runs` one
/// more than the longest representable run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StateIndexer {
    width: usize,
    runs: usize,
    len: usize,
}

impl StateIndexer {
    /// Indexer for `grid` with runs up to `max_run`.
    ///
    /// A straight run can never be longer than the grid's longest side, so
    /// the run dimension is clamped to it.
    pub(crate) fn new(grid: &CostGrid, max_run: u32) -> Result<Self, QueryError> {
        let width = grid.width() as usize;
        let longest = grid.width().max(grid.height()) as u32;
        let runs = max_run.min(longest) as usize + 1;
        let len = grid
            .len()
            .checked_mul(Heading::ALL.len())
            .and_then(|n| n.checked_mul(runs))
            .filter(|&n| n < usize::MAX)
            .ok_or(QueryError::StateSpaceTooLarge {
                size: grid.size(),
                max_run,
            })?;
        Ok(Self { width, runs, len })
    }

    /// Number of distinct states.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn encode(&self, s: SearchState) -> usize {
        debug_assert!((s.run as usize) < self.runs, "encode: run {} too long", s.run);
        let cell = s.pos.y as usize * self.width + s.pos.x as usize;
        (cell * 4 + s.heading.index()) * self.runs + s.run as usize
    }

    #[inline]
    pub(crate) fn decode(&self, idx: usize) -> SearchState {
        let run = (idx % self.runs) as u32;
        let rest = idx / self.runs;
        let heading = Heading::from_index(rest % 4);
        let cell = rest / 4;
        let pos = Point::new((cell % self.width) as i32, (cell / self.width) as i32);
        SearchState { pos, heading, run }
    }
}

use std::fmt;

use crucible_core::{CostGrid, Distance, Point, Range};
use thiserror::Error;

/// Straight-run limits: a path must hold a heading for at least `min`
/// cells before turning or stopping, and for at most `max` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunLimits {
    pub min: u32,
    pub max: u32,
}

impl RunLimits {
    /// Turn whenever you like, at most three cells straight.
    pub const CRUCIBLE: Self = Self::new(1, 3);

    /// At least four cells before turning or stopping, at most ten.
    pub const ULTRA: Self = Self::new(4, 10);

    /// Create new limits. Validation is deferred to [`Query::validate`].
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

impl Default for RunLimits {
    fn default() -> Self {
        Self::CRUCIBLE
    }
}

impl fmt::Display for RunLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// One shortest-path request: endpoints, run limits and an optional cost
/// ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub start: Point,
    pub end: Point,
    pub runs: RunLimits,
    /// States costlier than this are never expanded. `None` means
    /// unbounded.
    pub max_cost: Option<Distance>,
}

impl Query {
    /// A query from `start` to `end` with [`RunLimits::CRUCIBLE`].
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            runs: RunLimits::default(),
            max_cost: None,
        }
    }

    /// From the top-left to the bottom-right cell of `grid`.
    pub fn corners(grid: &CostGrid) -> Self {
        Self::new(Point::ZERO, grid.last_cell())
    }

    /// Set the run limits.
    pub fn with_runs(mut self, min: u32, max: u32) -> Self {
        self.runs = RunLimits::new(min, max);
        self
    }

    /// Set the run limits from a preset.
    pub fn with_limits(mut self, runs: RunLimits) -> Self {
        self.runs = runs;
        self
    }

    /// Bound the search: paths costing more than `cost` are not considered.
    pub fn with_max_cost(mut self, cost: Distance) -> Self {
        self.max_cost = Some(cost);
        self
    }

    /// Check the query against `grid` before any search work is done.
    pub fn validate(&self, grid: &CostGrid) -> Result<(), QueryError> {
        let RunLimits { min, max } = self.runs;
        if min == 0 || max == 0 {
            return Err(QueryError::ZeroRun { min, max });
        }
        if min > max {
            return Err(QueryError::InvalidRuns { min, max });
        }
        for (endpoint, pos) in [(Endpoint::Start, self.start), (Endpoint::End, self.end)] {
            if !grid.contains(pos) {
                return Err(QueryError::OutOfBounds {
                    endpoint,
                    pos,
                    bounds: grid.bounds(),
                });
            }
        }
        Ok(())
    }
}

/// Which end of a query an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::End => f.write_str("end"),
        }
    }
}

/// A query that cannot be searched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("run limits must be at least 1 (got {min}..={max})")]
    ZeroRun { min: u32, max: u32 },

    #[error("minimum run {min} exceeds maximum run {max}")]
    InvalidRuns { min: u32, max: u32 },

    #[error("{endpoint} {pos} is outside the grid {bounds}")]
    OutOfBounds {
        endpoint: Endpoint,
        pos: Point,
        bounds: Range,
    },

    #[error("state space of a {}x{} grid with runs up to {max_run} is too large", .size.x, .size.y)]
    StateSpaceTooLarge { size: Point, max_run: u32 },
}

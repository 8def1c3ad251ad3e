use crucible_core::{CostGrid, Distance, Heading, Point};
use thiserror::Error;

use crate::Crucible;
use crate::crucible::NO_PARENT;
use crate::query::Query;
use crate::state::StateIndexer;

/// One cell of a route and the heading it was entered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    pub pos: Point,
    /// `None` for the start cell.
    pub heading: Option<Heading>,
}

/// A realized minimum-cost path, start cell included.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub cost: Distance,
    pub steps: Vec<Step>,
}

impl Route {
    /// The zero-length route standing on `p`.
    pub fn trivial(p: Point) -> Self {
        Self {
            cost: 0,
            steps: vec![Step {
                pos: p,
                heading: None,
            }],
        }
    }

    /// Number of cells on the route, start included.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the route has no cells. Engine-built routes never do.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// First cell. Panics on an empty route.
    pub fn start(&self) -> Point {
        self.steps[0].pos
    }

    /// Last cell. Panics on an empty route.
    pub fn end(&self) -> Point {
        self.steps[self.steps.len() - 1].pos
    }

    /// The cells of the route, in order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.steps.iter().map(|s| s.pos)
    }

    /// Check that the route is a legal answer to `query` on `grid`.
    ///
    /// Verifies endpoints, bounds, contiguity, recorded headings, the
    /// no-reversal rule, both run limits (including the run ending on the
    /// destination) and that the entered cells sum to `cost`. Returns the
    /// first violation found.
    pub fn validate(&self, grid: &CostGrid, query: &Query) -> Result<(), RouteViolation> {
        let (min, max) = (query.runs.min, query.runs.max);
        let Some(first) = self.steps.first() else {
            return Err(RouteViolation::Empty);
        };
        if first.pos != query.start {
            return Err(RouteViolation::WrongStart {
                expected: query.start,
                got: first.pos,
            });
        }
        if self.end() != query.end {
            return Err(RouteViolation::WrongEnd {
                expected: query.end,
                got: self.end(),
            });
        }
        if !grid.contains(first.pos) {
            return Err(RouteViolation::OutOfBounds {
                index: 0,
                pos: first.pos,
            });
        }

        let mut total: Distance = 0;
        let mut prev: Option<Heading> = None;
        let mut run = 0;
        for (i, pair) in self.steps.windows(2).enumerate() {
            let index = i + 1;
            let (from, to) = (pair[0].pos, pair[1].pos);
            if !grid.contains(to) {
                return Err(RouteViolation::OutOfBounds { index, pos: to });
            }
            let Some(h) = Heading::between(from, to) else {
                return Err(RouteViolation::NotAdjacent { index, from, to });
            };
            if pair[1].heading != Some(h) {
                return Err(RouteViolation::HeadingMismatch { index });
            }
            run = match prev {
                Some(p) if h == p.opposite() => {
                    return Err(RouteViolation::Reversal { index });
                }
                Some(p) if h == p => run + 1,
                Some(_) if run < min => {
                    return Err(RouteViolation::TurnTooEarly { index, run, min });
                }
                _ => 1,
            };
            if run > max {
                return Err(RouteViolation::RunTooLong { index, max });
            }
            total += Distance::from(grid.cost_at(to));
            prev = Some(h);
        }

        // A zero-length route only answers a query without a minimum run.
        let final_ok = if prev.is_none() { min == 1 } else { run >= min };
        if !final_ok {
            return Err(RouteViolation::FinalRunTooShort { run, min });
        }
        if total != self.cost {
            return Err(RouteViolation::CostMismatch {
                reported: self.cost,
                actual: total,
            });
        }
        Ok(())
    }
}

/// Why a [`Route`] is not a legal answer to a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteViolation {
    #[error("route is empty")]
    Empty,

    #[error("route starts at {got}, expected {expected}")]
    WrongStart { expected: Point, got: Point },

    #[error("route ends at {got}, expected {expected}")]
    WrongEnd { expected: Point, got: Point },

    #[error("step {index} leaves the grid at {pos}")]
    OutOfBounds { index: usize, pos: Point },

    #[error("step {index} jumps from {from} to {to}")]
    NotAdjacent { index: usize, from: Point, to: Point },

    #[error("step {index} records the wrong heading")]
    HeadingMismatch { index: usize },

    #[error("step {index} reverses direction")]
    Reversal { index: usize },

    #[error("step {index} turns after a run of {run}, minimum is {min}")]
    TurnTooEarly { index: usize, run: u32, min: u32 },

    #[error("step {index} exceeds the maximum run of {max}")]
    RunTooLong { index: usize, max: u32 },

    #[error("route ends on a run of {run}, minimum is {min}")]
    FinalRunTooShort { run: u32, min: u32 },

    #[error("route claims cost {reported} but its cells sum to {actual}")]
    CostMismatch { reported: Distance, actual: Distance },
}

impl Crucible {
    /// Walk parent links from terminal state `ti` back to its seed.
    pub(crate) fn reconstruct(&self, space: &StateIndexer, ti: usize) -> Route {
        let mut steps = Vec::new();
        let mut ci = ti;
        loop {
            let s = space.decode(ci);
            let parent = self.nodes[ci].parent;
            if parent == NO_PARENT {
                if !s.is_seed() {
                    unreachable!("state {s:?} has no predecessor");
                }
                steps.push(Step {
                    pos: s.pos,
                    heading: None,
                });
                break;
            }
            steps.push(Step {
                pos: s.pos,
                heading: Some(s.heading),
            });
            ci = parent;
        }
        steps.reverse();
        Route {
            cost: self.nodes[ti].g,
            steps,
        }
    }
}

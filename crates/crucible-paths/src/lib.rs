//! Minimum-cost paths on cost grids under straight-run constraints.
//!
//! A path may hold a heading for at most `max` consecutive cells, must
//! hold it for at least `min` cells before turning or stopping, and may
//! never reverse. Because legality depends on recent movement, the search
//! runs over an augmented state space of (position, heading, run length)
//! rather than over bare grid cells:
//!
//! - [`RunRules`] enumerates legal successor states ([`StatePather`]).
//! - [`Crucible`] runs a lazy-deletion Dijkstra over those states and
//!   keeps its distance table for reuse across sequential queries.
//! - [`Route`] is the reconstructed path; [`Route::validate`] re-checks
//!   every rule.
//! - [`render_route`] draws a route as heading arrows over the grid.
//!
//! ```
//! use crucible_core::{CostGrid, Point};
//! use crucible_paths::{Crucible, Query};
//!
//! let grid: CostGrid = "111\n111\n111".parse().unwrap();
//! let query = Query::new(Point::new(0, 0), Point::new(2, 2)).with_runs(1, 3);
//! assert_eq!(Crucible::new().min_cost(&grid, &query), Ok(Some(4)));
//! ```

mod crucible;
mod query;
mod relax;
mod render;
mod route;
mod state;
mod traits;

pub use crucible::Crucible;
pub use query::{Endpoint, Query, QueryError, RunLimits};
pub use relax::shortest_route;
pub use render::render_route;
pub use route::{Route, RouteViolation, Step};
pub use state::{RunRules, SearchState};
pub use traits::StatePather;

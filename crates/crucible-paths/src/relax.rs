use crucible_core::{CostGrid, Distance};

use crate::Crucible;
use crate::crucible::{NO_PARENT, NodeRef};
use crate::query::{Query, QueryError};
use crate::route::Route;
use crate::state::{RunRules, SearchState, StateIndexer};
use crate::traits::StatePather;

/// Where a validated query ended up.
enum Solved {
    /// start == end and no minimum run to honour.
    Trivial,
    /// Index of the cheapest terminal state.
    Terminal(usize, StateIndexer),
    NoPath,
}

impl Crucible {
    /// Minimum cost of a path satisfying `query`, or `None` if there is
    /// none.
    ///
    /// The cost of a path is the sum of the costs of the cells it enters;
    /// the start cell is free.
    pub fn min_cost(
        &mut self,
        grid: &CostGrid,
        query: &Query,
    ) -> Result<Option<Distance>, QueryError> {
        Ok(match self.solve(grid, query)? {
            Solved::Trivial => Some(0),
            Solved::Terminal(ti, _) => Some(self.nodes[ti].g),
            Solved::NoPath => None,
        })
    }

    /// A minimum-cost path satisfying `query`, or `None` if there is none.
    ///
    /// When several paths tie, which one is returned is unspecified.
    pub fn route(&mut self, grid: &CostGrid, query: &Query) -> Result<Option<Route>, QueryError> {
        Ok(match self.solve(grid, query)? {
            Solved::Trivial => Some(Route::trivial(query.start)),
            Solved::Terminal(ti, space) => Some(self.reconstruct(&space, ti)),
            Solved::NoPath => None,
        })
    }

    fn solve(&mut self, grid: &CostGrid, query: &Query) -> Result<Solved, QueryError> {
        query.validate(grid)?;
        let runs = query.runs;

        if query.start == query.end && runs.min == 1 {
            log::debug!("crucible: trivial query at {}", query.start);
            self.expanded = 0;
            return Ok(Solved::Trivial);
        }

        let space = StateIndexer::new(grid, runs.max)?;
        let rules = RunRules::new(grid, query.end, runs.min, runs.max);
        let seeds = RunRules::seeds(query.start);
        let found = self.relax(&rules, &space, &seeds, query.max_cost.unwrap_or(Distance::MAX));

        match found {
            Some(ti) => {
                log::debug!(
                    "crucible: {} -> {} runs {}: cost {} after {} expansions",
                    query.start,
                    query.end,
                    runs,
                    self.nodes[ti].g,
                    self.expanded
                );
                Ok(Solved::Terminal(ti, space))
            }
            None => {
                log::debug!(
                    "crucible: {} -> {} runs {}: no path after {} expansions",
                    query.start,
                    query.end,
                    runs,
                    self.expanded
                );
                Ok(Solved::NoPath)
            }
        }
    }

    /// Dijkstra over the augmented state space with lazy deletion.
    ///
    /// Every seed starts at cost 0. Successors whose cost would exceed
    /// `max_cost` are not recorded. Returns the index of the first terminal
    /// state popped, which is the cheapest terminal state overall.
    pub(crate) fn relax<P: StatePather>(
        &mut self,
        pather: &P,
        space: &StateIndexer,
        seeds: &[SearchState],
        max_cost: Distance,
    ) -> Option<usize> {
        let cur_gen = self.begin(space.len());

        for &s in seeds {
            let si = space.encode(s);
            let n = &mut self.nodes[si];
            n.g = 0;
            n.parent = NO_PARENT;
            n.generation = cur_gen;
            n.open = true;
            self.open.push(NodeRef { idx: si, g: 0 });
        }

        let mut sbuf = std::mem::take(&mut self.sbuf);

        let found = 'search: loop {
            let Some(current) = self.open.pop() else {
                break 'search None;
            };
            let ci = current.idx;
            let cn = &self.nodes[ci];
            if cn.generation != cur_gen {
                unreachable!("frontier entry {ci} has no distance entry");
            }

            // Skip stale entries.
            if !cn.open || current.g > cn.g {
                log::trace!("crucible: stale entry {ci} at {}", current.g);
                continue;
            }

            let cs = space.decode(ci);
            if pather.is_terminal(cs) {
                break 'search Some(ci);
            }

            self.nodes[ci].open = false;
            self.expanded += 1;

            sbuf.clear();
            pather.successors(cs, &mut sbuf);

            for &(ns, step) in sbuf.iter() {
                let tentative = current.g + Distance::from(step);
                if tentative > max_cost {
                    continue;
                }

                let ni = space.encode(ns);
                let n = &mut self.nodes[ni];
                if n.generation == cur_gen && tentative >= n.g {
                    continue;
                }

                n.g = tentative;
                n.parent = ci;
                n.generation = cur_gen;
                n.open = true;
                self.open.push(NodeRef {
                    idx: ni,
                    g: tentative,
                });
            }
        };

        self.sbuf = sbuf;
        found
    }
}

/// Solve `query` on `grid` with a one-off engine.
pub fn shortest_route(grid: &CostGrid, query: &Query) -> Result<Option<Route>, QueryError> {
    Crucible::new().route(grid, query)
}

#[cfg(test)]
mod tests {
    use std::cmp::Reverse;
    use std::collections::{BinaryHeap, HashMap};

    use crucible_core::{Cost, Heading, Point};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::query::{Endpoint, RunLimits};

    const SAMPLE: &str = "\
2413432311323
3215453535623
3255245654254
3446585845452
4546657867536
1438598798454
4457876987766
3637877979653
4654967986887
4564679986453
1224686865563
2546548887735
4322674655533";

    const UNFORTUNATE: &str = "\
111111111111
999999999991
999999999991
999999999991
999999999991";

    fn ones(w: i32, h: i32) -> CostGrid {
        CostGrid::new(w, h, 1).unwrap()
    }

    fn random_grid(rng: &mut StdRng, w: i32, h: i32) -> CostGrid {
        CostGrid::from_fn(w, h, |_| rng.random_range(0..10)).unwrap()
    }

    /// Map-keyed Dijkstra over (position, heading, run), following the
    /// move rules directly rather than through `RunRules`.
    fn reference_cost(grid: &CostGrid, q: &Query) -> Option<Distance> {
        let (min, max) = (q.runs.min, q.runs.max);
        if q.start == q.end && min == 1 {
            return Some(0);
        }
        // BinaryHeap needs an ordered payload; the map keys on the state.
        let entry = |s: SearchState| (s.pos.x, s.pos.y, s.heading.index(), s.run);
        let mut dist: HashMap<SearchState, Distance> = HashMap::new();
        let mut heap = BinaryHeap::new();
        for h in Heading::ALL {
            let s = SearchState::new(q.start, h, 0);
            dist.insert(s, 0);
            heap.push(Reverse((0, entry(s))));
        }
        while let Some(Reverse((d, (x, y, hi, run)))) = heap.pop() {
            let s = SearchState::new(Point::new(x, y), Heading::from_index(hi), run);
            if dist.get(&s).is_some_and(|&best| best < d) {
                continue;
            }
            if s.pos == q.end && s.run >= min {
                return Some(d);
            }
            for h in Heading::ALL {
                if h == s.heading.opposite() {
                    continue;
                }
                let straight = h == s.heading;
                if s.run > 0 && s.run < min && !straight {
                    continue;
                }
                let run = if straight { s.run + 1 } else { 1 };
                if run > max {
                    continue;
                }
                let pos = s.pos + h.delta();
                let Some(c) = grid.at(pos) else {
                    continue;
                };
                let ns = SearchState::new(pos, h, run);
                let nd = d + Distance::from(c);
                if dist.get(&ns).is_none_or(|&best| nd < best) {
                    dist.insert(ns, nd);
                    heap.push(Reverse((nd, entry(ns))));
                }
            }
        }
        None
    }

    #[test]
    fn manhattan_on_uniform_grid() {
        let g = ones(3, 3);
        let q = Query::new(Point::ZERO, Point::new(2, 2)).with_runs(1, 3);
        let mut c = Crucible::new();
        assert_eq!(c.min_cost(&g, &q), Ok(Some(4)));
        let route = c.route(&g, &q).unwrap().unwrap();
        assert_eq!(route.cost, 4);
        assert_eq!(route.len(), 5);
        assert_eq!(route.start(), Point::ZERO);
        assert_eq!(route.end(), Point::new(2, 2));
        assert_eq!(route.validate(&g, &q), Ok(()));
    }

    #[test]
    fn sample_crucible() {
        let g: CostGrid = SAMPLE.parse().unwrap();
        let q = Query::corners(&g).with_limits(RunLimits::CRUCIBLE);
        let route = shortest_route(&g, &q).unwrap().unwrap();
        assert_eq!(route.cost, 102);
        assert_eq!(route.validate(&g, &q), Ok(()));
    }

    #[test]
    fn sample_ultra() {
        let g: CostGrid = SAMPLE.parse().unwrap();
        let q = Query::corners(&g).with_limits(RunLimits::ULTRA);
        let route = shortest_route(&g, &q).unwrap().unwrap();
        assert_eq!(route.cost, 94);
        assert_eq!(route.validate(&g, &q), Ok(()));
    }

    #[test]
    fn ultra_must_finish_its_run() {
        let g: CostGrid = UNFORTUNATE.parse().unwrap();
        let q = Query::corners(&g).with_limits(RunLimits::ULTRA);
        let route = shortest_route(&g, &q).unwrap().unwrap();
        assert_eq!(route.cost, 71);
        assert_eq!(route.validate(&g, &q), Ok(()));
    }

    #[test]
    fn single_cell_with_min_run_has_no_path() {
        let g = ones(1, 1);
        let q = Query::new(Point::ZERO, Point::ZERO).with_runs(2, 3);
        let mut c = Crucible::new();
        assert_eq!(c.min_cost(&g, &q), Ok(None));
        assert_eq!(c.route(&g, &q), Ok(None));
    }

    #[test]
    fn same_cell_without_min_run_is_free() {
        let g = ones(3, 3);
        let q = Query::new(Point::new(1, 1), Point::new(1, 1)).with_runs(1, 3);
        let route = shortest_route(&g, &q).unwrap().unwrap();
        assert_eq!(route.cost, 0);
        assert_eq!(route.points().collect::<Vec<_>>(), vec![Point::new(1, 1)]);
        assert_eq!(route.validate(&g, &q), Ok(()));

        let origin = Query::new(Point::ZERO, Point::ZERO).with_runs(1, 1);
        assert_eq!(Crucible::new().min_cost(&ones(1, 1), &origin), Ok(Some(0)));
    }

    #[test]
    fn same_cell_with_min_run_needs_a_loop() {
        // A 3x3 ring of 2x2 runs: right, down, left, up.
        let g = ones(3, 3);
        let q = Query::new(Point::ZERO, Point::ZERO).with_runs(2, 2);
        let route = shortest_route(&g, &q).unwrap().unwrap();
        assert_eq!(route.cost, 8);
        assert_eq!(route.len(), 9);
        assert_eq!(route.validate(&g, &q), Ok(()));
    }

    #[test]
    fn forced_run_ends_on_the_row() {
        let g = ones(3, 3);
        let q = Query::new(Point::ZERO, Point::new(2, 0)).with_runs(2, 2);
        let route = shortest_route(&g, &q).unwrap().unwrap();
        assert_eq!(route.cost, 2);
        assert_eq!(
            route.points().collect::<Vec<_>>(),
            vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)]
        );
    }

    #[test]
    fn destination_must_complete_the_run() {
        // (1, 0) can only be reached after a single step in its row, or
        // after a turn one cell before it: never with a run of 2.
        let g = ones(3, 3);
        let q = Query::new(Point::ZERO, Point::new(1, 0)).with_runs(2, 2);
        assert_eq!(Crucible::new().min_cost(&g, &q), Ok(None));

        // Without the minimum run it is one step away.
        assert_eq!(Crucible::new().min_cost(&g, &q.with_runs(1, 2)), Ok(Some(1)));

        let row = ones(3, 1);
        let q = Query::new(Point::ZERO, Point::new(1, 0)).with_runs(2, 2);
        assert_eq!(Crucible::new().min_cost(&row, &q), Ok(None));
        let q = Query::new(Point::ZERO, Point::new(2, 0)).with_runs(2, 2);
        assert_eq!(Crucible::new().min_cost(&row, &q), Ok(Some(2)));
    }

    #[test]
    fn grid_too_small_for_min_run() {
        let g = ones(3, 3);
        let q = Query::corners(&g).with_runs(3, 5);
        assert_eq!(Crucible::new().min_cost(&g, &q), Ok(None));
    }

    #[test]
    fn max_run_forces_detours() {
        // A single row: with max run 2 the third cell is unreachable.
        let row = ones(4, 1);
        let q = Query::new(Point::ZERO, Point::new(3, 0)).with_runs(1, 2);
        assert_eq!(Crucible::new().min_cost(&row, &q), Ok(None));
        assert_eq!(Crucible::new().min_cost(&row, &q.with_runs(1, 3)), Ok(Some(3)));

        // Two rows: zig-zag around the limit.
        let g = ones(4, 2);
        let route = shortest_route(&g, &q).unwrap().unwrap();
        assert_eq!(route.cost, 5);
        assert_eq!(route.validate(&g, &q), Ok(()));
    }

    #[test]
    fn start_cell_cost_is_not_counted() {
        let g = CostGrid::from_rows(&[vec![9, 1, 1]]).unwrap();
        let q = Query::new(Point::ZERO, Point::new(2, 0)).with_runs(1, 3);
        assert_eq!(Crucible::new().min_cost(&g, &q), Ok(Some(2)));
        // Going back to the expensive corner pays for it.
        let q = Query::new(Point::new(2, 0), Point::ZERO).with_runs(1, 3);
        assert_eq!(Crucible::new().min_cost(&g, &q), Ok(Some(10)));
    }

    #[test]
    fn zero_cost_path_differs_from_no_path() {
        let g = CostGrid::new(4, 4, 0).unwrap();
        let q = Query::corners(&g).with_runs(1, 3);
        assert_eq!(Crucible::new().min_cost(&g, &q), Ok(Some(0)));
    }

    #[test]
    fn boundary_endpoints() {
        let mut rng = StdRng::seed_from_u64(11);
        let g = random_grid(&mut rng, 7, 5);
        let mut c = Crucible::new();
        let ends = [
            Point::new(6, 0),
            Point::new(0, 4),
            Point::new(6, 4),
            Point::new(3, 0),
            Point::new(6, 2),
            Point::new(0, 2),
            Point::new(3, 4),
        ];
        for end in ends {
            for runs in [RunLimits::CRUCIBLE, RunLimits::new(2, 3), RunLimits::ULTRA] {
                let q = Query::new(Point::new(3, 2), end).with_limits(runs);
                let got = c.route(&g, &q).unwrap();
                assert_eq!(got.as_ref().map(|r| r.cost), reference_cost(&g, &q), "{end} {runs}");
                if let Some(r) = got {
                    assert_eq!(r.validate(&g, &q), Ok(()), "{end} {runs}");
                }
            }
        }
    }

    #[test]
    fn max_cost_bounds_the_search() {
        let g: CostGrid = SAMPLE.parse().unwrap();
        let q = Query::corners(&g).with_limits(RunLimits::CRUCIBLE);
        let mut c = Crucible::new();
        assert_eq!(c.min_cost(&g, &q.with_max_cost(102)), Ok(Some(102)));
        assert_eq!(c.min_cost(&g, &q.with_max_cost(101)), Ok(None));
        let bounded = c.expanded();
        c.min_cost(&g, &q).unwrap();
        assert!(bounded <= c.expanded());
    }

    #[test]
    fn invalid_queries_fail_before_search() {
        let g = ones(3, 3);
        let mut c = Crucible::new();
        assert_eq!(
            c.min_cost(&g, &Query::corners(&g).with_runs(3, 2)),
            Err(QueryError::InvalidRuns { min: 3, max: 2 })
        );
        assert!(matches!(
            c.route(&g, &Query::new(Point::ZERO, Point::new(0, 3))),
            Err(QueryError::OutOfBounds {
                endpoint: Endpoint::End,
                ..
            })
        ));
        assert_eq!(c.expanded(), 0);
    }

    #[test]
    fn huge_max_run_is_clamped() {
        let g = ones(5, 5);
        let q = Query::corners(&g).with_runs(1, u32::MAX);
        assert_eq!(Crucible::new().min_cost(&g, &q), Ok(Some(8)));
    }

    #[test]
    fn engine_reuse_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(3);
        let small = random_grid(&mut rng, 6, 6);
        let big: CostGrid = SAMPLE.parse().unwrap();
        let qs = Query::corners(&small).with_limits(RunLimits::new(2, 4));
        let qb = Query::corners(&big).with_limits(RunLimits::ULTRA);

        let mut c = Crucible::new();
        let first = c.route(&small, &qs).unwrap();
        let b1 = c.min_cost(&big, &qb).unwrap();
        let second = c.route(&small, &qs).unwrap();
        let b2 = c.min_cost(&big, &qb).unwrap();

        assert_eq!(first, second);
        assert_eq!(b1, Some(94));
        assert_eq!(b1, b2);
        assert_eq!(
            first.map(|r| r.cost),
            Crucible::new().min_cost(&small, &qs).unwrap()
        );
    }

    #[test]
    fn matches_map_keyed_search() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut c = Crucible::new();
        for _ in 0..40 {
            let w = rng.random_range(1..8);
            let h = rng.random_range(1..8);
            let g = random_grid(&mut rng, w, h);
            let start = Point::new(rng.random_range(0..w), rng.random_range(0..h));
            let end = Point::new(rng.random_range(0..w), rng.random_range(0..h));
            let min = rng.random_range(1..4);
            let max = min + rng.random_range(0..4);
            let q = Query::new(start, end).with_runs(min, max);

            let got = c.route(&g, &q).unwrap();
            assert_eq!(got.as_ref().map(|r| r.cost), reference_cost(&g, &q), "{q:?}");
            if let Some(r) = got {
                assert_eq!(r.validate(&g, &q), Ok(()), "{q:?}");
            }
        }
    }

    #[test]
    fn monotone_in_run_limits() {
        // `None` sorts below `Some`, so compare with no-path as infinity.
        let key = |d: Option<Distance>| d.unwrap_or(Distance::MAX);
        let mut rng = StdRng::seed_from_u64(7);
        let mut c = Crucible::new();
        for _ in 0..10 {
            let g = random_grid(&mut rng, 7, 6);
            let base = Query::corners(&g);

            let mut prev = Distance::MAX;
            for max in 1..=7 {
                let cost = key(c.min_cost(&g, &base.with_runs(1, max)).unwrap());
                assert!(cost <= prev, "raising max run to {max} raised the cost");
                prev = cost;
            }

            let mut prev = 0;
            for min in 1..=5 {
                let cost = key(c.min_cost(&g, &base.with_runs(min, 6)).unwrap());
                assert!(cost >= prev, "raising min run to {min} lowered the cost");
                prev = cost;
            }
        }
    }

    #[test]
    fn costs_above_one_digit() {
        let g = CostGrid::from_rows(&[
            vec![0, 1000, 1000],
            vec![5, 5, 1000],
            vec![1000, 5, 5],
        ])
        .unwrap();
        let q = Query::corners(&g).with_runs(1, 3);
        let route = shortest_route(&g, &q).unwrap().unwrap();
        assert_eq!(route.cost, 20);
        let expected: Vec<Cost> = vec![5, 5, 5, 5];
        let entered: Vec<Cost> = route.points().skip(1).map(|p| g.cost_at(p)).collect();
        assert_eq!(entered, expected);
    }
}

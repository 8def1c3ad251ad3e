//! An immutable grid of non-negative traversal costs.
//!
//! [`CostGrid`] is the map a search runs over: every cell holds the cost
//! paid to *enter* it. Grids are built once, either programmatically or by
//! parsing text, and are read-only afterwards.

use std::fmt;
use std::str::FromStr;

use crate::error::GridError;
use crate::geom::{Point, Range};

/// Cost of entering a single cell.
pub type Cost = u32;

/// Total cost of a path: the sum of the entered cells' costs.
pub type Distance = u64;

/// A rectangular grid of [`Cost`] values with its origin at (0, 0).
///
/// Invariant: at least one cell, all rows the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostGrid {
    cells: Vec<Cost>,
    bounds: Range,
}

impl CostGrid {
    /// Create a `width` × `height` grid where every cell costs `fill`.
    pub fn new(width: i32, height: i32, fill: Cost) -> Result<Self, GridError> {
        Self::from_fn(width, height, |_| fill)
    }

    /// Create a grid whose cell costs are given by `f`.
    pub fn from_fn(
        width: i32,
        height: i32,
        mut f: impl FnMut(Point) -> Cost,
    ) -> Result<Self, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::Empty);
        }
        let (width, height) = checked_dims(width as usize, height as usize)?;
        let bounds = Range::new(0, 0, width, height);
        let cells = bounds.iter().map(&mut f).collect();
        Ok(Self { cells, bounds })
    }

    /// Build a grid from rows of signed integers, validating shape and
    /// cost range.
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self, GridError> {
        let Some(first) = rows.first() else {
            return Err(GridError::Empty);
        };
        let width = first.len();
        if width == 0 {
            return Err(GridError::Empty);
        }
        let (w, h) = checked_dims(width, rows.len())?;

        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GridError::Ragged {
                    row: y,
                    expected: width,
                    got: row.len(),
                });
            }
            for (x, &cost) in row.iter().enumerate() {
                let pos = Point::new(x as i32, y as i32);
                if cost < 0 {
                    return Err(GridError::NegativeCost { pos, cost });
                }
                let cost = Cost::try_from(cost).map_err(|_| GridError::CostOverflow { pos, cost })?;
                cells.push(cost);
            }
        }

        Ok(Self {
            cells,
            bounds: Range::new(0, 0, w, h),
        })
    }

    /// Returns the bounding range of the grid.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Returns the size as a Point (width = x, height = y).
    #[inline]
    pub fn size(&self) -> Point {
        self.bounds.size()
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// Number of cells. Never zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `p` lies inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    /// Cost of entering `p`, or `None` if it is out of bounds.
    #[inline]
    pub fn at(&self, p: Point) -> Option<Cost> {
        if !self.contains(p) {
            return None;
        }
        Some(self.cells[self.index(p)])
    }

    /// Cost of entering `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is outside the grid; check [`contains`](Self::contains)
    /// first.
    #[inline]
    pub fn cost_at(&self, p: Point) -> Cost {
        assert!(self.contains(p), "cost_at: {p} outside {}", self.bounds);
        self.cells[self.index(p)]
    }

    /// Row-major iterator over `(position, cost)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Point, Cost)> + '_ {
        self.bounds.iter().zip(self.cells.iter().copied())
    }

    /// The cell at the bottom-right corner.
    #[inline]
    pub fn last_cell(&self) -> Point {
        self.bounds.max.shift(-1, -1)
    }

    #[inline]
    fn index(&self, p: Point) -> usize {
        (p.y * self.width() + p.x) as usize
    }

    fn single_digits(&self) -> bool {
        self.cells.iter().all(|&c| c < 10)
    }
}

/// Grid dimensions as coordinates. The cell count must fit in an `i32` so
/// that row-major indexing cannot overflow.
fn checked_dims(width: usize, height: usize) -> Result<(i32, i32), GridError> {
    let cells = width.checked_mul(height);
    match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) if cells.is_some_and(|n| n <= i32::MAX as usize) => Ok((w, h)),
        _ => Err(GridError::TooLarge { width, height }),
    }
}

/// Parses either one decimal digit per cell (`"2413"`) or, when a line
/// contains whitespace, whitespace-separated integers (`"12 0 7"`).
/// Surrounding whitespace of the whole input and of each line is ignored.
impl FromStr for CostGrid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, GridError> {
        let mut rows = Vec::new();
        for (y, line) in s.trim().lines().enumerate() {
            let line = line.trim();
            let row = if line.contains(char::is_whitespace) {
                parse_numbers(line, y)?
            } else {
                parse_digits(line, y)?
            };
            rows.push(row);
        }
        Self::from_rows(&rows)
    }
}

fn parse_numbers(line: &str, y: usize) -> Result<Vec<i64>, GridError> {
    line.split_whitespace()
        .enumerate()
        .map(|(x, tok)| {
            tok.parse::<i64>().map_err(|_| GridError::InvalidCost {
                pos: Point::new(x as i32, y as i32),
                token: tok.to_string(),
            })
        })
        .collect()
}

fn parse_digits(line: &str, y: usize) -> Result<Vec<i64>, GridError> {
    line.chars()
        .enumerate()
        .map(|(x, ch)| {
            ch.to_digit(10)
                .map(i64::from)
                .ok_or(GridError::InvalidDigit {
                    ch,
                    pos: Point::new(x as i32, y as i32),
                })
        })
        .collect()
}

/// Writes the grid back in the text form accepted by `FromStr`: digit rows
/// when every cost is below ten, space-separated rows otherwise.
impl fmt::Display for CostGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.single_digits();
        for (i, row) in self.cells.chunks(self.width() as usize).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (x, c) in row.iter().enumerate() {
                if !digits && x > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

use thiserror::Error;

use crate::geom::Point;

/// Errors raised while building a [`CostGrid`](crate::CostGrid).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The grid has no cells.
    #[error("grid is empty")]
    Empty,

    /// A row's length differs from the first row's.
    #[error("row {row} has {got} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// Costs must be non-negative.
    #[error("negative cost {cost} at {pos}")]
    NegativeCost { pos: Point, cost: i64 },

    /// The cost does not fit in a [`Cost`](crate::Cost).
    #[error("cost {cost} at {pos} is too large")]
    CostOverflow { pos: Point, cost: i64 },

    /// A character in a digit row is not a decimal digit.
    #[error("invalid digit {ch:?} at {pos}")]
    InvalidDigit { ch: char, pos: Point },

    /// A token in a whitespace-separated row is not an integer.
    #[error("invalid cost {token:?} at {pos}")]
    InvalidCost { pos: Point, token: String },

    /// The dimensions or the cell count do not fit in grid coordinates.
    #[error("grid of {width}x{height} cells is too large")]
    TooLarge { width: usize, height: usize },
}

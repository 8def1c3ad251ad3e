//! **crucible-core** — the data model shared by the crucible crates.
//!
//! This crate provides the geometry primitives ([`Point`], [`Range`],
//! [`Heading`]) and the immutable [`CostGrid`] that searches run over,
//! together with its text parser.

pub mod error;
pub mod geom;
pub mod grid;

pub use error::GridError;
pub use geom::{Heading, Point, Range};
pub use grid::{Cost, CostGrid, Distance};

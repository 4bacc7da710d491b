//! Spatial algorithms.
//!
//! - [`grid`]: Floor-division degree grid shared by clustering and heat cells

pub mod grid;

pub use grid::{cell_index, DegreeGrid, GridCell, MIN_CELL_SIZE_DEGREES};

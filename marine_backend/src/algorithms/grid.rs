//! Fixed-size degree grid used to bucket points by position.
//!
//! Cell indices use floor division on both axes, so a coordinate sitting on a
//! cell boundary belongs to the cell whose origin it is, and negative
//! coordinates round towards negative infinity (`-0.5 / 1.0` is cell `-1`).

use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};

/// Integer address of a grid cell.
///
/// `row` indexes latitude, `col` indexes longitude. Ordering is row-major so
/// collections keyed by `GridCell` iterate south-to-north, west-to-east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub row: i64,
    pub col: i64,
}

/// Largest cell index magnitude that converts exactly between `f64` and `i64`.
pub const MAX_CELL_INDEX: f64 = 9_007_199_254_740_992.0; // 2^53

/// Smallest accepted cell size: a longitude of ±180° must stay within
/// [`MAX_CELL_INDEX`] cells of the origin.
pub const MIN_CELL_SIZE_DEGREES: f64 = 180.0 / MAX_CELL_INDEX;

/// Floor-division cell index of a coordinate.
///
/// Only exact for sizes of at least [`MIN_CELL_SIZE_DEGREES`] and coordinates
/// inside the geographic ranges; [`DegreeGrid`] enforces both.
#[inline]
pub fn cell_index(coordinate: f64, cell_size: f64) -> i64 {
    (coordinate / cell_size).floor() as i64
}

/// A square grid over latitude/longitude with a fixed cell size in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeGrid {
    cell_size: f64,
}

impl DegreeGrid {
    /// Creates a grid, rejecting non-finite cell sizes and sizes below
    /// [`MIN_CELL_SIZE_DEGREES`].
    ///
    /// # Examples
    ///
    /// ```
    /// use marine_map::algorithms::grid::DegreeGrid;
    ///
    /// assert!(DegreeGrid::new(1.5).is_ok());
    /// assert!(DegreeGrid::new(0.0).is_err());
    /// ```
    pub fn new(cell_size_degrees: f64) -> MapResult<Self> {
        if !cell_size_degrees.is_finite() || cell_size_degrees <= 0.0 {
            return Err(MapError::ConfigurationError(format!(
                "grid cell size must be a positive number of degrees, got {}",
                cell_size_degrees
            )));
        }
        if cell_size_degrees < MIN_CELL_SIZE_DEGREES {
            return Err(MapError::ConfigurationError(format!(
                "grid cell size {} is below the minimum of {} degrees",
                cell_size_degrees, MIN_CELL_SIZE_DEGREES
            )));
        }
        Ok(Self {
            cell_size: cell_size_degrees,
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell containing the given position.
    pub fn cell_of(&self, lat: f64, lon: f64) -> GridCell {
        GridCell {
            row: cell_index(lat, self.cell_size),
            col: cell_index(lon, self.cell_size),
        }
    }

    /// South-west corner of a cell as `(lat, lon)`.
    pub fn origin(&self, cell: GridCell) -> (f64, f64) {
        (
            cell.row as f64 * self.cell_size,
            cell.col as f64 * self.cell_size,
        )
    }

    /// Geometric center of a cell as `(lat, lon)`.
    pub fn center(&self, cell: GridCell) -> (f64, f64) {
        let half = self.cell_size / 2.0;
        let (lat, lon) = self.origin(cell);
        (lat + half, lon + half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_sizes() {
        for size in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = DegreeGrid::new(size).unwrap_err();
            assert!(matches!(err, MapError::ConfigurationError(_)), "size {}", size);
        }
    }

    #[test]
    fn test_rejects_sizes_that_overflow_cell_indices() {
        for size in [1e-300, f64::MIN_POSITIVE, MIN_CELL_SIZE_DEGREES / 2.0] {
            let err = DegreeGrid::new(size).unwrap_err();
            assert!(matches!(err, MapError::ConfigurationError(_)), "size {}", size);
        }

        let grid = DegreeGrid::new(MIN_CELL_SIZE_DEGREES).unwrap();
        let east = grid.cell_of(0.0, 180.0);
        let west = grid.cell_of(0.0, -180.0);
        assert_eq!(east.col as f64, MAX_CELL_INDEX);
        assert_eq!(west.col as f64, -MAX_CELL_INDEX);
    }

    #[test]
    fn test_negative_coordinates_floor_down() {
        assert_eq!(cell_index(-0.5, 1.0), -1);
        assert_eq!(cell_index(-1.0, 1.0), -1);
        assert_eq!(cell_index(-1.01, 1.0), -2);
    }

    #[test]
    fn test_boundary_belongs_to_upper_cell() {
        assert_eq!(cell_index(1.5, 1.5), 1);
        assert_eq!(cell_index(0.0, 1.5), 0);
    }

    #[test]
    fn test_center_and_origin() {
        let grid = DegreeGrid::new(1.5).unwrap();
        let cell = grid.cell_of(10.9, 10.1);
        assert_eq!(cell, GridCell { row: 7, col: 6 });
        assert_eq!(grid.origin(cell), (10.5, 9.0));
        assert_eq!(grid.center(cell), (11.25, 9.75));
    }
}
